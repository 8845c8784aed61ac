use launch_azimuth::orbital::time_since_perigee;
use launch_azimuth::physics::planet::EARTH_RADIUS;
use launch_azimuth::{presets, solve};

fn main() {
    println!("=== Three-orbit recovery: Cape Canaveral → Atlantic ===\n");

    let request = presets::three_orbit_recovery();
    let solution = solve(&request);
    let orbit = solution.orbit;

    println!(
        "Insertion: {:.1} x {:.1} km, period {:.2} min, e = {:.5}",
        (orbit.perigee_radius() - EARTH_RADIUS) / 1000.0,
        (orbit.apogee_radius() - EARTH_RADIUS) / 1000.0,
        orbit.period / 60.0,
        orbit.ecc,
    );
    println!(
        "Recovery pass at true anomaly {:.2} deg, {:.1} min after perigee",
        solution.state.target_true_anom.to_degrees(),
        time_since_perigee(orbit.period, orbit.ecc, solution.state.target_true_anom) / 60.0,
    );
    println!();
    println!("Launch azimuth:   {:.4} deg", solution.azimuth);
    println!("Inertial azimuth: {:.4} deg", solution.inertial_azimuth);
    println!("Inclination:      {:.4} deg", solution.inclination);
    println!("Flight time:      {:.2} h", solution.flight_time / 3600.0);
    println!();
    println!(
        "J2 over the flight: node {:+.3} deg, perigee {:+.3} deg",
        solution.state.nodal_drift.to_degrees(),
        solution.state.apsidal_drift.to_degrees(),
    );
}

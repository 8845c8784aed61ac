use launch_azimuth::io::csv;
use launch_azimuth::{presets, sweep, SolverConfig};

fn main() {
    let request = presets::three_orbit_recovery();
    let counts: Vec<u32> = (0..=8).collect();
    let solutions = sweep(&request, counts.iter().copied(), &SolverConfig::default());

    println!("{:>6}  {:>10}  {:>10}", "orbits", "az (deg)", "inc (deg)");
    for (n, s) in counts.iter().zip(&solutions) {
        println!("{:>6}  {:>10.4}  {:>10.4}", n, s.azimuth, s.inclination);
    }

    csv::write_sweep_file("orbit_sweep.csv", &counts, &solutions)
        .expect("Failed to write CSV");
    println!("\nExported: orbit_sweep.csv");
}

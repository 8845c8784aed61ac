use std::io::{self, Write};

use crate::targeting::Solution;

/// Write an orbit-count sweep as CSV.
///
/// Columns: orbits, azimuth_deg, inclination_deg, inertial_azimuth_deg,
///          flight_time_s, passes
pub fn write_sweep<W: Write>(
    writer: &mut W,
    orbit_counts: &[u32],
    solutions: &[Solution],
) -> io::Result<()> {
    writeln!(
        writer,
        "orbits,azimuth_deg,inclination_deg,inertial_azimuth_deg,flight_time_s,passes"
    )?;

    for (n, s) in orbit_counts.iter().zip(solutions) {
        writeln!(
            writer,
            "{},{:.6},{:.6},{:.6},{:.2},{}",
            n, s.azimuth, s.inclination, s.inertial_azimuth, s.flight_time, s.passes,
        )?;
    }

    Ok(())
}

/// Write a sweep to a CSV file at the given path.
pub fn write_sweep_file(path: &str, orbit_counts: &[u32], solutions: &[Solution]) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_sweep(&mut file, orbit_counts, solutions)
}

use std::io::{self, Write};

use serde::Serialize;

use crate::targeting::{MissionRequest, Solution};

/// Request and answer, serialized together so the output is self-describing.
#[derive(Debug, Serialize)]
pub struct SolutionReport<'a> {
    pub mission: &'a MissionRequest,
    pub solution: &'a Solution,
}

/// Write a solution as pretty-printed JSON. Non-finite values become `null`.
pub fn write_solution<W: Write>(
    writer: &mut W,
    request: &MissionRequest,
    solution: &Solution,
) -> io::Result<()> {
    let report = SolutionReport {
        mission: request,
        solution,
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)
}

/// Write solution JSON to a file.
pub fn write_solution_file(
    path: &str,
    request: &MissionRequest,
    solution: &Solution,
) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_solution(&mut file, request, solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targeting::{presets, solve};

    #[test]
    fn json_output_is_valid() {
        let request = presets::three_orbit_recovery();
        let solution = solve(&request);

        let mut buf = Vec::new();
        write_solution(&mut buf, &request, &solution).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["mission"]["orbit_count"], 3);
        assert_eq!(value["mission"]["launch_site"]["latitude"], 28.5);
        let az = value["solution"]["azimuth"].as_f64().unwrap();
        assert_eq!(az, solution.azimuth);
        assert!(value["solution"]["orbit"]["period"].is_number());
    }

    #[test]
    fn nan_becomes_null() {
        let request = crate::targeting::MissionBuilder::new().orbits(0).build();
        let solution = solve(&request);

        let mut buf = Vec::new();
        write_solution(&mut buf, &request, &solution).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert!(value["solution"]["azimuth"].is_null());
    }
}

pub mod geo;
pub mod mission;
pub mod solver;

pub use geo::GeoCoordinate;
pub use mission::{presets, MissionBuilder, MissionRequest};
pub use solver::{
    solve, solve_checked, solve_with, sweep, target_azimuth, GroundTrackSolver, IterationState,
    Solution, SolveError,
};

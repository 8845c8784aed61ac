//! Launch azimuth and inclination targeting.
//!
//! Given a launch site, a recovery site, an insertion altitude and a number
//! of completed orbits, finds the launch heading whose ground track passes
//! over the recovery site, allowing for planet rotation and secular J2 drift.

pub mod config;
pub mod io;
pub mod orbital;
pub mod physics;
pub mod targeting;

pub use config::{IterationMode, SolverConfig};
pub use targeting::{
    presets, solve, solve_checked, solve_with, sweep, target_azimuth, GeoCoordinate,
    MissionBuilder, MissionRequest, Solution, SolveError,
};

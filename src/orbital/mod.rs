pub mod kepler;
pub mod target;

pub use kepler::{arc_flight_time, eccentric_anomaly, time_of_flight, time_since_perigee};
pub use target::TargetOrbit;

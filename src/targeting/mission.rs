use serde::{Deserialize, Serialize};

use super::geo::GeoCoordinate;

// ---------------------------------------------------------------------------
// Mission request: one targeting scenario
// ---------------------------------------------------------------------------

/// Immutable input to a single solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MissionRequest {
    pub cutoff_altitude: f64, // m
    pub launch_site: GeoCoordinate,
    pub target_site: GeoCoordinate,
    pub orbit_count: u32, // completed revolutions before the recovery pass
}

impl MissionRequest {
    pub fn new(
        cutoff_altitude: f64,
        launch_site: GeoCoordinate,
        target_site: GeoCoordinate,
        orbit_count: u32,
    ) -> Self {
        MissionRequest {
            cutoff_altitude,
            launch_site,
            target_site,
            orbit_count,
        }
    }

    /// Same scenario with a different number of completed orbits.
    pub fn with_orbit_count(&self, orbit_count: u32) -> Self {
        MissionRequest {
            orbit_count,
            ..*self
        }
    }
}

// ---------------------------------------------------------------------------
// Mission builder
// ---------------------------------------------------------------------------

pub struct MissionBuilder {
    cutoff_altitude: f64,
    launch_site: GeoCoordinate,
    target_site: GeoCoordinate,
    orbit_count: u32,
}

impl Default for MissionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MissionBuilder {
    /// Starts from the reference insertion altitude, launching from the Cape.
    pub fn new() -> Self {
        Self {
            cutoff_altitude: presets::REFERENCE_CUTOFF_ALTITUDE,
            launch_site: presets::CAPE_CANAVERAL,
            target_site: presets::CAPE_CANAVERAL,
            orbit_count: 0,
        }
    }

    pub fn cutoff_altitude(mut self, meters: f64) -> Self {
        self.cutoff_altitude = meters;
        self
    }

    pub fn launch_site(mut self, latitude: f64, longitude: f64) -> Self {
        self.launch_site = GeoCoordinate::new(latitude, longitude);
        self
    }

    pub fn target_site(mut self, latitude: f64, longitude: f64) -> Self {
        self.target_site = GeoCoordinate::new(latitude, longitude);
        self
    }

    pub fn orbits(mut self, count: u32) -> Self {
        self.orbit_count = count;
        self
    }

    pub fn build(self) -> MissionRequest {
        MissionRequest {
            cutoff_altitude: self.cutoff_altitude,
            launch_site: self.launch_site,
            target_site: self.target_site,
            orbit_count: self.orbit_count,
        }
    }
}

// ---------------------------------------------------------------------------
// Preset sites and scenarios
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;

    /// 100 statute miles.
    pub const REFERENCE_CUTOFF_ALTITUDE: f64 = 160_900.0;

    pub const CAPE_CANAVERAL: GeoCoordinate = GeoCoordinate::new(28.5, -80.5);

    /// Atlantic recovery area east of Grand Turk.
    pub const ATLANTIC_RECOVERY: GeoCoordinate = GeoCoordinate::new(21.3, -68.3);

    /// Three-orbit flight from the Cape splashing down in the Atlantic.
    pub fn three_orbit_recovery() -> MissionRequest {
        MissionRequest {
            cutoff_altitude: REFERENCE_CUTOFF_ALTITUDE,
            launch_site: CAPE_CANAVERAL,
            target_site: ATLANTIC_RECOVERY,
            orbit_count: 3,
        }
    }
}

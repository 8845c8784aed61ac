use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Physical constants (Earth)
// ---------------------------------------------------------------------------

pub const MU_EARTH: f64 = 3.986_004_418e14; // m^3/s^2
pub const EARTH_RADIUS: f64 = 6_371_000.0; // mean Earth radius, m
pub const J2_EARTH: f64 = 1.082_63e-3;
pub const EARTH_ROTATION_RATE: f64 = 7.292_115_9e-5; // sidereal, rad/s

/// Central body the launch and recovery sites sit on.
///
/// All solver math takes its constants from here rather than from globals,
/// so a solve is fully described by its request plus one `Planet`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Planet {
    pub radius: f64,        // m
    pub mu: f64,            // m^3/s^2
    pub j2: f64,            // oblateness coefficient (dimensionless)
    pub rotation_rate: f64, // rad/s, sidereal
}

impl Default for Planet {
    fn default() -> Self {
        Self::earth()
    }
}

impl Planet {
    pub const fn earth() -> Self {
        Planet {
            radius: EARTH_RADIUS,
            mu: MU_EARTH,
            j2: J2_EARTH,
            rotation_rate: EARTH_ROTATION_RATE,
        }
    }

    /// Circular orbit speed at radius `r` (m/s).
    pub fn circular_velocity(&self, r: f64) -> f64 {
        (self.mu / r).sqrt()
    }

    /// Eastward speed of the surface at `latitude` (rad) due to rotation.
    pub fn surface_speed(&self, latitude: f64) -> f64 {
        self.rotation_rate * self.radius * latitude.cos()
    }

    /// Rotation angle swept by the planet in `dt` seconds (rad).
    pub fn rotation_angle(&self, dt: f64) -> f64 {
        self.rotation_rate * dt
    }

    // -----------------------------------------------------------------------
    // Secular J2 drift rates
    // -----------------------------------------------------------------------

    fn j2_factor(&self, sma: f64, semi_latus: f64) -> f64 {
        let mean_motion = (self.mu / sma.powi(3)).sqrt();
        mean_motion * self.j2 * (self.radius / semi_latus).powi(2)
    }

    /// Nodal regression rate dΩ/dt (rad/s). Negative for prograde orbits.
    pub fn nodal_regression_rate(&self, sma: f64, semi_latus: f64, inc: f64) -> f64 {
        -1.5 * self.j2_factor(sma, semi_latus) * inc.cos()
    }

    /// Apsidal precession rate dω/dt (rad/s). Zero at the critical
    /// inclination (~63.4 deg).
    pub fn apsidal_precession_rate(&self, sma: f64, semi_latus: f64, inc: f64) -> f64 {
        let cos_i = inc.cos();
        0.75 * self.j2_factor(sma, semi_latus) * (5.0 * cos_i * cos_i - 1.0)
    }
}

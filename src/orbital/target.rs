use std::f64::consts::TAU;

use serde::Serialize;

use crate::physics::planet::Planet;

/// Two-body orbit the vehicle is inserted into at cutoff.
///
/// Derived once per solve from the cutoff altitude, the assumed apogee
/// altitude and the flight-path angle at cutoff. Independent of launch and
/// target geography.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetOrbit {
    pub sma: f64,              // semi-major axis, m
    pub ecc: f64,              // eccentricity
    pub semi_latus: f64,       // semi-latus rectum p, m
    pub period: f64,           // s
    pub cutoff_true_anom: f64, // true anomaly at cutoff, rad
    pub cutoff_radius: f64,    // m
    pub cutoff_velocity: f64,  // inertial speed at cutoff, m/s
}

impl TargetOrbit {
    /// Derive the insertion orbit.
    ///
    /// `flight_path_angle` is in radians above the local horizontal. With a
    /// horizontal cutoff the cutoff point is an apsis: perigee when the
    /// cutoff is below the apogee altitude, apogee otherwise.
    pub fn derive(
        cutoff_altitude: f64,
        apogee_altitude: f64,
        flight_path_angle: f64,
        planet: &Planet,
    ) -> Self {
        let mu = planet.mu;
        let r_cut = planet.radius + cutoff_altitude;
        let r_apo = planet.radius + apogee_altitude;

        let v_circ = planet.circular_velocity(r_cut);

        // Speed at cutoff that coasts up to r_apo (energy + angular momentum)
        let v_cut_sq = if flight_path_angle == 0.0 {
            mu * (2.0 / r_cut - 2.0 / (r_cut + r_apo))
        } else {
            let h_ratio = r_cut * flight_path_angle.cos() / r_apo;
            2.0 * mu * (1.0 / r_cut - 1.0 / r_apo) / (1.0 - h_ratio * h_ratio)
        };
        let v_cut = v_cut_sq.sqrt();

        let q = (v_cut / v_circ).powi(2);
        let (sin_g, cos_g) = flight_path_angle.sin_cos();

        let sma = r_cut / (2.0 - q);
        let p_over_r = q * cos_g * cos_g;
        let cutoff_true_anom = (q * sin_g * cos_g).atan2(p_over_r - 1.0);
        let ecc = ((q - 1.0).powi(2) * cos_g * cos_g + sin_g * sin_g).sqrt();
        let semi_latus = r_cut * p_over_r;
        let period = TAU * (sma.powi(3) / mu).sqrt();

        TargetOrbit {
            sma,
            ecc,
            semi_latus,
            period,
            cutoff_true_anom,
            cutoff_radius: r_cut,
            cutoff_velocity: v_cut,
        }
    }

    pub fn perigee_radius(&self) -> f64 {
        self.sma * (1.0 - self.ecc)
    }

    pub fn apogee_radius(&self) -> f64 {
        self.sma * (1.0 + self.ecc)
    }

    /// True when the orbit is a closed ellipse (0 <= e < 1).
    pub fn is_elliptic(&self) -> bool {
        (0.0..1.0).contains(&self.ecc)
    }
}

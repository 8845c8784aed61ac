use std::f64::consts::TAU;

/// Eccentric anomaly from true anomaly (rad), elliptical orbits only.
///
/// Returns the principal branch of the arctangent, i.e. a value in
/// (-pi, pi]. No unwrapping across revolutions is performed; for e >= 1
/// the square root goes NaN and so does the result.
pub fn eccentric_anomaly(ecc: f64, true_anom: f64) -> f64 {
    2.0 * (((1.0 - ecc) / (1.0 + ecc)).sqrt() * (true_anom / 2.0).tan()).atan()
}

/// Time since perigee passage (s) for a body at `true_anom` on an orbit
/// with the given period and eccentricity.
///
/// Kepler's equation is evaluated forward (E is known), so there is no
/// iteration. Negative for true anomalies in (-pi, 0).
pub fn time_since_perigee(period: f64, ecc: f64, true_anom: f64) -> f64 {
    let ecc_anom = eccentric_anomaly(ecc, true_anom);
    let mean_anom = ecc_anom - ecc * ecc_anom.sin();
    period / TAU * mean_anom
}

/// Forward flight time (s) from `from_anom` to `to_anom`, in [0, period).
///
/// Unwraps the principal-branch result of [`time_since_perigee`], so arcs
/// that cross apogee come out positive.
pub fn time_of_flight(period: f64, ecc: f64, from_anom: f64, to_anom: f64) -> f64 {
    let dt = time_since_perigee(period, ecc, to_anom) - time_since_perigee(period, ecc, from_anom);
    dt.rem_euclid(period)
}

/// Flight time (s) to sweep `arc` radians of true anomaly from `from_anom`.
///
/// Unlike [`time_of_flight`] the arc keeps its sign and its whole turns:
/// a negative arc gives a negative time, each extra turn adds a period.
pub fn arc_flight_time(period: f64, ecc: f64, from_anom: f64, arc: f64) -> f64 {
    let turns = (arc / TAU).floor();
    time_of_flight(period, ecc, from_anom, from_anom + arc) + turns * period
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn circular_orbit_anomalies_coincide() {
        for deg in [-170.0_f64, -45.0, 0.0, 30.0, 120.0, 179.0] {
            let nu = deg.to_radians();
            assert!((eccentric_anomaly(0.0, nu) - nu).abs() < 1e-12, "nu={}", deg);
        }
    }

    #[test]
    fn eccentric_anomaly_lags_true_anomaly() {
        // On the outbound half of an ellipse, E < nu
        let e = eccentric_anomaly(0.3, FRAC_PI_2);
        assert!(e > 0.0 && e < FRAC_PI_2);
        // cos E = (e + cos nu) / (1 + e cos nu) = 0.3 at nu = 90 deg
        assert!((e.cos() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn half_period_at_apogee() {
        let period = 5_400.0;
        let t = time_since_perigee(period, 0.1, PI - 1e-12);
        assert!((t - period / 2.0).abs() < 1e-6, "got {}", t);
    }

    #[test]
    fn perigee_is_time_zero() {
        assert_eq!(time_since_perigee(5_400.0, 0.2, 0.0), 0.0);
    }

    #[test]
    fn hyperbolic_eccentricity_goes_nan() {
        assert!(eccentric_anomaly(1.5, 1.0).is_nan());
        assert!(time_since_perigee(5_400.0, 1.5, 1.0).is_nan());
    }

    #[test]
    fn flight_time_across_apogee_is_positive() {
        let period = 6_000.0;
        // From 170 deg to 190 deg (== -170 deg): short hop straddling apogee
        let dt = time_of_flight(period, 0.05, 170_f64.to_radians(), 190_f64.to_radians());
        assert!(dt > 0.0 && dt < period * 0.1, "got {}", dt);
    }

    #[test]
    fn short_arc_matches_forward_flight_time() {
        let period = 6_000.0;
        let fwd = time_of_flight(period, 0.05, 0.2, 1.4);
        assert!((arc_flight_time(period, 0.05, 0.2, 1.2) - fwd).abs() < 1e-9);
    }

    #[test]
    fn negative_arc_runs_backwards() {
        let period = 6_000.0;
        let back = arc_flight_time(period, 0.05, 0.3, -0.1);
        let fwd = time_of_flight(period, 0.05, 0.2, 0.3);
        assert!(back < 0.0, "got {}", back);
        assert!((back + fwd).abs() < 1e-9, "{} vs {}", back, fwd);
    }

    #[test]
    fn extra_turn_adds_a_period() {
        let period = 6_000.0;
        let one = arc_flight_time(period, 0.05, 0.0, 1.0);
        let two = arc_flight_time(period, 0.05, 0.0, 1.0 + TAU);
        assert!((two - one - period).abs() < 1e-6, "{} vs {}", two, one);
    }

    #[test]
    fn symmetric_arcs_take_equal_time() {
        let period = 6_000.0;
        let out = time_of_flight(period, 0.2, 0.0, 1.0);
        let back = time_of_flight(period, 0.2, -1.0, 0.0);
        assert!((out - back).abs() < 1e-9);
    }
}

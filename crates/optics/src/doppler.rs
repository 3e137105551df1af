use glam::DVec3;

use lightcone_common::DIV_BY_ZERO_CUTOFF;

/// `γ = 1 / sqrt(1 − |v|²/c²)`. Infinite at or above the signal speed.
pub fn lorentz_factor(velocity: DVec3, speed_of_light: f64) -> f64 {
    let beta2 = velocity.length_squared() / (speed_of_light * speed_of_light);
    if beta2 >= 1.0 {
        return f64::INFINITY;
    }
    1.0 / (1.0 - beta2).sqrt()
}

/// Velocity of a source as measured in the rest frame of an observer moving
/// with `observer`, by relativistic velocity composition.
///
/// Falls back to the plain difference when the observer is at or above the
/// signal speed.
pub fn relative_velocity(source: DVec3, observer: DVec3, speed_of_light: f64) -> DVec3 {
    let gamma = lorentz_factor(observer, speed_of_light);
    let c2 = speed_of_light * speed_of_light;
    let denominator = 1.0 - source.dot(observer) / c2;
    if !gamma.is_finite() || denominator.abs() < DIV_BY_ZERO_CUTOFF {
        return source - observer;
    }
    let along = gamma / (c2 * (1.0 + gamma)) * source.dot(observer);
    (source / gamma - observer + observer * along) / denominator
}

/// Ratio of observed to emitted frequency for a source moving with `velocity`.
///
/// `line_of_sight` points from the observer to the source; receding sources
/// come out red-shifted (`< 1`). A zero line of sight gives the transverse
/// factor `1/γ`.
pub fn doppler_factor(velocity: DVec3, line_of_sight: DVec3, speed_of_light: f64) -> f64 {
    let gamma = lorentz_factor(velocity, speed_of_light);
    if !gamma.is_finite() {
        return 0.0;
    }
    let radial = if line_of_sight.length() < DIV_BY_ZERO_CUTOFF {
        0.0
    } else {
        velocity.dot(line_of_sight.normalize()) / speed_of_light
    };
    1.0 / (gamma * (1.0 + radial))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lorentz_factor_at_rest_is_one() {
        assert_eq!(lorentz_factor(DVec3::ZERO, 1.0), 1.0);
        let g = lorentz_factor(DVec3::new(0.6, 0.0, 0.0), 1.0);
        assert!((g - 1.25).abs() < 1e-12);
        assert!(lorentz_factor(DVec3::X, 1.0).is_infinite());
    }

    #[test]
    fn receding_source_is_redshifted() {
        let los = DVec3::new(10.0, 0.0, 0.0);
        let away = doppler_factor(DVec3::new(0.6, 0.0, 0.0), los, 1.0);
        let toward = doppler_factor(DVec3::new(-0.6, 0.0, 0.0), los, 1.0);
        assert!((away - 0.5).abs() < 1e-12);
        assert!((toward - 2.0).abs() < 1e-12);
    }

    #[test]
    fn velocities_compose_relativistically() {
        let v = relative_velocity(DVec3::new(-0.5, 0.0, 0.0), DVec3::new(0.5, 0.0, 0.0), 1.0);
        assert!(v.abs_diff_eq(DVec3::new(-0.8, 0.0, 0.0), 1e-12));

        let shared = DVec3::new(0.3, -0.4, 0.2);
        assert!(relative_velocity(shared, shared, 1.0).abs_diff_eq(DVec3::ZERO, 1e-12));
        assert_eq!(relative_velocity(shared, DVec3::ZERO, 1.0), shared);

        // Composition never reaches the signal speed.
        let v = relative_velocity(DVec3::new(0.0, 0.9, 0.0), DVec3::new(-0.9, 0.0, 0.0), 1.0);
        assert!(v.length() < 1.0);
    }

    #[test]
    fn transverse_motion_gives_time_dilation() {
        let d = doppler_factor(DVec3::new(0.0, 0.6, 0.0), DVec3::X, 1.0);
        assert!((d - 0.8).abs() < 1e-12);
    }
}

use glam::{DQuat, DVec3};

use lightcone_common::{DIV_BY_ZERO_CUTOFF, ObserverFrame};

/// Rotation taking the observer's direction of motion onto +Z.
///
/// Identity for an observer at rest.
pub fn observer_alignment(observer_velocity: DVec3) -> DQuat {
    if observer_velocity.length() < DIV_BY_ZERO_CUTOFF {
        return DQuat::IDENTITY;
    }
    DQuat::from_rotation_arc(observer_velocity.normalize(), DVec3::Z)
}

/// Where the object was when the light now reaching the observer left it.
pub fn optical_position(position: DVec3, velocity: DVec3, offset: f64) -> DVec3 {
    position + velocity * offset
}

/// Retarded-time solver for one observer.
///
/// Solves the past light cone `|r + v t| = −c t` for the emission time
/// `t ≤ 0`, i.e. `(c² − |v|²) t² − 2(r·v) t − |r|² = 0`, taking the root that
/// lies in the past.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpticalDelaySolver {
    rotation: DQuat,
    speed_of_light: f64,
}

impl OpticalDelaySolver {
    pub fn new(observer_rotation: DQuat, speed_of_light: f64) -> Self {
        Self {
            rotation: observer_rotation,
            speed_of_light,
        }
    }

    pub fn for_observer(observer: &ObserverFrame, speed_of_light: f64) -> Self {
        Self::new(observer_alignment(observer.velocity), speed_of_light)
    }

    pub fn rotation(&self) -> DQuat {
        self.rotation
    }

    /// Optical time offset for an object at `relative_position` from the
    /// observer, moving with `object_velocity`.
    pub fn offset(&self, relative_position: DVec3, object_velocity: DVec3) -> f64 {
        let r = self.rotation * relative_position;
        let v = self.rotation * object_velocity;
        let c = self.speed_of_light;

        let a = c * c - v.length_squared();
        let b = -2.0 * r.dot(v);
        let k = -r.length_squared();

        if a.abs() < DIV_BY_ZERO_CUTOFF {
            // Object moving at the signal speed: the cone equation is linear.
            if b.abs() < DIV_BY_ZERO_CUTOFF {
                return 0.0;
            }
            return (-k / b).min(0.0);
        }

        let discriminant = (b * b - 4.0 * a * k).max(0.0);
        (-b - discriminant.sqrt()) / (2.0 * a)
    }

    /// Observer-perceived time of the object's state.
    pub fn optical_time(
        &self,
        world_time: f64,
        relative_position: DVec3,
        object_velocity: DVec3,
    ) -> f64 {
        world_time + self.offset(relative_position, object_velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_rest() -> OpticalDelaySolver {
        OpticalDelaySolver::new(DQuat::IDENTITY, 1.0)
    }

    #[test]
    fn static_object_is_seen_one_light_time_ago() {
        let offset = at_rest().offset(DVec3::new(10.0, 0.0, 0.0), DVec3::ZERO);
        assert_eq!(offset, -10.0);
    }

    #[test]
    fn coincident_object_has_no_delay() {
        let solver = at_rest();
        for v in [DVec3::ZERO, DVec3::new(0.3, -0.4, 0.1), DVec3::new(5.0, 0.0, 0.0)] {
            assert_eq!(solver.offset(DVec3::ZERO, v), 0.0);
        }
    }

    #[test]
    fn emission_event_lies_on_the_past_light_cone() {
        let solver = OpticalDelaySolver::new(DQuat::IDENTITY, 2.0);
        let r = DVec3::new(3.0, -1.0, 4.0);
        let v = DVec3::new(-0.5, 1.2, 0.3);
        let t = solver.offset(r, v);
        assert!(t < 0.0);
        let emitted = optical_position(r, v, t);
        assert!((emitted.length() + 2.0 * t).abs() < 1e-12);
    }

    #[test]
    fn offset_never_positive_below_light_speed() {
        let solver = at_rest();
        let positions = [
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(-4.0, 2.0, 0.5),
            DVec3::new(0.0, 0.0, -100.0),
        ];
        let velocities = [
            DVec3::ZERO,
            DVec3::new(0.99, 0.0, 0.0),
            DVec3::new(-0.99, 0.0, 0.0),
            DVec3::new(0.0, 0.6, -0.6),
        ];
        for r in positions {
            for v in velocities {
                assert!(solver.offset(r, v) <= 0.0, "r={r} v={v}");
            }
        }
    }

    #[test]
    fn receding_at_light_speed_uses_linear_root() {
        let solver = at_rest();
        // b = -2 r·v = -20, k = -100, t = -k/b = -5.
        let t = solver.offset(DVec3::new(10.0, 0.0, 0.0), DVec3::new(1.0, 0.0, 0.0));
        assert!((t + 5.0).abs() < 1e-12);
    }

    #[test]
    fn approaching_at_light_speed_clamps_to_now() {
        let solver = at_rest();
        let t = solver.offset(DVec3::new(10.0, 0.0, 0.0), DVec3::new(-1.0, 0.0, 0.0));
        assert_eq!(t, 0.0);
    }

    #[test]
    fn observer_rotation_preserves_delay() {
        let observer = ObserverFrame {
            position: DVec3::ZERO,
            velocity: DVec3::new(0.3, 0.4, 0.0),
        };
        let solver = OpticalDelaySolver::for_observer(&observer, 1.0);
        let r = DVec3::new(2.0, 5.0, -1.0);
        let v = DVec3::new(0.1, -0.2, 0.3);
        assert!((solver.offset(r, v) - at_rest().offset(r, v)).abs() < 1e-12);
        assert!(
            (solver.rotation() * observer.velocity.normalize()).abs_diff_eq(DVec3::Z, 1e-12)
        );
    }

    #[test]
    fn resting_observer_needs_no_alignment() {
        assert_eq!(observer_alignment(DVec3::ZERO), DQuat::IDENTITY);
    }

    #[test]
    fn optical_time_adds_offset() {
        let t = at_rest().optical_time(20.0, DVec3::new(0.0, 6.0, 8.0), DVec3::ZERO);
        assert!((t - 10.0).abs() < 1e-12);
    }
}

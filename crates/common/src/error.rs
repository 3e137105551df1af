/// Errors raised while validating constants or scene parameters.
///
/// The numerical core itself never fails; these only guard the edges where
/// configuration enters the system.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("{name} must be non-negative and finite, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("{name} must be finite")]
    NonFinite { name: &'static str },
    #[error("unknown geometry reference `{0}`")]
    UnknownGeometry(String),
    #[error("duplicate geometry name `{0}`")]
    DuplicateGeometry(String),
}

impl ConfigError {
    /// Check that `value` is strictly positive and finite.
    pub fn require_positive(name: &'static str, value: f64) -> Result<f64, Self> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(Self::NonPositive { name, value })
        }
    }

    /// Check that `value` is non-negative and finite.
    pub fn require_non_negative(name: &'static str, value: f64) -> Result<f64, Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(Self::Negative { name, value })
        }
    }

    /// Check that every component of a vector is finite.
    pub fn require_finite(name: &'static str, value: glam::DVec3) -> Result<glam::DVec3, Self> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::NonFinite { name })
        }
    }
}

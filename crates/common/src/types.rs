use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a rendered relativistic object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a gravitating body (one conformal geometry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GeometryId(pub Uuid);

impl GeometryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GeometryId {
    fn default() -> Self {
        Self::new()
    }
}

/// Short form used in logs and inspector output.
impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

impl std::fmt::Display for GeometryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_uniqueness() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn geometry_id_display_is_short() {
        let id = GeometryId::new();
        assert_eq!(format!("{id}").len(), 8);
    }
}

use lightcone_common::{ConfigError, GeometryId, ObjectId};

/// Errors from scene operations and scene-file loading.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("geometry {0} not found")]
    UnknownGeometry(GeometryId),
    #[error("object {0} not found")]
    UnknownObject(ObjectId),
    #[error("invalid scene configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

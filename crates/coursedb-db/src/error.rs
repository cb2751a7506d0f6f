use thiserror::Error;

/// Underlying persistence failure. The engine propagates these unchanged
/// and does not diagnose them further.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
    #[error("could not serialize course document: {0}")]
    Serialize(#[from] bson::ser::Error),
    #[error("could not deserialize course document: {0}")]
    Deserialize(#[from] bson::de::Error),
}

use crate::character::CharacterId;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when reading or modifying a campaign.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The requested character ID does not exist in the campaign.
    #[error("character not found: {0}")]
    CharacterNotFound(CharacterId),

    /// No character carries the requested name.
    #[error("character not found: \"{0}\"")]
    CharacterNameNotFound(String),

    /// The requested class does not exist in the campaign.
    #[error("class not found: \"{0}\"")]
    ClassNotFound(String),

    /// A character or class with the same name already exists.
    #[error("already exists: \"{0}\"")]
    DuplicateName(String),

    /// The campaign file could not be parsed or written.
    #[error("campaign JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

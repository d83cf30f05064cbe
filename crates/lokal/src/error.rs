use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by resource loading and text lookup.
#[derive(Debug, Error)]
pub enum I18nError {
    /// The resource file does not exist.
    #[error("language resource not found: {}", .0.display())]
    ResourceNotFound(PathBuf),

    /// The resource file exists but could not be read or decoded.
    #[error("failed to read language resource {}: {reason}", .path.display())]
    ResourceRead { path: PathBuf, reason: String },

    /// An operation referenced a language with no loaded table.
    #[error("language '{0}' couldn't be found")]
    LanguageNotFound(String),

    /// A default-language lookup was made before any default was set.
    #[error("no default language is set")]
    NoDefaultLanguage,
}

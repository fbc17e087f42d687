//! Error types for the main menu
//!
//! Only [`MenuError::NoMenuScript`] is fatal. Every other kind is logged where
//! it happens and the menu keeps running in a degraded state.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum MenuError {
    /// A menu script could not be read or executed at load time
    ScriptLoad { path: PathBuf, reason: String },

    /// A script callback raised an error while the menu was running
    ScriptRuntime(String),

    /// Neither the custom nor the builtin menu script could be loaded
    NoMenuScript,

    /// An image could not be bound to a texture layer
    TextureLoad { path: PathBuf, reason: String },

    /// A download did not complete
    NetworkFetch { url: String, reason: String },

    /// Settings file is unreadable or malformed
    Config(String),

    /// Drawing or presenting a frame failed
    Video(String),

    Io(std::io::Error),
}

impl fmt::Display for MenuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuError::ScriptLoad { path, reason } => {
                write!(f, "Failed to load menu script {}: {}", path.display(), reason)
            }
            MenuError::ScriptRuntime(msg) => write!(f, "Menu script error: {}", msg),
            MenuError::NoMenuScript => write!(f, "No usable main menu script"),
            MenuError::TextureLoad { path, reason } => {
                write!(f, "Failed to load texture {}: {}", path.display(), reason)
            }
            MenuError::NetworkFetch { url, reason } => {
                write!(f, "File at url \"{}\" not fetched ({})", url, reason)
            }
            MenuError::Config(msg) => write!(f, "Settings error: {}", msg),
            MenuError::Video(msg) => write!(f, "Video error: {}", msg),
            MenuError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for MenuError {}

impl From<std::io::Error> for MenuError {
    fn from(err: std::io::Error) -> Self {
        MenuError::Io(err)
    }
}

impl From<serde_json::Error> for MenuError {
    fn from(err: serde_json::Error) -> Self {
        MenuError::Config(err.to_string())
    }
}

impl From<mlua::Error> for MenuError {
    fn from(err: mlua::Error) -> Self {
        MenuError::ScriptRuntime(err.to_string())
    }
}

impl From<MenuError> for String {
    fn from(error: MenuError) -> Self {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = MenuError::TextureLoad {
            path: PathBuf::from("menu/header.png"),
            reason: "bad png".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to load texture menu/header.png: bad png");

        let err = MenuError::NetworkFetch {
            url: "http://example.invalid/a.zip".to_string(),
            reason: "404".to_string(),
        };
        assert!(err.to_string().contains("example.invalid"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: MenuError = io.into();
        assert!(matches!(err, MenuError::Io(_)));
        let text: String = err.into();
        assert!(text.starts_with("IO error"));
    }
}

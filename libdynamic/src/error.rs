use std::path::PathBuf;

use thiserror::Error;

/// A library file could not be opened.
///
/// Covers a missing file, an architecture mismatch, unresolved dependencies
/// of the library and permission problems. `reason` is the platform's own
/// diagnostic.
#[derive(Debug, Clone, Error)]
#[error("Failed to load library: {} - {reason}", .path.display())]
pub struct LoadError {
    pub path: PathBuf,
    pub reason: String,
}

/// A symbol could not be resolved in the current module.
#[derive(Debug, Clone, Error)]
pub enum SymbolError {
    #[error("Failed to load symbol: {symbol} - library is not loaded")]
    NotLoaded { symbol: String },

    #[error("Failed to load symbol: {symbol} - {reason}")]
    NotFound { symbol: String, reason: String },
}

impl SymbolError {
    /// Name of the symbol that failed to resolve
    pub fn symbol(&self) -> &str {
        match self {
            SymbolError::NotLoaded { symbol } | SymbolError::NotFound { symbol, .. } => symbol,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let load = LoadError {
            path: PathBuf::from("./bin/libmissing.so"),
            reason: "cannot open shared object file".into(),
        };
        assert_eq!(
            load.to_string(),
            "Failed to load library: ./bin/libmissing.so - cannot open shared object file"
        );

        let missing = SymbolError::NotFound {
            symbol: "doesNotExist".into(),
            reason: "undefined symbol: doesNotExist".into(),
        };
        assert_eq!(missing.symbol(), "doesNotExist");
        assert!(missing.to_string().starts_with("Failed to load symbol: doesNotExist - "));

        let unloaded = SymbolError::NotLoaded { symbol: "intAdd".into() };
        assert_eq!(
            Error::from(unloaded).to_string(),
            "Failed to load symbol: intAdd - library is not loaded"
        );
    }
}

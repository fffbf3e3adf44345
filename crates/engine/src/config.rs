//! Environment-derived configuration.

use std::path::PathBuf;

/// Engine configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,
}

impl EngineConfig {
    /// Resolve configuration. `WORLDWEAVER_DB` overrides the default
    /// `<home>/.worldweaver/worldweaver.db`.
    pub fn from_env() -> Self {
        let database_path = std::env::var("WORLDWEAVER_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_database_path());
        Self { database_path }
    }
}

/// `<home>/.worldweaver/worldweaver.db`, falling back to the working
/// directory when no home directory is available.
fn default_database_path() -> PathBuf {
    let base = directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(".worldweaver").join("worldweaver.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path_lands_in_dot_worldweaver() {
        let path = default_database_path();
        assert!(path.ends_with(".worldweaver/worldweaver.db"));
    }
}

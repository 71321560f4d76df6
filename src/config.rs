use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::graph::NodeIdentity;

pub const DEFAULT_PORT: u16 = 9999;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RefgraphConfig {
    pub database: Option<String>,
    /// User whose references are shown when none is given explicitly
    pub user: Option<i64>,
    pub identity: Option<NodeIdentity>,
    pub port: Option<u16>,
}

impl RefgraphConfig {
    /// Starter config written by `init`
    pub fn starter(base: &Path) -> Self {
        Self {
            database: Some(default_database_path_in(base).to_string_lossy().to_string()),
            user: Some(1),
            identity: Some(NodeIdentity::Name),
            port: Some(DEFAULT_PORT),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.database
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| default_database_path_in(Path::new(".")))
    }

    pub fn identity(&self) -> NodeIdentity {
        self.identity.unwrap_or_default()
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("refgraph.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".refgraph").join("refgraph.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<RefgraphConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: RefgraphConfig = toml::from_str(&contents)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &RefgraphConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub fn ensure_gitignore(project_root: &Path) -> anyhow::Result<()> {
    let gitignore_path = project_root.join(".gitignore");
    let entry = ".refgraph/";

    let mut content = String::new();
    if gitignore_path.exists() {
        content = std::fs::read_to_string(&gitignore_path)?;
        if content.lines().any(|line| line.trim() == entry) {
            return Ok(());
        }
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
    }
    content.push_str(entry);
    content.push('\n');
    std::fs::write(&gitignore_path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("refgraph.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refgraph.toml");
        let config = RefgraphConfig {
            identity: Some(NodeIdentity::StableId),
            ..RefgraphConfig::starter(dir.path())
        };

        write_config(&path, &config, false).unwrap();
        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.identity(), NodeIdentity::StableId);
    }

    #[test]
    fn test_parse_identity_from_toml() {
        let config: RefgraphConfig = toml::from_str("identity = \"stable_id\"\nuser = 3\n").unwrap();
        assert_eq!(config.identity(), NodeIdentity::StableId);
        assert_eq!(config.user, Some(3));
        assert_eq!(config.port(), DEFAULT_PORT);
    }

    #[test]
    fn test_ensure_gitignore_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "target/").unwrap();

        ensure_gitignore(dir.path()).unwrap();
        ensure_gitignore(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(content, "target/\n.refgraph/\n");
    }

    #[test]
    fn test_ensure_db_dir() {
        let dir = tempfile::tempdir().unwrap();
        let db = default_database_path_in(dir.path());
        ensure_db_dir(&db).unwrap();
        assert!(db.parent().unwrap().is_dir());
    }
}

use crate::infrastructure::config::{ensure_default_configs, load_configs};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::storage::initialize_database;
use std::fs;
use std::path::{Path, PathBuf};

const DATABASE_FILE: &str = "dayblock.sqlite";

#[derive(Debug)]
pub struct BootstrapResult {
    pub workspace_root: PathBuf,
    pub config_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub database_path: PathBuf,
}

pub fn bootstrap_workspace(workspace_root: &Path) -> Result<BootstrapResult, InfraError> {
    let config_dir = workspace_root.join("config");
    let state_dir = workspace_root.join("state");
    let logs_dir = workspace_root.join("logs");
    let database_path = state_dir.join(DATABASE_FILE);

    fs::create_dir_all(&config_dir)?;
    fs::create_dir_all(&state_dir)?;
    fs::create_dir_all(&logs_dir)?;

    ensure_default_configs(&config_dir)?;
    let _ = load_configs(&config_dir)?;
    initialize_database(&database_path)?;

    Ok(BootstrapResult {
        workspace_root: workspace_root.to_path_buf(),
        config_dir,
        logs_dir,
        database_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_creates_layout_and_is_repeatable() {
        let root = std::env::temp_dir().join(format!("dayblock-bootstrap-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);

        let result = bootstrap_workspace(&root).expect("bootstrap");
        assert!(result.config_dir.join("schedule.json").exists());
        assert!(result.config_dir.join("app.json").exists());
        assert!(result.logs_dir.is_dir());
        assert!(result.database_path.exists());

        let again = bootstrap_workspace(&root).expect("bootstrap again");
        assert_eq!(again.database_path, result.database_path);

        let _ = fs::remove_dir_all(&root);
    }
}

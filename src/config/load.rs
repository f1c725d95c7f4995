use crate::config::{ConfigError, Settings};
use crate::shared::atomic_write_file;
use std::fs;
use std::path::Path;

pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let settings: Settings = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    settings.validate()?;
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    settings.validate()?;
    let encoded = serde_yaml::to_string(settings).map_err(|source| ConfigError::Encode {
        path: path.display().to_string(),
        source,
    })?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.display().to_string(),
            source,
        })?;
    }
    atomic_write_file(path, encoded.as_bytes()).map_err(|source| ConfigError::Write {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn settings_round_trip_through_yaml_file() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join("config.yaml");
        let settings: Settings = serde_yaml::from_str(
            r#"
workspaces_path: /srv/burrow/workspaces
skills_path: /srv/burrow/skills
tickets_path: /srv/burrow/tickets
readiness:
  max_attempts: 3
  poll_interval_ms: 50
"#,
        )
        .expect("parse settings");

        save_settings(&config_path, &settings).expect("save");
        let loaded = load_settings(&config_path).expect("load");

        assert_eq!(
            loaded.workspaces_path,
            std::path::PathBuf::from("/srv/burrow/workspaces")
        );
        assert_eq!(
            loaded.tickets_path,
            Some(std::path::PathBuf::from("/srv/burrow/tickets"))
        );
        assert_eq!(loaded.readiness.max_attempts, 3);
        assert_eq!(loaded.readiness.poll_interval_ms, 50);
    }

    #[test]
    fn load_rejects_invalid_yaml() {
        let temp = tempdir().expect("tempdir");
        let config_path = temp.path().join("config.yaml");
        fs::write(&config_path, "workspaces_path: [unclosed").expect("write");

        let err = load_settings(&config_path).expect_err("must fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}

use crate::model::Rules;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub enable_color: bool,
    pub log_filter: String,
    pub rules: Rules,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_color: true,
            log_filter: "info".to_string(),
            rules: Rules::default(),
        }
    }
}

pub struct Paths {
    pub save_path: PathBuf,
    pub settings_path: PathBuf,
    pub log_path: PathBuf,
}

pub fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "termipet", "Termipet")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir)
        .with_context(|| format!("could not create data dir {}", dir.display()))?;
    Ok(Paths {
        save_path: dir.join("save.json"),
        settings_path: dir.join("settings.json"),
        log_path: dir.join("termipet.log"),
    })
}

/// Missing or unreadable settings fall back to defaults.
pub fn load_settings(path: &Path) -> Settings {
    let mut s = fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str::<Settings>(&raw).ok())
        .unwrap_or_default();
    s.rules = s.rules.sanitized();
    s
}

pub fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data)?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

pub fn atomic_rename(from: &Path, to: &Path) -> std::io::Result<()> {
    // rename() replaces atomically on the same filesystem; Windows refuses
    // to rename over an existing file.
    if cfg!(windows) && to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("termipet-cfg-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = temp_dir();
        assert_eq!(load_settings(&dir.join("nope.json")), Settings::default());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let dir = temp_dir();
        let path = dir.join("settings.json");
        fs::write(&path, r#"{ "rules": { "decay_tick_ms": 0, "autosave_secs": 10 } }"#).unwrap();
        let s = load_settings(&path);
        assert!(s.enable_color);
        assert_eq!(s.rules.decay_tick_ms, 1000);
        assert_eq!(s.rules.autosave_secs, 10);
        assert_eq!(s.rules.base_decay_rate, 0.05);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn save_then_load() {
        let dir = temp_dir();
        let path = dir.join("settings.json");
        let s = Settings {
            enable_color: false,
            log_filter: "debug".to_string(),
            ..Settings::default()
        };
        save_settings_atomic(&path, &s).unwrap();
        save_settings_atomic(&path, &s).unwrap();
        assert_eq!(load_settings(&path), s);
        let _ = fs::remove_dir_all(dir);
    }
}

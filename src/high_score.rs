use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const HIGH_SCORE_PATH_ENV: &str = "BLOCKFALL_HIGH_SCORE_PATH";

#[derive(Debug, Error)]
pub enum HighScoreError {
    #[error("failed to write high score to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode high score")]
    Encode(#[from] serde_json::Error),
}

/// Best score seen so far; raised whenever a game beats it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct HighScore {
    best: u32,
}

impl HighScore {
    pub fn new(best: u32) -> Self {
        Self { best }
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Returns true when `score` raised the best.
    pub fn observe(&mut self, score: u32) -> bool {
        if score > self.best {
            self.best = score;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct HighScoreRecord {
    #[serde(rename = "tetrisHighScore")]
    high_score: u32,
}

#[derive(Debug, Clone)]
pub struct HighScoreStore {
    path: PathBuf,
}

impl HighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os(HIGH_SCORE_PATH_ENV) {
            return Self::new(explicit);
        }

        let base = std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".local");
                    p.push("share");
                    p
                })
            });

        match base {
            Some(mut path) => {
                path.push("blockfall");
                path.push("high_score.json");
                Self { path }
            }
            None => Self::new("high_score.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files count as no high score yet.
    pub fn load(&self) -> u32 {
        let Ok(bytes) = fs::read(&self.path) else {
            return 0;
        };
        serde_json::from_slice::<HighScoreRecord>(&bytes)
            .map(|record| record.high_score)
            .unwrap_or(0)
    }

    pub fn save(&self, high_score: u32) -> Result<(), HighScoreError> {
        let write_err = |source| HighScoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }
        let text = serde_json::to_string_pretty(&HighScoreRecord { high_score })?;
        fs::write(&self.path, text).map_err(write_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn scratch_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("blockfall-{}-{name}", std::process::id()));
        path.push("high_score.json");
        path
    }

    #[test]
    fn tracker_only_rises() {
        let mut high = HighScore::new(300);
        assert!(!high.observe(200));
        assert!(!high.observe(300));
        assert!(high.observe(400));
        assert_eq!(high.best(), 400);
    }

    #[test]
    fn missing_file_loads_zero() {
        let store = HighScoreStore::new(scratch_path("missing"));
        assert_eq!(store.load(), 0);
    }

    #[test]
    fn save_then_load() {
        let path = scratch_path("roundtrip");
        let store = HighScoreStore::new(&path);

        store.save(1200).expect("save should succeed");
        assert_eq!(store.load(), 1200);

        let text = fs::read_to_string(&path).expect("file should exist");
        assert!(text.contains("\"tetrisHighScore\": 1200"));

        let _ = fs::remove_dir_all(path.parent().expect("scratch path has a parent"));
    }

    #[test]
    fn corrupt_file_loads_zero() {
        let path = scratch_path("corrupt");
        fs::create_dir_all(path.parent().expect("scratch path has a parent"))
            .expect("create scratch dir");
        fs::write(&path, "not json").expect("write scratch file");

        assert_eq!(HighScoreStore::new(&path).load(), 0);

        let _ = fs::remove_dir_all(path.parent().expect("scratch path has a parent"));
    }

    #[test]
    #[serial]
    fn env_override_wins() {
        let path = scratch_path("env");
        std::env::set_var(HIGH_SCORE_PATH_ENV, &path);
        let store = HighScoreStore::from_env();
        std::env::remove_var(HIGH_SCORE_PATH_ENV);

        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    #[serial]
    fn xdg_data_home_is_used_without_override() {
        std::env::remove_var(HIGH_SCORE_PATH_ENV);
        let previous = std::env::var_os("XDG_DATA_HOME");
        std::env::set_var("XDG_DATA_HOME", "/tmp/blockfall-xdg");

        let store = HighScoreStore::from_env();

        match previous {
            Some(value) => std::env::set_var("XDG_DATA_HOME", value),
            None => std::env::remove_var("XDG_DATA_HOME"),
        }
        assert_eq!(
            store.path(),
            Path::new("/tmp/blockfall-xdg/blockfall/high_score.json")
        );
    }
}

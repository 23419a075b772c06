//! # Preference Store
//!
//! Persists per-color affinity weights and a sustainability bias, adjusted
//! by explicit like/dislike feedback. The backing file is read on every
//! pipeline run and rewritten on every feedback event.
//!
//! The read-modify-write is not locked: under a concurrent front end two
//! feedback events on the same color can lose an update (last write wins).
//! That is an accepted weakness of the single-user scope; a multi-user
//! deployment needs an exclusive lock or transactional write around
//! `update`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::catalog::Item;
use crate::error::StylistError;

/// Feedback applied to a catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Like,
    Dislike,
}

/// Affinity an unseen color starts from before the first nudge.
const AFFINITY_BASELINE: f64 = 0.5;
/// How far one feedback event moves a color's affinity.
const AFFINITY_STEP: f64 = 0.1;

fn default_sustainability_bias() -> f64 {
    0.5
}

/// Persisted user preferences. Affinities always stay in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub preferred_colors: BTreeMap<String, f64>,
    #[serde(default = "default_sustainability_bias")]
    pub sustainability_bias: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            preferred_colors: BTreeMap::new(),
            sustainability_bias: default_sustainability_bias(),
        }
    }
}

/// File-backed store. Holds only the path; state lives on disk.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read preferences from disk. A missing file is the documented default,
    /// not an error; a malformed file is fatal.
    pub fn load(&self) -> Result<Preferences, StylistError> {
        match fs::read_to_string(&self.path) {
            Ok(data) => {
                serde_json::from_str(&data).map_err(|e| StylistError::PreferenceLoad {
                    path: self.path.clone(),
                    detail: e.to_string(),
                })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Preferences::default()),
            Err(e) => Err(StylistError::PreferenceLoad {
                path: self.path.clone(),
                detail: e.to_string(),
            }),
        }
    }

    /// Write preferences as pretty JSON via a temp file + rename, so a
    /// crashed write never leaves a truncated file behind.
    pub fn save(&self, preferences: &Preferences) -> Result<(), StylistError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                let _ = fs::create_dir_all(parent); // best-effort
            }
        }

        let json =
            serde_json::to_string_pretty(preferences).unwrap_or_else(|_| "{}".to_string());
        let tmp = self.path.with_extension("json.tmp");

        let io_err = |source: io::Error| StylistError::PreferenceSave {
            path: self.path.clone(),
            source,
        };

        let mut f = fs::File::create(&tmp).map_err(io_err)?;
        f.write_all(json.as_bytes()).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }

    /// Nudge the affinity of `item`'s color by one feedback step from the
    /// 0.5 baseline, clamp to [0, 1], and persist synchronously. The only
    /// mutating operation in the system.
    pub fn update(
        &self,
        mut preferences: Preferences,
        item: &Item,
        feedback: Feedback,
    ) -> Result<Preferences, StylistError> {
        let affinity = preferences
            .preferred_colors
            .entry(item.color.clone())
            .or_insert(AFFINITY_BASELINE);
        *affinity = match feedback {
            Feedback::Like => (*affinity + AFFINITY_STEP).min(1.0),
            Feedback::Dislike => (*affinity - AFFINITY_STEP).max(0.0),
        };
        self.save(&preferences)?;
        Ok(preferences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Style, Weather};

    fn unique_tmp_dir() -> PathBuf {
        let mut dir = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        dir.push(format!("prefs_test_{nanos}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn navy_item() -> Item {
        Item {
            id: "navy-blazer".to_string(),
            weather: Weather::Mild,
            style: Style::SemiFormal,
            formality: 6.0,
            color: "navy".to_string(),
        }
    }

    #[test]
    fn missing_file_yields_default() {
        let dir = unique_tmp_dir();
        let store = PreferenceStore::new(dir.join("memory.json"));
        let prefs = store.load().expect("default");
        assert_eq!(prefs, Preferences::default());
        assert!(prefs.preferred_colors.is_empty());
        assert!((prefs.sustainability_bias - 0.5).abs() < 1e-9);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn first_save_materializes_the_default() {
        let dir = unique_tmp_dir();
        let store = PreferenceStore::new(dir.join("memory.json"));
        let prefs = store.load().unwrap();
        store.save(&prefs).expect("save default");
        assert!(store.path().exists());
        assert_eq!(store.load().unwrap(), Preferences::default());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_load_round_trip_is_a_noop() {
        let dir = unique_tmp_dir();
        let store = PreferenceStore::new(dir.join("memory.json"));
        let mut prefs = Preferences::default();
        prefs.preferred_colors.insert("navy".to_string(), 0.7);
        prefs.sustainability_bias = 0.9;
        store.save(&prefs).unwrap();
        let first = fs::read_to_string(store.path()).unwrap();
        let reloaded = store.load().unwrap();
        assert_eq!(reloaded, prefs);
        store.save(&reloaded).unwrap();
        let second = fs::read_to_string(store.path()).unwrap();
        assert_eq!(first, second, "byte-for-byte stable without mutation");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn like_from_absent_lands_above_baseline() {
        let dir = unique_tmp_dir();
        let store = PreferenceStore::new(dir.join("memory.json"));
        let prefs = store
            .update(Preferences::default(), &navy_item(), Feedback::Like)
            .unwrap();
        assert!((prefs.preferred_colors["navy"] - 0.6).abs() < 1e-9);
        // Persisted synchronously.
        let reloaded = store.load().unwrap();
        assert!((reloaded.preferred_colors["navy"] - 0.6).abs() < 1e-9);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn dislike_from_absent_lands_below_baseline() {
        let dir = unique_tmp_dir();
        let store = PreferenceStore::new(dir.join("memory.json"));
        let prefs = store
            .update(Preferences::default(), &navy_item(), Feedback::Dislike)
            .unwrap();
        assert!((prefs.preferred_colors["navy"] - 0.4).abs() < 1e-9);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn clamps_hold_at_the_boundaries() {
        let dir = unique_tmp_dir();
        let store = PreferenceStore::new(dir.join("memory.json"));

        let mut prefs = Preferences::default();
        prefs.preferred_colors.insert("navy".to_string(), 1.0);
        let liked = store.update(prefs, &navy_item(), Feedback::Like).unwrap();
        assert_eq!(liked.preferred_colors["navy"], 1.0, "like at 1.0 stays");

        let mut prefs = Preferences::default();
        prefs.preferred_colors.insert("navy".to_string(), 0.0);
        let disliked = store
            .update(prefs, &navy_item(), Feedback::Dislike)
            .unwrap();
        assert_eq!(disliked.preferred_colors["navy"], 0.0, "dislike at 0.0 stays");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_file_is_fatal() {
        let dir = unique_tmp_dir();
        let path = dir.join("memory.json");
        fs::write(&path, "{ nope").unwrap();
        let store = PreferenceStore::new(&path);
        let err = store.load().unwrap_err();
        assert!(matches!(err, StylistError::PreferenceLoad { .. }));
        let _ = fs::remove_dir_all(&dir);
    }
}

//! Persisted per-test duration history

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Mapping from test identifier to observed wall-clock seconds
pub type DurationMap = BTreeMap<String, f64>;

/// Store errors. Only writes can fail; reads degrade to a cold cache.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store file could not be written
    #[error("Failed to write duration store {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The store could not be serialized
    #[error("Failed to encode duration store: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Environment fingerprint keying the default store location.
///
/// Durations measured on one platform or shard group say little about
/// another, so each gets its own history file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute a fingerprint from a platform string and shard group
    pub fn compute(platform: &str, group: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(platform.as_bytes());
        hasher.update(b"\0");
        hasher.update(group.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        Self(digest[..16].to_string())
    }

    /// Fingerprint for the current platform and the given shard group
    pub fn current(group: &str) -> Self {
        let platform = format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH);
        Self::compute(&platform, group)
    }

    /// The fingerprint as a hex string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Duration history persisted as a flat JSON object
#[derive(Debug, Clone, Default)]
pub struct DurationStore {
    durations: DurationMap,
}

impl DurationStore {
    /// Default store path under a repository root
    pub fn default_path(root: &Path, fingerprint: &Fingerprint) -> PathBuf {
        root.join(".switchyard")
            .join("durations")
            .join(format!("{}.json", fingerprint))
    }

    /// Load a store, treating absence or corruption as a cold cache.
    ///
    /// Timing history only tunes shard balance, so a broken store must
    /// never break the run.
    pub fn load(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no duration history, starting cold");
                return Self::default();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "duration history unreadable, starting cold");
                return Self::default();
            }
        };
        Self::parse(&contents, path)
    }

    fn parse(contents: &str, path: &Path) -> Self {
        let value: serde_json::Value = match serde_json::from_str(contents) {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "duration history corrupt, starting cold");
                return Self::default();
            }
        };

        let object = match value.as_object() {
            Some(object) => object,
            None => {
                warn!(path = %path.display(), "duration history is not an object, starting cold");
                return Self::default();
            }
        };

        let mut durations = DurationMap::new();
        for (test, value) in object {
            match value.as_f64() {
                Some(seconds) if seconds.is_finite() && seconds >= 0.0 => {
                    durations.insert(test.clone(), seconds);
                }
                _ => {
                    warn!(test = %test, "dropping corrupt duration entry");
                }
            }
        }

        debug!(path = %path.display(), count = durations.len(), "duration history loaded");
        Self { durations }
    }

    /// Write the full store atomically, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.durations)?;

        let write_err = |source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        // Temp-then-rename so a crashed writer never leaves a torn store
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, format!("{}\n", json)).map_err(write_err)?;
        std::fs::rename(&tmp, path).map_err(write_err)?;
        Ok(())
    }

    /// Merge measured durations in, last write wins per test
    pub fn merge(&mut self, report: &DurationMap) {
        for (test, seconds) in report {
            self.durations.insert(test.clone(), *seconds);
        }
    }

    /// Known duration for a test, if any
    pub fn get(&self, test: &str) -> Option<f64> {
        self.durations.get(test).copied()
    }

    /// Number of tests with known durations
    pub fn len(&self) -> usize {
        self.durations.len()
    }

    /// Returns true when no durations are known
    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    /// Mean of the known durations, used to weight unseen tests
    pub fn mean(&self) -> Option<f64> {
        if self.durations.is_empty() {
            return None;
        }
        let total: f64 = self.durations.values().sum();
        Some(total / self.durations.len() as f64)
    }

    /// Borrow the underlying map
    pub fn as_map(&self) -> &DurationMap {
        &self.durations
    }
}

impl From<DurationMap> for DurationStore {
    fn from(durations: DurationMap) -> Self {
        Self { durations }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn map(entries: &[(&str, f64)]) -> DurationMap {
        entries
            .iter()
            .map(|(test, seconds)| (test.to_string(), *seconds))
            .collect()
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = Fingerprint::compute("linux-x86_64", "default");
        let b = Fingerprint::compute("linux-x86_64", "default");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 16);
    }

    #[test]
    fn test_fingerprint_differs_by_group_and_platform() {
        let base = Fingerprint::compute("linux-x86_64", "default");
        assert_ne!(base, Fingerprint::compute("linux-x86_64", "amd64"));
        assert_ne!(base, Fingerprint::compute("macos-aarch64", "default"));
    }

    #[test]
    fn test_load_missing_file_is_cold() {
        let temp = TempDir::new().unwrap();
        let store = DurationStore::load(&temp.path().join("absent.json"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_cold() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("durations.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = DurationStore::load(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_non_object_is_cold() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("durations.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let store = DurationStore::load(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_skips_corrupt_entries() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("durations.json");
        std::fs::write(
            &path,
            r#"{
  "tests/test_good.py": 4.25,
  "tests/test_int.py": 7,
  "tests/test_string.py": "fast",
  "tests/test_negative.py": -1.0,
  "tests/test_null.py": null
}"#,
        )
        .unwrap();

        let store = DurationStore::load(&path);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("tests/test_good.py"), Some(4.25));
        assert_eq!(store.get("tests/test_int.py"), Some(7.0));
        assert_eq!(store.get("tests/test_string.py"), None);
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("durations.json");

        let store = DurationStore::from(map(&[("tests/test_a.py", 1.5), ("tests/test_b.py", 2.0)]));
        store.save(&path).unwrap();

        let reloaded = DurationStore::load(&path);
        assert_eq!(reloaded.as_map(), store.as_map());

        // Keys come out sorted in the written JSON
        let contents = std::fs::read_to_string(&path).unwrap();
        let a = contents.find("tests/test_a.py").unwrap();
        let b = contents.find("tests/test_b.py").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_merge_last_write_wins() {
        let mut store = DurationStore::from(map(&[("tests/test_a.py", 1.0), ("tests/test_b.py", 2.0)]));
        store.merge(&map(&[("tests/test_b.py", 5.0), ("tests/test_c.py", 3.0)]));

        assert_eq!(store.len(), 3);
        assert_eq!(store.get("tests/test_a.py"), Some(1.0));
        assert_eq!(store.get("tests/test_b.py"), Some(5.0));
        assert_eq!(store.get("tests/test_c.py"), Some(3.0));
    }

    #[test]
    fn test_merge_disjoint_reports_is_a_union() {
        let mut store = DurationStore::default();
        store.merge(&map(&[("tests/test_a.py", 1.0)]));
        store.merge(&map(&[("tests/test_b.py", 2.0)]));

        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_mean() {
        assert_eq!(DurationStore::default().mean(), None);

        let store = DurationStore::from(map(&[("a", 10.0), ("b", 2.0)]));
        assert_eq!(store.mean(), Some(6.0));
    }

    #[test]
    fn test_default_path_uses_fingerprint() {
        let fingerprint = Fingerprint::compute("linux-x86_64", "default");
        let path = DurationStore::default_path(Path::new("/repo"), &fingerprint);
        assert_eq!(
            path,
            PathBuf::from(format!(
                "/repo/.switchyard/durations/{}.json",
                fingerprint.as_str()
            ))
        );
    }
}

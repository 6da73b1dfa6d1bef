//! Resolution cache persistence
//!
//! The read cache can be saved as flat `key=value` text, one entry per line:
//!
//! ```text
//! iso19115-ISO 19115:CI_RoleCode=iso19115.Role
//! iso19115-ISO 19103:CharacterString=primitive:Text
//! ```
//!
//! Saving holds an exclusive lock on `<file>.lock` while it merges with
//! whatever is already on disk and replaces the file through a rename.
//! Entries saved by other instances survive, and readers never observe a
//! half-written file.

use crate::mapping::MappingError;
use crate::registry::TypeResolver;
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub fn format_cache(entries: &[(String, String)]) -> String {
    let mut text = String::new();
    for (key, value) in entries {
        text.push_str(key);
        text.push('=');
        text.push_str(value);
        text.push('\n');
    }
    text
}

/// Parse `key=value` lines; blank lines and `#` comments are ignored
pub fn parse_cache(text: &str) -> Vec<(String, String)> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| match line.split_once('=') {
            Some((key, value)) => Some((key.to_string(), value.to_string())),
            None => {
                tracing::warn!("Ignoring malformed cache line: {}", line);
                None
            }
        })
        .collect()
}

/// Restore the resolver cache from `path`; a missing file restores nothing
pub fn load_cache(resolver: &TypeResolver, path: &Path) -> Result<usize, MappingError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("No registry cache at {}", path.display());
            return Ok(0);
        }
        Err(e) => return Err(MappingError::cache_persistence(path, e)),
    };
    let imported = resolver.import_cache(&parse_cache(&text));
    tracing::info!("Restored {} registry cache entries from {}", imported, path.display());
    Ok(imported)
}

/// Merge the resolver cache into the file at `path`
///
/// Returns the number of entries written.
pub fn save_cache(resolver: &TypeResolver, path: &Path) -> Result<usize, MappingError> {
    let _lock = SaveLock::acquire(path)?;
    let mut merged: BTreeMap<String, String> = match fs::read_to_string(path) {
        Ok(text) => parse_cache(&text).into_iter().collect(),
        Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
        Err(e) => return Err(MappingError::cache_persistence(path, e)),
    };
    merged.extend(resolver.export_cache());

    let entries: Vec<(String, String)> = merged.into_iter().collect();
    let staging = staging_path(path);
    fs::write(&staging, format_cache(&entries))
        .map_err(|e| MappingError::cache_persistence(&staging, e))?;
    fs::rename(&staging, path).map_err(|e| MappingError::cache_persistence(path, e))?;

    tracing::info!("Saved {} registry cache entries to {}", entries.len(), path.display());
    Ok(entries.len())
}

/// Exclusive OS lock on the sidecar lock file, released on drop
struct SaveLock {
    file: File,
}

impl SaveLock {
    fn acquire(path: &Path) -> Result<Self, MappingError> {
        let lock_path = sibling_path(path, ".lock");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| MappingError::cache_persistence(&lock_path, e))?;
        FileExt::lock_exclusive(&file)
            .map_err(|e| MappingError::cache_persistence(&lock_path, e))?;
        Ok(Self { file })
    }
}

impl Drop for SaveLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!("Failed to release registry cache lock: {}", e);
        }
    }
}

fn staging_path(path: &Path) -> PathBuf {
    sibling_path(path, &format!(".{}.tmp", uuid::Uuid::new_v4().simple()))
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MappingMode;
    use std::sync::Barrier;
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn test_parse_skips_noise() {
        let entries = parse_cache("# header\n\na=b\nbroken\n c = d \n");
        assert_eq!(
            entries,
            vec![
                ("a".to_string(), "b".to_string()),
                ("c ".to_string(), " d".to_string())
            ]
        );
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let resolver = TypeResolver::builtin();
        let loaded = load_cache(&resolver, &dir.path().join("absent.cache")).unwrap();
        assert_eq!(loaded, 0);
    }

    #[test]
    fn test_save_then_load_restores_resolutions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.cache");

        let first = TypeResolver::builtin();
        first
            .resolve_type(MappingMode::Iso19115, "ISO 19115", "CI_RoleCode")
            .unwrap();
        first
            .resolve_type(MappingMode::Iso19115, "ISO 19103", "CharacterString")
            .unwrap();
        assert_eq!(save_cache(&first, &path).unwrap(), 2);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("iso19115-ISO 19115:CI_RoleCode=iso19115.Role\n"));

        let second = TypeResolver::builtin();
        assert_eq!(load_cache(&second, &path).unwrap(), 2);
        second
            .resolve_type(MappingMode::Iso19115, "ISO 19115", "CI_RoleCode")
            .unwrap();
        assert_eq!(second.chain_evaluations(), 0);
    }

    #[test]
    fn test_sequential_saves_merge_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.cache");

        let a = TypeResolver::builtin();
        a.resolve_type(MappingMode::Iso19115, "ISO 19115", "CI_RoleCode");
        let b = TypeResolver::builtin();
        b.resolve_type(MappingMode::SensorMl, "ISO 19108", "TM_Period");

        save_cache(&a, &path).unwrap();
        save_cache(&b, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("iso19115-ISO 19115:CI_RoleCode="));
        assert!(text.contains("sensorml-ISO 19108:TM_Period=gml.TimePeriod"));

        // The cache file and its lock file; no staging files are left behind.
        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["registry.cache", "registry.cache.lock"]);
    }

    #[test]
    fn test_concurrent_savers_do_not_lose_entries() {
        for _ in 0..50 {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("registry.cache");
            let barrier = Barrier::new(2);

            thread::scope(|scope| {
                let savers = [
                    (MappingMode::Iso19115, "ISO 19115", "CI_RoleCode"),
                    (MappingMode::SensorMl, "ISO 19108", "TM_Period"),
                ]
                .map(|(mode, standard, class)| {
                    let (path, barrier) = (&path, &barrier);
                    scope.spawn(move || {
                        let resolver = TypeResolver::builtin();
                        resolver.resolve_type(mode, standard, class);
                        barrier.wait();
                        save_cache(&resolver, path).unwrap();
                    })
                });
                for saver in savers {
                    saver.join().unwrap();
                }
            });

            let text = fs::read_to_string(&path).unwrap();
            assert!(text.contains("iso19115-ISO 19115:CI_RoleCode="));
            assert!(text.contains("sensorml-ISO 19108:TM_Period=gml.TimePeriod"));
        }
    }

    #[test]
    fn test_unknown_entries_are_skipped_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.cache");
        let text = concat!(
            "iso19115-ISO 19115:CI_Foo=iso19115.Missing\n",
            "bad key=iso19115.Role\n",
            "iso19115-ISO 19115:CI_RoleCode=iso19115.Role\n",
        );
        fs::write(&path, text).unwrap();

        let resolver = TypeResolver::builtin();
        assert_eq!(load_cache(&resolver, &path).unwrap(), 1);
    }
}

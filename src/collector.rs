//! Artifact collection
//!
//! This module handles:
//! - Walking directory sources recursively
//! - Walking zip archive sources entry by entry
//! - Normalizing file paths into dotted unit names
//! - Skipping deny-listed files (module/package descriptors, launch stubs)
//!
//! Collection performs no validation of unit bytes; that happens when the
//! isolated loader defines a unit.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use walkdir::WalkDir;

use crate::error::{LoadstoneError, Result};

/// File suffix of unit files
pub const UNIT_SUFFIX: &str = ".unit";

/// Bare file names that are never collected
const DENY_LIST: &[&str] = &["module-info.unit", "package-info.unit", "LaunchStub.unit"];

/// Raw unit bytes keyed by fully-qualified name, in collection order
pub type CollectedUnits = IndexMap<String, Vec<u8>>;

/// Collects unit bytes from directories and archives
#[derive(Debug, Clone, Default)]
pub struct ArtifactCollector {
    sources: Vec<PathBuf>,
}

impl ArtifactCollector {
    /// Create a collector over the given source locations
    pub fn new<I, P>(sources: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }

    /// Source locations, in the order they are collected
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Collect every unit reachable from the configured sources
    ///
    /// # Errors
    ///
    /// Returns `SourceUnreadable` as soon as any source location (or any
    /// entry inside it) cannot be read. Nothing is returned in that case.
    pub fn collect(&self) -> Result<CollectedUnits> {
        let mut units = CollectedUnits::new();

        for source in &self.sources {
            let metadata = std::fs::metadata(source).map_err(|e| unreadable(source, &e))?;

            let before = units.len();
            if metadata.is_dir() {
                collect_directory(source, &mut units)?;
            } else {
                collect_archive(source, &mut units)?;
            }

            tracing::debug!(
                source = %source.display(),
                units = units.len() - before,
                "collected units"
            );
        }

        Ok(units)
    }
}

/// Convert a source-relative path into a unit name
///
/// Returns `None` for files that are not units or are deny-listed.
///
/// ```text
/// app/world/Tile.unit   → app.world.Tile
/// app\world\Tile.unit   → app.world.Tile
/// app/module-info.unit  → (skipped)
/// app/readme.txt        → (skipped)
/// ```
pub fn unit_name(relative_path: &str) -> Option<String> {
    let normalized = relative_path.replace('\\', "/");
    let normalized = normalized.trim_start_matches('/');

    let bare = normalized.rsplit('/').next().unwrap_or(normalized);
    if DENY_LIST.contains(&bare) {
        return None;
    }

    let stem = normalized.strip_suffix(UNIT_SUFFIX)?;
    if stem.is_empty() || stem.ends_with('/') {
        return None;
    }

    Some(stem.replace('/', "."))
}

fn collect_directory(root: &Path, units: &mut CollectedUnits) -> Result<()> {
    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter();

    for entry in walker {
        let entry = entry.map_err(|e| LoadstoneError::SourceUnreadable {
            path: e
                .path()
                .unwrap_or(root)
                .display()
                .to_string(),
            reason: e.to_string(),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .to_string();

        let Some(name) = unit_name(&relative) else {
            continue;
        };

        let bytes = std::fs::read(entry.path()).map_err(|e| unreadable(entry.path(), &e))?;
        insert_unit(units, name, bytes, root);
    }

    Ok(())
}

fn collect_archive(path: &Path, units: &mut CollectedUnits) -> Result<()> {
    let file = File::open(path).map_err(|e| unreadable(path, &e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| unreadable(path, &e))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| unreadable(path, &e))?;
        if entry.is_dir() {
            continue;
        }

        let Some(name) = unit_name(entry.name()) else {
            continue;
        };

        let mut bytes = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| unreadable(path, &e))?;
        insert_unit(units, name, bytes, path);
    }

    Ok(())
}

/// Insert a unit unless an earlier source already provided it
fn insert_unit(units: &mut CollectedUnits, name: String, bytes: Vec<u8>, source: &Path) {
    if units.contains_key(&name) {
        tracing::warn!(
            unit = %name,
            source = %source.display(),
            "duplicate unit ignored; an earlier source already provides it"
        );
        return;
    }
    units.insert(name, bytes);
}

fn unreadable(path: &Path, err: &dyn std::fmt::Display) -> LoadstoneError {
    LoadstoneError::SourceUnreadable {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, content).expect("write file");
    }

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).expect("create archive");
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in entries {
            zip.start_file(*name, options).expect("start entry");
            zip.write_all(content.as_bytes()).expect("write entry");
        }
        zip.finish().expect("finish archive");
    }

    #[test]
    fn test_unit_name_normalization() {
        assert_eq!(unit_name("app/world/Tile.unit"), Some("app.world.Tile".into()));
        assert_eq!(unit_name("app\\world\\Tile.unit"), Some("app.world.Tile".into()));
        assert_eq!(unit_name("/Main.unit"), Some("Main".into()));
        assert_eq!(unit_name("app/readme.txt"), None);
        assert_eq!(unit_name("app/.unit"), None);
    }

    #[test]
    fn test_unit_name_deny_list() {
        assert_eq!(unit_name("module-info.unit"), None);
        assert_eq!(unit_name("app/package-info.unit"), None);
        assert_eq!(unit_name("app/LaunchStub.unit"), None);
        assert_eq!(unit_name("app/LaunchStubs.unit"), Some("app.LaunchStubs".into()));
    }

    #[test]
    fn test_collect_directory_recursively() {
        let temp = TempDir::new().expect("create temp dir");
        write(temp.path(), "app/Main.unit", "main");
        write(temp.path(), "app/world/Tile.unit", "tile");
        write(temp.path(), "app/package-info.unit", "ignored");
        write(temp.path(), "app/notes.md", "ignored");

        let units = ArtifactCollector::new([temp.path()])
            .collect()
            .expect("collect units");

        assert_eq!(units.len(), 2);
        assert_eq!(units.get("app.Main").map(Vec::as_slice), Some(&b"main"[..]));
        assert_eq!(units.get("app.world.Tile").map(Vec::as_slice), Some(&b"tile"[..]));
    }

    #[test]
    fn test_collect_archive() {
        let temp = TempDir::new().expect("create temp dir");
        let archive = temp.path().join("mods.zip");
        write_zip(
            &archive,
            &[
                ("mod/Plugin.unit", "plugin"),
                ("mod/module-info.unit", "ignored"),
                ("mod/assets/icon.png", "png"),
            ],
        );

        let units = ArtifactCollector::new([&archive])
            .collect()
            .expect("collect units");

        assert_eq!(units.len(), 1);
        assert!(units.contains_key("mod.Plugin"));
    }

    #[test]
    fn test_first_source_wins_on_duplicates() {
        let first = TempDir::new().expect("create temp dir");
        let second = TempDir::new().expect("create temp dir");
        write(first.path(), "app/Main.unit", "first");
        write(second.path(), "app/Main.unit", "second");
        write(second.path(), "app/Extra.unit", "extra");

        let units = ArtifactCollector::new([first.path(), second.path()])
            .collect()
            .expect("collect units");

        assert_eq!(units.get("app.Main").map(Vec::as_slice), Some(&b"first"[..]));
        let names: Vec<_> = units.keys().cloned().collect();
        assert_eq!(names, vec!["app.Main", "app.Extra"]);
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let temp = TempDir::new().expect("create temp dir");
        write(temp.path(), "app/Main.unit", "main");
        let missing = temp.path().join("does-not-exist");

        let result = ArtifactCollector::new([temp.path().to_path_buf(), missing]).collect();

        match result {
            Err(LoadstoneError::SourceUnreadable { path, .. }) => {
                assert!(path.contains("does-not-exist"));
            }
            other => panic!("Expected SourceUnreadable, got {other:?}"),
        }
    }

    #[test]
    fn test_non_archive_file_is_fatal() {
        let temp = TempDir::new().expect("create temp dir");
        let bogus = temp.path().join("bogus.zip");
        std::fs::write(&bogus, "not a zip").expect("write file");

        let result = ArtifactCollector::new([&bogus]).collect();
        assert!(matches!(
            result,
            Err(LoadstoneError::SourceUnreadable { .. })
        ));
    }
}

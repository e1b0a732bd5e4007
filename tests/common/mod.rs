//! Common test utilities for loadstone integration tests

use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Descriptor of an entry point unit named `name`
#[allow(dead_code)]
pub fn entry_unit_json(name: &str) -> String {
    format!(
        r#"{{
    "name": "{name}",
    "visibility": "public",
    "markers": [{{"kind": "entry_point"}}],
    "methods": [{{
        "name": "main",
        "static": true,
        "params": ["loadstone.Launcher", "string[]"],
        "returns": "void"
    }}]
}}"#
    )
}

/// Descriptor of a plain unit, optionally extending `supertype`
#[allow(dead_code)]
pub fn plain_unit_json(name: &str, supertype: Option<&str>) -> String {
    match supertype {
        Some(supertype) => format!(r#"{{"name": "{name}", "super": "{supertype}"}}"#),
        None => format!(r#"{{"name": "{name}"}}"#),
    }
}

/// A test workspace for integration tests
#[allow(dead_code)]
pub struct TestWorkspace {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestWorkspace {
    /// Create a new test workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Absolute path of `relative` inside the workspace
    pub fn path_of(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    /// Write unit `name` below directory source `source`
    ///
    /// `app.world.Tile` lands at `<source>/app/world/Tile.unit`.
    pub fn write_unit(&self, source: &str, name: &str, descriptor: &str) -> PathBuf {
        let relative = format!("{source}/{}.unit", name.replace('.', "/"));
        self.write_file(&relative, descriptor)
    }

    /// Write a zip archive holding `(entry path, content)` pairs
    pub fn write_archive(&self, path: &str, entries: &[(&str, &str)]) -> PathBuf {
        let archive_path = self.path.join(path);
        if let Some(parent) = archive_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }

        let file = std::fs::File::create(&archive_path).expect("Failed to create archive");
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in entries {
            zip.start_file(*name, options).expect("Failed to start entry");
            zip.write_all(content.as_bytes()).expect("Failed to write entry");
        }
        zip.finish().expect("Failed to finish archive");
        archive_path
    }

    /// Read a file from workspace
    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// The real binary, running inside this workspace
    // Temporary fix for deprecated cargo_bin - will be updated when build-dir issues are resolved
    #[allow(deprecated)]
    pub fn loadstone_cmd(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("loadstone").expect("Failed to find binary");
        cmd.current_dir(&self.path)
            .env_remove("LOADSTONE_CONFIG")
            .env_remove("LOADSTONE_DEV")
            .env_remove("LOADSTONE_DUMP_DIR")
            .env_remove("RUST_LOG");
        cmd
    }
}

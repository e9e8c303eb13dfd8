//! Shared testing utilities for vmtemplate CLI tests.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Configuration with a single small machine that passes validation.
#[allow(dead_code)]
pub const SINGLE_VM: &str = r#"
[[machines]]
name = "vm1"
size = "Standard_B2s"

[[machines.nics]]
name = "nic1"
public_ip = true
"#;

/// Two machines sharing one premium data disk.
#[allow(dead_code)]
pub const SHARED_PAIR: &str = r#"
[[machines]]
name = "db1"
size = "Standard_D4s_v5"

[[machines.nics]]
name = "nic1"

[[machines.data_disks]]
size_gb = 256
sku = "Premium_LRS"
shared = true
shared_disk_id = "sd-1"

[[machines]]
name = "db2"
size = "Standard_D4s_v5"

[[machines.nics]]
name = "nic1"

[[machines.data_disks]]
size_gb = 256
sku = "Premium_LRS"
shared = true
shared_disk_id = "sd-1"
"#;

/// Testing harness providing an isolated environment for CLI exercises.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
    work_dir: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    /// Create a new isolated environment.
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        let work_dir = root.path().join("work");
        fs::create_dir_all(&work_dir).expect("Failed to create test work directory");
        Self { root, work_dir }
    }

    /// Path to the directory used for CLI invocations.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Build a command for invoking the compiled `vmtemplate` binary within the work directory.
    pub fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("vmtemplate").expect("Failed to locate vmtemplate binary");
        cmd.current_dir(&self.work_dir).env_remove("RUST_LOG");
        cmd
    }

    /// Write a file relative to the work directory and return its path.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.work_dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write test file");
        path
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.work_dir.join(name)).expect("Failed to read test file")
    }

    pub fn read_json(&self, name: &str) -> serde_json::Value {
        serde_json::from_str(&self.read(name)).expect("File is not valid JSON")
    }

    /// Copy the bundled catalogs into `dir` so tests can edit them.
    pub fn copy_catalogs(&self, dir: &str) -> PathBuf {
        let target = self.work_dir.join(dir);
        fs::create_dir_all(&target).expect("Failed to create catalog directory");
        let source = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/assets/catalog");
        for name in ["images.json", "sizes.json"] {
            fs::copy(source.join(name), target.join(name)).expect("Failed to copy catalog");
        }
        target
    }
}

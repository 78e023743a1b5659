//! Common test utilities and fixtures
//!
//! Every test gets its own data, config and home directories so runs never
//! touch the developer's real persona collection.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Isolated environment for running the persona-notes binary
pub struct TestEnv {
    root: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("home")).unwrap();
        fs::create_dir_all(root.path().join("work")).unwrap();
        Self { root }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.path().join("data")
    }

    pub fn work_dir(&self) -> PathBuf {
        self.root.path().join("work")
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    /// Write a file under the environment root and return its path
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).unwrap();
        path
    }

    /// Command with zero generation latency and isolated directories
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("persona-notes").unwrap();
        cmd.current_dir(self.work_dir())
            .env("HOME", self.path("home"))
            .env("XDG_CONFIG_HOME", self.path("home").join(".config"))
            .env("PNOTES_DATA_DIR", self.data_dir())
            .env("PNOTES_LATENCY_MS", "0")
            .env_remove("PNOTES_CONFIG")
            .env_remove("PNOTES_LOG_LEVEL")
            .env_remove("PNOTES_LOG_FILE")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Create a persona through the CLI and return its id
    pub fn create_persona(&self) -> String {
        let output = self
            .cmd()
            .args([
                "persona",
                "create",
                "--target-audience",
                "下班后自学提升",
                "--audience-category",
                "初入职场毕业生",
            ])
            .output()
            .unwrap();
        assert!(output.status.success(), "persona create failed: {:?}", output);

        let stdout = String::from_utf8(output.stdout).unwrap();
        stdout
            .split_whitespace()
            .nth(2)
            .expect("persona id in create output")
            .to_string()
    }

    pub fn personas_file(&self) -> PathBuf {
        self.data_dir().join("personas.json")
    }
}

/// Read a JSON file into a value
pub fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

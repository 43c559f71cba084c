//! [`TestHome`]: a throwaway home directory for settings scenarios.

use mima_context::settings::{SETTINGS_FILE, USER_DIR};
use mima_context::{ContextAssembler, SettingsDecrypter, SystemProperties};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// A temporary directory standing in for the user's home.
///
/// # Example
///
/// ```rust,no_run
/// use mima_test_utils::TestHome;
///
/// let home = TestHome::new();
/// home.write_settings("offline = true\n");
/// let assembler = home.assembler();
/// ```
pub struct TestHome {
    temp_dir: TempDir,
}

impl Default for TestHome {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHome {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// `<home>/.mima/settings.toml`
    pub fn settings_path(&self) -> PathBuf {
        self.root().join(USER_DIR).join(SETTINGS_FILE)
    }

    /// Write the conventional settings file and return its path
    pub fn write_settings(&self, content: &str) -> PathBuf {
        let path = self.settings_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    /// Write an arbitrary file relative to the home root
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// System properties pointing `user.home` at this directory
    pub fn system_properties(&self) -> SystemProperties {
        SystemProperties::from_pairs([
            ("user.home", self.root().display().to_string()),
            ("os.name", "linux".to_string()),
            ("os.arch", "x86_64".to_string()),
        ])
    }

    /// An assembler rooted here, using [`crate::FakeDecrypter::default`]
    pub fn assembler(&self) -> ContextAssembler {
        self.assembler_with(Arc::new(crate::FakeDecrypter::default()))
    }

    pub fn assembler_with(&self, decrypter: Arc<dyn SettingsDecrypter>) -> ContextAssembler {
        ContextAssembler::new(self.system_properties(), decrypter).with_home_dir(self.root())
    }
}

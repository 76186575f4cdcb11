//! Backend operations
//!
//! The dispatcher only knows the two traits defined here. [`Cider`] is the
//! real implementation, driving Homebrew and `defaults` and keeping the
//! declared state in JSON files.

pub mod cider;
pub mod defaults;
pub mod homebrew;
pub mod store;
pub mod symlinks;

pub use cider::Cider;

use crate::error::Result;

/// Package operations backed by Homebrew
pub trait PackageManager {
    /// Install formulas (or casks) and record them
    fn install(
        &mut self,
        names: &[String],
        cask: bool,
        force: bool,
        debug: bool,
        verbose: bool,
    ) -> Result<()>;

    /// Uninstall formulas (or casks) and forget them
    fn remove(&mut self, names: &[String], cask: bool, debug: bool, verbose: bool) -> Result<()>;

    /// Recorded formulas (or casks), optionally filtered by substring
    fn list(&mut self, filter: Option<&str>, cask: bool) -> Result<Vec<String>>;

    /// Installed formulas (or casks) that are not recorded
    fn list_missing(&mut self, cask: bool, debug: bool) -> Result<Vec<String>>;

    /// Register a tap. Without a name, returns the recorded taps instead.
    fn tap(&mut self, name: Option<&str>, debug: bool, verbose: bool) -> Result<Vec<String>>;

    fn untap(&mut self, name: &str, debug: bool, verbose: bool) -> Result<()>;

    /// Recreate the declared symlinks
    fn relink(&mut self, debug: bool, force: bool) -> Result<()>;
}

/// Declarative macOS preferences
pub trait PreferenceStore {
    fn set_default(
        &mut self,
        domain: &str,
        key: &str,
        value: &str,
        force: bool,
        debug: bool,
    ) -> Result<()>;

    /// Remove one key, or the whole domain when `key` is `None`
    fn remove_default(&mut self, domain: &str, key: Option<&str>, debug: bool) -> Result<()>;

    fn apply_defaults(&mut self) -> Result<()>;

    fn set_icon(&mut self, app: &str, icon: &str) -> Result<()>;

    fn remove_icon(&mut self, app: &str) -> Result<()>;

    fn apply_icons(&mut self) -> Result<()>;

    fn run_scripts(&mut self, debug: bool) -> Result<()>;

    /// Bring the machine in line with everything recorded
    fn restore(&mut self, debug: bool) -> Result<()>;
}

/// Everything the dispatcher can call
pub trait Backend: PackageManager + PreferenceStore {}

impl<T: PackageManager + PreferenceStore> Backend for T {}

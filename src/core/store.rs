//! Persisted state in the cider directory
//!
//! Three JSON documents record what the machine should look like:
//! `bootstrap.json` (packages, taps, scripts, symlinks), `defaults.json`
//! (preferences per domain) and `icons.json` (custom application icons).

use crate::{
    config::Config,
    error::Result,
    utils::fs::{read_json, write_json},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Contents of `bootstrap.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bootstrap {
    #[serde(default)]
    pub formulas: Vec<String>,
    #[serde(default)]
    pub casks: Vec<String>,
    #[serde(default)]
    pub taps: Vec<String>,
    /// Shell commands run by `run-scripts`
    #[serde(default, rename = "after-scripts")]
    pub after_scripts: Vec<String>,
    /// Glob under `symlinks/` mapped to a target directory
    #[serde(default)]
    pub symlinks: BTreeMap<String, String>,
}

impl Bootstrap {
    #[must_use]
    pub fn packages(&self, cask: bool) -> &[String] {
        if cask { &self.casks } else { &self.formulas }
    }

    /// Record packages, keeping the list sorted and unique
    pub fn add_packages(&mut self, names: &[String], cask: bool) {
        let list = self.packages_mut(cask);
        list.extend(names.iter().cloned());
        sort_unique(list);
    }

    pub fn remove_packages(&mut self, names: &[String], cask: bool) {
        self.packages_mut(cask).retain(|name| !names.contains(name));
    }

    pub fn add_tap(&mut self, tap: &str) {
        self.taps.push(tap.to_string());
        sort_unique(&mut self.taps);
    }

    pub fn remove_tap(&mut self, tap: &str) {
        self.taps.retain(|name| name != tap);
    }

    fn packages_mut(&mut self, cask: bool) -> &mut Vec<String> {
        if cask { &mut self.casks } else { &mut self.formulas }
    }
}

fn sort_unique(list: &mut Vec<String>) {
    list.sort();
    list.dedup();
}

/// Contents of `defaults.json`: domain -> key -> value
pub type Defaults = BTreeMap<String, BTreeMap<String, Value>>;

/// Contents of `icons.json`: application -> icon file
pub type Icons = BTreeMap<String, String>;

/// Typed access to the JSON documents of one cider directory
#[derive(Debug, Clone)]
pub struct Store {
    bootstrap: PathBuf,
    defaults: PathBuf,
    icons: PathBuf,
}

impl Store {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            bootstrap: config.bootstrap_file(),
            defaults: config.defaults_file(),
            icons: config.icons_file(),
        }
    }

    pub fn bootstrap(&self) -> Result<Bootstrap> {
        read_json(&self.bootstrap)
    }

    pub fn defaults(&self) -> Result<Defaults> {
        read_json(&self.defaults)
    }

    pub fn icons(&self) -> Result<Icons> {
        read_json(&self.icons)
    }

    /// Load, modify and save `bootstrap.json`
    pub fn update_bootstrap(&self, f: impl FnOnce(&mut Bootstrap)) -> Result<()> {
        update(&self.bootstrap, f)
    }

    pub fn update_defaults(&self, f: impl FnOnce(&mut Defaults)) -> Result<()> {
        update(&self.defaults, f)
    }

    pub fn update_icons(&self, f: impl FnOnce(&mut Icons)) -> Result<()> {
        update(&self.icons, f)
    }
}

fn update<T>(path: &Path, f: impl FnOnce(&mut T)) -> Result<()>
where
    T: Serialize + serde::de::DeserializeOwned + Default,
{
    let mut document = read_json(path)?;
    f(&mut document);
    write_json(path, &document)
}

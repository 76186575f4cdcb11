//! The real backend: Homebrew, `defaults`, `fileicon` and the JSON records

use crate::{
    config::Config,
    core::{
        PackageManager, PreferenceStore, defaults,
        homebrew::{self, Brew, BrewOptions},
        store::Store,
        symlinks,
    },
    error::Result,
    utils::{
        fs::{LinkOutcome, expand_home, symlink},
        process::ProcessRunner,
    },
};
use tracing::{info, instrument, warn};

/// Backend that changes the machine and records what it did
#[derive(Debug)]
pub struct Cider {
    config: Config,
    runner: ProcessRunner,
    store: Store,
    brew: Brew,
    prerequisites_checked: bool,
}

impl Cider {
    /// Create a new backend with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            runner: ProcessRunner::new(config.debug),
            store: Store::new(&config),
            brew: Brew::new(&config)?,
            prerequisites_checked: false,
            config,
        })
    }

    fn ensure_prerequisites(&mut self) -> Result<()> {
        if !self.prerequisites_checked {
            homebrew::ensure_prerequisites(&self.config, &self.runner)?;
            self.prerequisites_checked = true;
        }
        Ok(())
    }

    fn write_default(&self, domain: &str, key: &str, value: &serde_json::Value) -> Result<()> {
        let mut argv = vec![
            self.config.programs.defaults.clone(),
            "write".to_string(),
            domain.to_string(),
            key.to_string(),
        ];
        argv.extend(defaults::write_args(value));
        self.runner.run(&argv)
    }

    fn set_file_icon(&self, app: &str, icon: &str) -> Result<()> {
        self.runner.run(&[
            self.config.programs.fileicon.clone(),
            "set".to_string(),
            app.to_string(),
            expand_home(icon).to_string_lossy().into_owned(),
        ])
    }
}

impl PackageManager for Cider {
    #[instrument(skip_all, fields(count = names.len(), cask = cask, force = force))]
    fn install(
        &mut self,
        names: &[String],
        cask: bool,
        force: bool,
        debug: bool,
        verbose: bool,
    ) -> Result<()> {
        self.ensure_prerequisites()?;
        let options = BrewOptions {
            cask,
            force,
            debug,
            verbose,
        };
        self.runner.run(&self.brew.install(names, options))?;
        self.store.update_bootstrap(|b| b.add_packages(names, cask))
    }

    #[instrument(skip_all, fields(count = names.len(), cask = cask))]
    fn remove(&mut self, names: &[String], cask: bool, debug: bool, verbose: bool) -> Result<()> {
        self.ensure_prerequisites()?;
        let options = BrewOptions {
            cask,
            debug,
            verbose,
            ..BrewOptions::default()
        };
        self.runner.run(&self.brew.uninstall(names, options))?;
        self.store.update_bootstrap(|b| b.remove_packages(names, cask))
    }

    fn list(&mut self, filter: Option<&str>, cask: bool) -> Result<Vec<String>> {
        let bootstrap = self.store.bootstrap()?;
        Ok(bootstrap
            .packages(cask)
            .iter()
            .filter(|name| filter.is_none_or(|f| name.contains(f)))
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    fn list_missing(&mut self, cask: bool, _debug: bool) -> Result<Vec<String>> {
        self.ensure_prerequisites()?;
        let bootstrap = self.store.bootstrap()?;
        let installed = homebrew::parse_names(&self.runner.output(&self.brew.installed(cask))?);

        let mut missing: Vec<String> = installed
            .into_iter()
            .filter(|name| !bootstrap.packages(cask).contains(name))
            .collect();
        missing.sort();
        Ok(missing)
    }

    #[instrument(skip_all, fields(name = name))]
    fn tap(&mut self, name: Option<&str>, debug: bool, verbose: bool) -> Result<Vec<String>> {
        let Some(name) = name else {
            return Ok(self.store.bootstrap()?.taps);
        };

        self.brew.validate_tap(name)?;
        self.ensure_prerequisites()?;
        let options = BrewOptions {
            debug,
            verbose,
            ..BrewOptions::default()
        };
        self.runner.run(&self.brew.tap(name, options))?;
        self.store.update_bootstrap(|b| b.add_tap(name))?;
        Ok(Vec::new())
    }

    #[instrument(skip_all, fields(name = name))]
    fn untap(&mut self, name: &str, debug: bool, verbose: bool) -> Result<()> {
        self.ensure_prerequisites()?;
        let options = BrewOptions {
            debug,
            verbose,
            ..BrewOptions::default()
        };
        self.runner.run(&self.brew.untap(name, options))?;
        self.store.update_bootstrap(|b| b.remove_tap(name))
    }

    #[instrument(skip(self))]
    fn relink(&mut self, _debug: bool, force: bool) -> Result<()> {
        let bootstrap = self.store.bootstrap()?;
        let links = symlinks::plan(&self.config.symlinks_dir(), &bootstrap.symlinks)?;

        for link in links {
            match symlink(&link.source, &link.target, force)? {
                LinkOutcome::Skipped => warn!(
                    "{} already exists, use --force to replace it",
                    link.target.display()
                ),
                outcome => info!("{:?} {}", outcome, link.target.display()),
            }
        }
        Ok(())
    }
}

impl PreferenceStore for Cider {
    #[instrument(skip(self))]
    fn set_default(
        &mut self,
        domain: &str,
        key: &str,
        value: &str,
        force: bool,
        _debug: bool,
    ) -> Result<()> {
        let value = defaults::parse_value(value);
        let recorded = self.store.defaults()?;
        let unchanged = recorded
            .get(domain)
            .and_then(|keys| keys.get(key))
            .is_some_and(|current| *current == value);
        if unchanged && !force {
            info!("{} {} is already {}", domain, key, value);
            return Ok(());
        }

        self.write_default(domain, key, &value)?;
        self.store.update_defaults(|d| {
            d.entry(domain.to_string())
                .or_default()
                .insert(key.to_string(), value);
        })
    }

    #[instrument(skip(self))]
    fn remove_default(&mut self, domain: &str, key: Option<&str>, _debug: bool) -> Result<()> {
        let mut argv = vec![
            self.config.programs.defaults.clone(),
            "delete".to_string(),
            domain.to_string(),
        ];
        argv.extend(key.map(String::from));
        self.runner.run(&argv)?;

        self.store.update_defaults(|d| match key {
            Some(key) => {
                if let Some(keys) = d.get_mut(domain) {
                    keys.remove(key);
                    if keys.is_empty() {
                        d.remove(domain);
                    }
                }
            }
            None => {
                d.remove(domain);
            }
        })
    }

    #[instrument(skip(self))]
    fn apply_defaults(&mut self) -> Result<()> {
        for (domain, keys) in &self.store.defaults()? {
            for (key, value) in keys {
                self.write_default(domain, key, value)?;
            }
        }
        Ok(())
    }

    #[instrument(skip(self))]
    fn set_icon(&mut self, app: &str, icon: &str) -> Result<()> {
        self.set_file_icon(app, icon)?;
        self.store.update_icons(|icons| {
            icons.insert(app.to_string(), icon.to_string());
        })
    }

    #[instrument(skip(self))]
    fn remove_icon(&mut self, app: &str) -> Result<()> {
        self.runner.run(&[
            self.config.programs.fileicon.clone(),
            "rm".to_string(),
            app.to_string(),
        ])?;
        self.store.update_icons(|icons| {
            icons.remove(app);
        })
    }

    #[instrument(skip(self))]
    fn apply_icons(&mut self) -> Result<()> {
        for (app, icon) in &self.store.icons()? {
            self.set_file_icon(app, icon)?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    fn run_scripts(&mut self, _debug: bool) -> Result<()> {
        let bootstrap = self.store.bootstrap()?;
        for script in &bootstrap.after_scripts {
            let argv = [
                self.config.programs.shell.clone(),
                "-c".to_string(),
                script.clone(),
            ];
            self.runner.run_in(&argv, Some(&self.config.cider_dir))?;
        }
        Ok(())
    }

    #[instrument(skip_all)]
    fn restore(&mut self, debug: bool) -> Result<()> {
        let bootstrap = self.store.bootstrap()?;
        info!(
            "Restoring {} tap(s), {} formula(s), {} cask(s)",
            bootstrap.taps.len(),
            bootstrap.formulas.len(),
            bootstrap.casks.len()
        );

        for tap in &bootstrap.taps {
            self.tap(Some(tap.as_str()), debug, false)?;
        }
        if !bootstrap.formulas.is_empty() {
            self.install(&bootstrap.formulas, false, false, debug, false)?;
        }
        if !bootstrap.casks.is_empty() {
            self.install(&bootstrap.casks, true, false, debug, false)?;
        }

        self.relink(debug, false)?;
        self.apply_defaults()?;
        self.apply_icons()?;
        self.run_scripts(debug)
    }
}

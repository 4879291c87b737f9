use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::sync::Mutex;

use blanket::blanket;
use directories::BaseDirs;
use once_cell::sync::OnceCell;
use which::{which, which_in};

use crate::config::{Config, ProjectConfig};
use crate::utils::{ensure_dir_exists, path_must_str};
use crate::Error;

/// Root of the project directory holding `appops.toml` and `appops_out/`
pub const PROJECT_HOME_ENV: &str = "APPOPS_PROJECT_HOME";

/// Overrides `PATH` when looking up external binaries such as `adb`
pub const SEARCH_PATH_ENV: &str = "APPOPS_PATH";

pub const PROJECT_CONFIG_FILE: &str = "appops.toml";

pub const OUTPUT_DIR: &str = "appops_out";

fn find_program(bin: &str) -> Option<String> {
    let found = match env::var(SEARCH_PATH_ENV) {
        Ok(search_path) => {
            let cwd = env::current_dir().ok()?;
            which_in(bin, Some(&search_path), &cwd)
        }
        Err(_) => which(bin),
    };
    found.ok().map(|it| it.to_string_lossy().into_owned())
}

/// Everything that depends on the environment the tool runs in: env vars,
/// external binaries, the project directory and its config.
///
/// Only [Context::get_project_config] needs an implementation.
#[blanket(derive(Ref, Box))]
pub trait Context: Send + Sync {
    fn maybe_get_env(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }

    fn maybe_get_bin(&self, bin: &str) -> Option<String> {
        find_program(bin)
    }

    fn get_bin(&self, bin: &str) -> crate::Result<String> {
        self.maybe_get_bin(bin)
            .ok_or_else(|| Error::MissingBin(bin.into()))
    }

    fn get_env(&self, key: &str) -> crate::Result<String> {
        self.maybe_get_env(key)
            .ok_or_else(|| Error::MissingEnv(key.into()))
    }

    fn get_project_dir(&self) -> crate::Result<PathBuf> {
        let home = PathBuf::from(self.get_env(PROJECT_HOME_ENV)?);
        if !home.is_dir() {
            return Err(Error::Generic(format!(
                "{} is {}, which is not a directory",
                PROJECT_HOME_ENV,
                path_must_str(&home)
            )));
        }
        Ok(home)
    }

    fn get_project_config_file(&self) -> crate::Result<PathBuf> {
        self.get_project_dir_child(PROJECT_CONFIG_FILE)
    }

    /// The project's `appops.toml`, or the defaults if there is none
    fn get_project_config<'a>(&'a self) -> crate::Result<&'a ProjectConfig>;

    fn get_project_dir_child(&self, child: &str) -> crate::Result<PathBuf> {
        Ok(self.get_project_dir()?.join(child))
    }

    fn get_output_dir(&self) -> crate::Result<PathBuf> {
        self.get_project_dir_child(OUTPUT_DIR)
    }

    fn get_output_dir_child(&self, child: &str) -> crate::Result<PathBuf> {
        Ok(self.get_output_dir()?.join(child))
    }

    /// Per user `appops` config directory, created if needed
    fn get_user_config_dir(&self) -> crate::Result<PathBuf> {
        let dirs = BaseDirs::new().ok_or(Error::NoBaseDirs)?;
        let dir = dirs.config_dir().join("appops");
        ensure_dir_exists(&dir)?;
        Ok(dir)
    }
}

/// [Context] backed by the process environment. Binary lookups and the
/// project config are cached after the first use.
#[derive(Default)]
pub struct DefaultContext {
    bin_cache: Mutex<HashMap<String, String>>,
    project_config: OnceCell<ProjectConfig>,
}

impl DefaultContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn load_project_config(&self) -> crate::Result<ProjectConfig> {
        let path = match self.get_project_config_file() {
            Ok(v) => v,
            // No project home means nothing to configure
            Err(Error::MissingEnv(_)) => return Ok(ProjectConfig::default()),
            Err(e) => return Err(e),
        };
        if !path.exists() {
            log::debug!("no project config at {:?}, using defaults", path);
            return Ok(ProjectConfig::default());
        }
        let cfg = Config::parse(&path)?;
        ProjectConfig::try_from(&cfg)
    }
}

impl Context for DefaultContext {
    fn get_project_config<'a>(&'a self) -> crate::Result<&'a ProjectConfig> {
        self.project_config
            .get_or_try_init(|| self.load_project_config())
    }

    fn maybe_get_bin(&self, bin: &str) -> Option<String> {
        let mut cache = self.bin_cache.lock().expect("failed to lock");
        if let Some(path) = cache.get(bin) {
            return Some(path.clone());
        }
        let found = find_program(bin)?;
        cache.insert(bin.into(), found.clone());
        Some(found)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::{tmp_context, TestContext};
    use rstest::*;

    #[rstest]
    fn test_context_dirs(tmp_context: TestContext) {
        let home = tmp_context.get_project_dir().unwrap();
        assert_eq!(
            tmp_context.get_project_config_file().unwrap(),
            home.join("appops.toml")
        );
        assert_eq!(
            tmp_context.get_output_dir_child("log").unwrap(),
            home.join("appops_out").join("log")
        );
    }

    #[rstest]
    fn test_missing_env(tmp_context: TestContext) {
        assert!(matches!(
            tmp_context.get_env("APPOPS_NOT_SET"),
            Err(Error::MissingEnv(_))
        ));
        assert!(matches!(
            tmp_context.get_bin("definitely-not-adb"),
            Err(Error::MissingBin(_))
        ));
    }
}

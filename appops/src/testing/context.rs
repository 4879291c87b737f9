use std::collections::HashMap;
use std::path::PathBuf;
use std::{env, fs};

use anyhow::Context as AnyhowContext;
use mockall::mock;
use rand::Rng;
use rstest::fixture;

use crate::config::ProjectConfig;
use crate::utils::path_must_str;
use crate::Context;

#[fixture]
pub fn tmp_context() -> TestContext {
    TestContext::new()
}

#[fixture]
pub fn mock_context() -> MockContext {
    MockContext::new()
}

/// Shared by tests that only read from the temp directory
#[fixture]
#[once]
pub fn global_tmp_context() -> TestContext {
    TestContext::new()
}

/// A [Context] rooted in a fresh temp directory that is removed on drop.
///
/// `APPOPS_PROJECT_HOME` points at `<base>/project_home` and
/// `ANDROID_SERIAL` is `TESTSERIAL`.
pub struct TestContext {
    base_dir: PathBuf,
    env: HashMap<String, String>,
    bins: HashMap<String, String>,
    project_config: ProjectConfig,
}

fn random_name() -> u64 {
    rand::thread_rng().gen()
}

impl TestContext {
    pub fn new() -> Self {
        let base_dir = env::temp_dir().join(format!("appops_test_{}", random_name()));
        let project_home = base_dir.join("project_home");
        fs::create_dir_all(&project_home).expect("failed to create test project home");

        let env = HashMap::from([
            (
                String::from("APPOPS_PROJECT_HOME"),
                String::from(path_must_str(&project_home)),
            ),
            (String::from("ANDROID_SERIAL"), String::from("TESTSERIAL")),
        ]);

        Self {
            base_dir,
            env,
            bins: HashMap::new(),
            project_config: ProjectConfig::default(),
        }
    }

    pub fn with_bin(mut self, name: &str, path: &str) -> Self {
        self.bins.insert(name.into(), path.into());
        self
    }

    pub fn with_project_config(mut self, cfg: ProjectConfig) -> Self {
        self.project_config = cfg;
        self
    }

    /// A random path under the base directory, nothing is created
    pub fn get_temp_path(&self, ext: Option<&str>) -> PathBuf {
        let name = random_name().to_string();
        match ext {
            Some(ext) => self.base_dir.join(name).with_extension(ext),
            None => self.base_dir.join(name),
        }
    }

    pub fn new_tmp_file(&self, content: &str) -> anyhow::Result<PathBuf> {
        let path = self.get_temp_path(Some("txt"));
        fs::write(&path, content)
            .with_context(|| format!("writing temp file {}", path_must_str(&path)))?;
        Ok(path)
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if self.base_dir.exists() {
            let _ = fs::remove_dir_all(&self.base_dir);
        }
    }
}

impl Context for TestContext {
    fn maybe_get_env(&self, key: &str) -> Option<String> {
        self.env.get(key).cloned()
    }

    fn maybe_get_bin(&self, bin: &str) -> Option<String> {
        self.bins.get(bin).cloned()
    }

    fn get_user_config_dir(&self) -> crate::Result<PathBuf> {
        Ok(self.base_dir.join("config"))
    }

    fn get_project_config<'a>(&'a self) -> crate::Result<&'a ProjectConfig> {
        Ok(&self.project_config)
    }
}

mock! {
    pub Context {}

    impl crate::Context for Context {
        fn maybe_get_env(&self, key: &str) -> Option<String>;
        fn maybe_get_bin(&self, bin: &str) -> Option<String>;
        fn get_project_dir(&self) -> crate::Result<PathBuf>;
        fn get_project_config<'a>(&'a self) -> crate::Result<&'a ProjectConfig>;
    }
}

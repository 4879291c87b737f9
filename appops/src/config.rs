use std::borrow::Cow;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::utils::{path_must_str, project_relative, read_file, PackageAllowlist};
use crate::Context;

#[derive(Debug)]
pub enum Error {
    InvalidType,
    MissingKey,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::InvalidType => "InvalidType",
                Self::MissingKey => "MissingKey",
            }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Packages that render web content for every other app, considered web view
/// providers when the config doesn't say otherwise
pub const DEFAULT_WEB_VIEW_PROVIDERS: &[&str] =
    &["com.google.android.webview", "com.android.webview"];

pub struct ConfigMap<'c> {
    path: &'c Path,
    name: Option<Cow<'c, str>>,
    table: &'c Table,
}

#[derive(Clone)]
pub struct Config {
    path: PathBuf,
    base: Table,
}

impl Config {
    pub fn parse(source: &Path) -> crate::Result<Self> {
        let as_str = read_file(source)?;
        Self::parse_str(source, &as_str)
    }

    pub fn parse_str(source: &Path, content: &str) -> crate::Result<Self> {
        let base: Table = match toml::from_str(content) {
            Ok(v) => v,
            Err(e) => return Err(crate::Error::new_cfg(source, &e)),
        };
        Ok(Self {
            base,
            path: PathBuf::from(source),
        })
    }

    pub fn get_map(&self) -> ConfigMap<'_> {
        ConfigMap {
            name: None,
            path: &self.path,
            table: &self.base,
        }
    }
}

/// How to reach the device when using `adb`
///
/// ```toml
/// [device-access.adb]
/// executable = "/opt/android/platform-tools/adb"
/// serial = "emulator-5554"
/// ```
#[derive(Clone, Debug, Default)]
pub struct AdbConfig {
    executable: Option<String>,
    serial: Option<String>,
}

impl AdbConfig {
    pub fn new(executable: Option<String>, serial: Option<String>) -> Self {
        Self { executable, serial }
    }

    /// The configured `adb` binary, falling back to whatever the context finds
    pub fn get_executable<'a>(&'a self, ctx: &dyn Context) -> crate::Result<Cow<'a, str>> {
        match &self.executable {
            Some(v) => Ok(Cow::Borrowed(v.as_str())),
            None => ctx.get_bin("adb").map(Cow::Owned),
        }
    }

    /// The configured serial, falling back to `ANDROID_SERIAL`
    pub fn get_serial<'a>(&'a self, ctx: &dyn Context) -> Option<Cow<'a, str>> {
        match &self.serial {
            Some(v) => Some(Cow::Borrowed(v.as_str())),
            None => ctx.maybe_get_env("ANDROID_SERIAL").map(Cow::Owned),
        }
    }

    fn from_map(map: &ConfigMap) -> crate::Result<Self> {
        Ok(Self {
            executable: map.maybe_get_str_typecheck("executable")?.map(String::from),
            serial: map.maybe_get_str_typecheck("serial")?.map(String::from),
        })
    }
}

/// Package classification settings
///
/// ```toml
/// [packages]
/// host-package = "com.example.host"
/// whitelist = ["com.android.systemui"]
/// whitelist-file = "whitelist.txt"
/// web-view-providers = ["com.google.android.webview"]
/// ```
#[derive(Clone, Debug)]
pub struct PackagesConfig {
    pub host_package: Option<String>,
    pub whitelist: Vec<String>,
    pub whitelist_file: Option<String>,
    pub web_view_providers: Vec<String>,
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            host_package: None,
            whitelist: Vec::new(),
            whitelist_file: None,
            web_view_providers: DEFAULT_WEB_VIEW_PROVIDERS
                .iter()
                .map(|it| String::from(*it))
                .collect(),
        }
    }
}

impl PackagesConfig {
    fn from_map(map: &ConfigMap) -> crate::Result<Self> {
        let mut cfg = Self::default();
        cfg.host_package = map.maybe_get_str_typecheck("host-package")?.map(String::from);
        if let Some(lst) = map.maybe_get_str_array_typecheck("whitelist")? {
            cfg.whitelist = lst;
        }
        cfg.whitelist_file = map
            .maybe_get_str_typecheck("whitelist-file")?
            .map(String::from);
        if let Some(lst) = map.maybe_get_str_array_typecheck("web-view-providers")? {
            cfg.web_view_providers = lst;
        }
        Ok(cfg)
    }

    /// Builds the whitelist from both the inline list and the whitelist file
    pub fn load_whitelist(&self, ctx: &dyn Context) -> crate::Result<PackageAllowlist> {
        let mut allowlist: PackageAllowlist = self.whitelist.iter().collect();
        if let Some(file) = &self.whitelist_file {
            let path = project_relative(ctx, file)?;
            allowlist.read_list_file(&path).map_err(|e| {
                crate::Error::InvalidConfig(
                    path_must_str(&path).into(),
                    format!("failed to read whitelist file: {e}"),
                )
            })?;
        }
        Ok(allowlist)
    }
}

/// The parsed `appops.toml` project file
#[derive(Clone, Debug)]
pub struct ProjectConfig {
    pub can_adb: bool,
    pub adb: AdbConfig,
    pub packages: PackagesConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            can_adb: true,
            adb: AdbConfig::default(),
            packages: PackagesConfig::default(),
        }
    }
}

impl TryFrom<&Config> for ProjectConfig {
    type Error = crate::Error;

    fn try_from(cfg: &Config) -> crate::Result<Self> {
        let map = cfg.get_map();
        let can_adb = map.get_bool_or("can-adb", true);

        let adb = match map.maybe_get_map_typecheck("device-access")? {
            Some(access) => {
                let adb = access.maybe_get_map_typecheck("adb")?;
                match adb {
                    Some(adb) => AdbConfig::from_map(&adb)?,
                    None => AdbConfig::default(),
                }
            }
            None => AdbConfig::default(),
        };

        let packages = match map.maybe_get_map_typecheck("packages")? {
            Some(pkgs) => PackagesConfig::from_map(&pkgs)?,
            None => PackagesConfig::default(),
        };

        Ok(Self {
            can_adb,
            adb,
            packages,
        })
    }
}

pub fn parse_config<R, F>(file: &Path, f: F) -> crate::Result<R>
where
    F: FnOnce(&ConfigMap) -> crate::Result<R>,
{
    let cfg = Config::parse(file)?;
    f(&cfg.get_map())
}

impl<'c> ConfigMap<'c> {
    fn get_full_path<'a>(&'a self) -> Option<&'a str> {
        self.name.as_ref().map(|it| it.as_ref())
    }

    fn key_path<'a>(&self, key: &'a str) -> Cow<'a, str> {
        match self.get_full_path() {
            None => Cow::Borrowed(key),
            Some(v) => Cow::Owned(format!("{}.{}", v, key)),
        }
    }

    /// InvalidConfig naming the dotted key path and the expected type
    pub fn invalid_key(&self, key: &str, expected: &str) -> crate::Error {
        let path = self.key_path(key);
        crate::Error::InvalidConfig(
            path_must_str(self.path).into(),
            format!(
                "invalid value for key: {} (expected type: {})",
                path, expected
            ),
        )
    }

    fn get(&self, key: &str) -> Option<&'c Value> {
        self.table.get(key)
    }

    pub fn get_int(&self, key: &str) -> Result<i64> {
        self.get(key)
            .ok_or(Error::MissingKey)?
            .as_integer()
            .ok_or(Error::InvalidType)
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.get(key)
            .ok_or(Error::MissingKey)?
            .as_bool()
            .ok_or(Error::InvalidType)
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get(key)
            .map(|it| it.as_bool().unwrap_or(default))
            .unwrap_or(default)
    }

    pub fn get_str(&self, key: &str) -> Result<&'c str> {
        self.maybe_get_str(key)?.ok_or(Error::MissingKey)
    }

    pub fn maybe_get_str(&self, key: &str) -> Result<Option<&'c str>> {
        match self.get(key) {
            Some(v) => match v.as_str() {
                Some(v) => Ok(Some(v)),
                None => Err(Error::InvalidType),
            },
            None => Ok(None),
        }
    }

    pub fn maybe_get_str_typecheck(&self, key: &str) -> crate::Result<Option<&'c str>> {
        self.maybe_get_str(key)
            .map_err(|_| self.invalid_key(key, "string"))
    }

    /// Get an array where every element must be a string
    pub fn maybe_get_str_array(&self, key: &str) -> Result<Option<Vec<String>>> {
        let arr = match self.get(key) {
            Some(v) => v.as_array().ok_or(Error::InvalidType)?,
            None => return Ok(None),
        };
        let mut strs = Vec::with_capacity(arr.len());
        for v in arr {
            strs.push(String::from(v.as_str().ok_or(Error::InvalidType)?));
        }
        Ok(Some(strs))
    }

    pub fn maybe_get_str_array_typecheck(&self, key: &str) -> crate::Result<Option<Vec<String>>> {
        self.maybe_get_str_array(key)
            .map_err(|_| self.invalid_key(key, "array of strings"))
    }

    pub fn maybe_get_map(&'c self, key: &'c str) -> Result<Option<ConfigMap<'c>>> {
        match self.get(key) {
            Some(v) => match v.as_table() {
                Some(table) => {
                    let name = match &self.get_full_path() {
                        Some(parents) => Cow::Owned(format!("{parents}.{key}")),
                        None => Cow::Borrowed(key),
                    };
                    Ok(Some(Self {
                        name: Some(name),
                        path: self.path,
                        table,
                    }))
                }
                None => Err(Error::InvalidType),
            },
            None => Ok(None),
        }
    }

    pub fn get_map(&'c self, key: &'c str) -> Result<ConfigMap<'c>> {
        self.maybe_get_map(key)?.ok_or(Error::MissingKey)
    }

    pub fn maybe_get_map_typecheck(&'c self, key: &'c str) -> crate::Result<Option<ConfigMap<'c>>> {
        self.maybe_get_map(key)
            .map_err(|_| self.invalid_key(key, "table"))
    }
}

#[cfg(test)]
mod test {
    use crate::testing::{global_tmp_context, tmp_context, TestContext};
    use std::fs;

    use super::*;
    use rstest::*;

    #[fixture]
    #[once]
    fn cfg_file(global_tmp_context: &TestContext) -> PathBuf {
        let file = global_tmp_context.get_temp_path(Some("toml"));

        let content = r#"
base = 12

[foo]
bar = "baz"
list = ["a", "b"]
quux = { neato = true }
"#;

        fs::write(&file, content).expect("failed to write test config");
        file
    }

    #[rstest]
    fn test_config(cfg_file: &PathBuf) {
        let f = |cfg: &ConfigMap| -> crate::Result<()> {
            assert_eq!(cfg.get_int("base").expect("getting base"), 12);
            let foo = cfg.get_map("foo").expect("getting foo");
            assert_eq!(foo.get_str("bar").expect("getting bar"), "baz");
            assert!(foo.get_str("ohno").is_err());
            assert_eq!(
                foo.maybe_get_str_array("list").expect("getting list"),
                Some(vec![String::from("a"), String::from("b")])
            );
            assert!(foo.maybe_get_str_array("bar").is_err());
            let quux = foo.get_map("quux").expect("getting foo.quux");
            assert_eq!(quux.get_bool("neato").expect("getting neato"), true);
            assert_eq!(quux.get_bool_or("ohno", false), false);
            assert_eq!(quux.get_bool_or("ohno", true), true);
            Ok(())
        };

        parse_config(cfg_file, f).unwrap();
    }

    #[rstest]
    fn test_project_config() {
        let content = r#"
can-adb = false

[device-access.adb]
serial = "emulator-5554"

[packages]
host-package = "com.example.host"
whitelist = ["com.android.systemui"]
"#;
        let cfg = Config::parse_str(Path::new("/tmp/appops.toml"), content).unwrap();
        let project = ProjectConfig::try_from(&cfg).unwrap();
        assert!(!project.can_adb);
        assert_eq!(project.adb.serial.as_deref(), Some("emulator-5554"));
        assert_eq!(
            project.packages.host_package.as_deref(),
            Some("com.example.host")
        );
        assert_eq!(project.packages.whitelist, vec!["com.android.systemui"]);
        assert_eq!(
            project.packages.web_view_providers,
            DEFAULT_WEB_VIEW_PROVIDERS.to_vec()
        );
    }

    #[rstest]
    fn test_project_config_bad_type() {
        let content = "[packages]\nwhitelist = \"com.android.systemui\"\n";
        let cfg = Config::parse_str(Path::new("/tmp/appops.toml"), content).unwrap();
        match ProjectConfig::try_from(&cfg) {
            Err(crate::Error::InvalidConfig(_, msg)) => {
                assert!(msg.contains("packages.whitelist"), "{msg}")
            }
            other => panic!("expected InvalidConfig, got {:?}", other.map(|_| ())),
        }
    }

    #[rstest]
    fn test_load_whitelist_file(tmp_context: TestContext) {
        let file = tmp_context
            .new_tmp_file("# core\ncom.android.phone\ncom.android.shell\n")
            .unwrap();
        let pkgs = PackagesConfig {
            whitelist: vec![String::from("com.android.systemui")],
            whitelist_file: Some(String::from(path_must_str(&file))),
            ..PackagesConfig::default()
        };
        let wl = pkgs.load_whitelist(&tmp_context).unwrap();
        assert_eq!(wl.len(), 3);
        assert!(wl.allows("com.android.systemui"));
        assert!(wl.allows("com.android.shell"));
    }
}

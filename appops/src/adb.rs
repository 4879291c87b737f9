use std::io;

use lazy_static::lazy_static;
use regex::Regex;

use crate::command::{run_cmd, CmdOutput};
use crate::config::{AdbConfig, ProjectConfig};
use crate::Context;

lazy_static! {
    static ref DEVICE_NOT_FOUND: Regex =
        Regex::new(r"device\s+'([^']+)'\s+not\s+found").expect("valid regex");
}

/// The Adb trait just abstracts the `adb` commands used to talk to the
/// device's package manager and app ops service
pub trait Adb: Send + Sync {
    fn get_connected_devices(&self) -> crate::Result<Vec<String>>;

    /// Essentially the same as running `adb shell '...'`
    fn shell(&self, shell_cmd: &str) -> io::Result<CmdOutput>;

    /// Same as `shell`, but a nonzero exit or an `adb` level failure is an
    /// error
    fn shell_checked(&self, shell_cmd: &str) -> crate::Result<CmdOutput> {
        let output = self.shell(shell_cmd)?;
        if output.ok() {
            return Ok(output);
        }
        let stderr = output.stderr_utf8_lossy();
        if stderr.contains("no devices/emulators") {
            return Err(crate::Error::NoAdbDevice);
        }
        if let Some(caps) = DEVICE_NOT_FOUND.captures(&stderr) {
            let serial = caps
                .get(1)
                .map(|m| String::from(m.as_str()))
                .unwrap_or_else(|| "?".into());
            return Err(crate::Error::AdbDeviceNotFound(serial));
        }
        output.err_on_status()
    }
}

#[derive(Clone)]
/// An `Adb` implementation that just invokes the external `adb` command.
pub struct ExecAdb {
    bin: String,
    serial: Option<String>,
}

impl ExecAdb {
    /// Creates a new `ExecAdb` from the given context.
    ///
    /// This will first check the project config file for the adb settings:
    ///
    /// [device-access.adb]
    /// serial = "..."
    /// executable = "..."
    ///
    /// and use that if found, pulling defaults from the environment otherwise.
    /// If `can-adb = false` is in the config this function will fail. Note
    /// that `can-adb` defaults to true.
    pub fn new(ctx: &dyn Context) -> crate::Result<Self> {
        match ctx.get_project_config() {
            Ok(v) => Self::try_from_project_config(ctx, v),
            Err(e) => {
                log::warn!("failed to load project config, using env for adb: {}", e);
                Self::from_env(ctx)
            }
        }
    }

    pub fn from_env(ctx: &dyn Context) -> crate::Result<Self> {
        let bin = ctx.get_bin("adb")?;
        let serial = ctx.maybe_get_env("ANDROID_SERIAL");

        Ok(Self { bin, serial })
    }

    fn try_from_project_config(ctx: &dyn Context, cfg: &ProjectConfig) -> crate::Result<Self> {
        if !cfg.can_adb {
            return Err(crate::Error::AdbDisabled);
        }
        Self::try_from_adb_config(ctx, &cfg.adb)
    }

    pub fn try_from_adb_config(ctx: &dyn Context, cfg: &AdbConfig) -> crate::Result<Self> {
        let bin = cfg.get_executable(ctx)?.into_owned();
        let serial = cfg.get_serial(ctx).map(|it| it.into_owned());
        Ok(Self { bin, serial })
    }
}

macro_rules! adb_cmd {
    ($adb:ident, $cmd:literal, $($args:expr),*) => {
        if let Some(ref serial) = $adb.serial {
            run_cmd(&$adb.bin, &["-s", serial, $cmd, $($args),*])
        } else {
            run_cmd(&$adb.bin, &[$cmd, $($args),*])
        }
    }
}

impl Adb for ExecAdb {
    /// Returns a list of all connected devices (similar to `adb devices -l`)
    fn get_connected_devices(&self) -> crate::Result<Vec<String>> {
        let output = run_cmd(&self.bin, &["devices", "-l"])?;
        let out_str = output.stdout_utf8_lossy();
        let devices = parse_devices(&out_str);
        if devices.is_empty() {
            return Err(crate::Error::NoAdbDevice);
        }
        Ok(devices)
    }

    fn shell(&self, shell_cmd: &str) -> io::Result<CmdOutput> {
        adb_cmd!(self, "shell", shell_cmd)
    }
}

fn parse_devices(out: &str) -> Vec<String> {
    // The first line is just a header
    out.split('\n')
        .skip(1)
        .filter(|l| !l.is_empty() && l.contains("device"))
        .filter_map(|l| l.split_ascii_whitespace().next())
        .map(String::from)
        .collect()
}

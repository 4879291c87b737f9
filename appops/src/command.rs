use std::borrow::Cow;
use std::ffi::OsStr;
use std::io;
use std::process::{Command, ExitStatus, Output};

use itertools::Itertools;
use log::Level::Debug;
use log::{debug, log_enabled};

/// Captured result of an external command
pub struct CmdOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CmdOutput {
    /// `Ok` only if the command exited successfully, otherwise the exit code
    /// and trimmed stderr are turned into [crate::Error::CommandError]
    pub fn err_on_status(self) -> crate::Result<Self> {
        if self.status.success() {
            return Ok(self);
        }

        // No code when killed by a signal
        let code = self.status.code().unwrap_or(-1);
        let stderr = self.stderr_utf8_lossy().trim().to_string();
        Err(crate::Error::CommandError(code, stderr))
    }

    #[inline]
    pub fn ok(&self) -> bool {
        self.status.success()
    }

    #[inline]
    pub fn stdout_contains(&self, needle: &str) -> bool {
        self.stdout_utf8_lossy().contains(needle)
    }

    #[inline]
    pub fn stdout_utf8_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    #[inline]
    pub fn stderr_utf8_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}

impl From<Output> for CmdOutput {
    fn from(output: Output) -> Self {
        Self {
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

/// Wrap a value in single quotes for the device shell
pub fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r#"'"'"'"#))
}

pub fn run_cmd<C, S>(cmd: C, args: &[S]) -> io::Result<CmdOutput>
where
    C: AsRef<OsStr>,
    S: AsRef<OsStr>,
{
    if log_enabled!(Debug) {
        let line = std::iter::once(cmd.as_ref())
            .chain(args.iter().map(AsRef::as_ref))
            .map(OsStr::to_string_lossy)
            .join(" ");
        debug!("Running command: `{}`", line);
    }
    Command::new(cmd).args(args).output().map(CmdOutput::from)
}

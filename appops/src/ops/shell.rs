use std::borrow::Cow;
use std::sync::Arc;

use super::client::{AppOpsService, PackageOps, UserRestrictions};
use super::codes::Op;
use super::mode::Mode;
use super::resolver::ModeResolver;
use crate::adb::Adb;
use crate::command::quote;
use crate::{Uid, UserId};

/// Number of uids reserved for each device user
pub const PER_USER_RANGE: Uid = 100000;

/// An [AppOpsService] driving the device's `appops` shell command
///
/// Only the calls the shell can express are supported, everything else
/// fails with [crate::Error::Unsupported].
pub struct ShellAppOpsService {
    adb: Arc<dyn Adb>,
    resolver: ModeResolver,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct GetOutput {
    uid_mode: Option<Mode>,
    package_mode: Option<Mode>,
}

impl ShellAppOpsService {
    pub fn new(adb: Arc<dyn Adb>, resolver: ModeResolver) -> Self {
        Self { adb, resolver }
    }

    /// The name the shell knows `op` by
    fn shell_op_name(&self, op: Op) -> crate::Result<Cow<'_, str>> {
        let row = self
            .resolver
            .row(op)
            .ok_or_else(|| crate::Error::NotFound(format!("op id {}", op)))?;
        Ok(match &row.public_name {
            Some(v) => Cow::Borrowed(v.as_str()),
            None => Cow::Borrowed(row.name.as_str()),
        })
    }

    fn run(&self, cmd: &str) -> crate::Result<String> {
        log::debug!("appops shell: {}", cmd);
        let output = self.adb.shell_checked(cmd)?;
        let stdout = output.stdout_utf8_lossy().into_owned();
        if let Some(line) = stdout
            .lines()
            .find(|l| l.trim_start().starts_with("Error"))
        {
            return Err(crate::Error::RemoteAuthority(line.trim().to_string()));
        }
        Ok(stdout)
    }

    fn unsupported<T>(&self, call: &str) -> crate::Result<T> {
        Err(crate::Error::Unsupported(format!(
            "{} is not available through the appops shell",
            call
        )))
    }
}

fn user_arg(uid: Uid) -> String {
    format!("--user {}", uid / PER_USER_RANGE)
}

/// `name` matches a name printed by the device, which may or may not carry
/// the `OP_` prefix
fn same_op_name(printed: &str, name: &str) -> bool {
    let printed = printed.strip_prefix("OP_").unwrap_or(printed);
    let name = name.strip_prefix("OP_").unwrap_or(name);
    printed == name
}

fn parse_get_output(out: &str, op_name: &str) -> GetOutput {
    let mut parsed = GetOutput::default();
    for line in out.lines() {
        let line = line.trim();
        let (is_uid, line) = match line.strip_prefix("Uid mode:") {
            Some(rest) => (true, rest.trim()),
            None => (false, line),
        };
        let Some((name, rest)) = line.split_once(':') else {
            continue;
        };
        if !same_op_name(name.trim(), op_name) {
            continue;
        }
        let word = rest
            .trim()
            .split(|c: char| c == ';' || c.is_whitespace())
            .next()
            .unwrap_or("");
        let mode = match word.parse::<Mode>() {
            Ok(v) => v,
            Err(_) => {
                log::warn!("unknown mode `{}` in appops output line: {}", word, line);
                continue;
            }
        };
        if is_uid {
            parsed.uid_mode = Some(mode);
        } else {
            parsed.package_mode = Some(mode);
        }
    }
    parsed
}

impl AppOpsService for ShellAppOpsService {
    fn check_operation(&self, op: Op, uid: Uid, package: &str) -> crate::Result<Mode> {
        let shell_name = self.shell_op_name(op)?;
        let cmd = format!(
            "appops get {} {} {}",
            user_arg(uid),
            quote(package),
            shell_name
        );
        let out = self.run(&cmd)?;
        let debug_name = self.resolver.name_for(Some(op));
        let parsed = parse_get_output(&out, &debug_name);
        Ok(match (parsed.uid_mode, parsed.package_mode) {
            (Some(uid_mode), _) if uid_mode != Mode::Default => uid_mode,
            (_, Some(package_mode)) => package_mode,
            _ => self.resolver.default_mode_for(op),
        })
    }

    fn check_package(&self, _uid: Uid, _package: &str) -> crate::Result<Mode> {
        self.unsupported("checkPackage")
    }

    fn get_packages_for_ops(&self, _ops: &[Op]) -> crate::Result<Vec<PackageOps>> {
        self.unsupported("getPackagesForOps")
    }

    fn get_ops_for_package(
        &self,
        _uid: Uid,
        _package: &str,
        _ops: &[Op],
    ) -> crate::Result<Vec<PackageOps>> {
        self.unsupported("getOpsForPackage")
    }

    fn get_uid_ops(&self, _uid: Uid, _ops: &[Op]) -> crate::Result<Vec<PackageOps>> {
        self.unsupported("getUidOps")
    }

    fn set_uid_mode(&self, op: Op, uid: Uid, mode: Mode) -> crate::Result<()> {
        let cmd = format!("appops set {} {} {}", uid, self.shell_op_name(op)?, mode);
        self.run(&cmd).map(|_| ())
    }

    fn set_mode(&self, op: Op, uid: Uid, package: &str, mode: Mode) -> crate::Result<()> {
        let cmd = format!(
            "appops set {} {} {} {}",
            user_arg(uid),
            quote(package),
            self.shell_op_name(op)?,
            mode
        );
        self.run(&cmd).map(|_| ())
    }

    fn reset_all_modes(&self, user: Option<UserId>, package: Option<&str>) -> crate::Result<()> {
        let mut cmd = String::from("appops reset");
        if let Some(user) = user {
            cmd.push_str(&format!(" --user {}", user));
        }
        if let Some(package) = package {
            cmd.push(' ');
            cmd.push_str(&quote(package));
        }
        self.run(&cmd).map(|_| ())
    }

    fn set_user_restrictions(
        &self,
        _restrictions: &UserRestrictions,
        _token: &str,
        _user: UserId,
    ) -> crate::Result<()> {
        self.unsupported("setUserRestrictions")
    }

    fn set_user_restriction(
        &self,
        _op: Op,
        _restricted: bool,
        _token: &str,
        _user: UserId,
        _exception_packages: &[String],
    ) -> crate::Result<()> {
        self.unsupported("setUserRestriction")
    }

    fn remove_user(&self, _user: UserId) -> crate::Result<()> {
        self.unsupported("removeUser")
    }

    fn is_ops_enabled(&self) -> crate::Result<bool> {
        self.unsupported("isOpsEnabled")
    }

    fn set_ops_enabled(&self, _enabled: bool) -> crate::Result<()> {
        self.unsupported("setOpsEnabled")
    }

    fn on_start_op(&self, _token: &str, _op: Op, _uid: Uid, _package: &str) -> crate::Result<()> {
        self.unsupported("onStartOp")
    }

    fn on_finish_op(&self, _token: &str, _op: Op, _uid: Uid, _package: &str) -> crate::Result<()> {
        self.unsupported("onFinishOp")
    }

    fn set_op_remind_enable(&self, _op: Op, _enable: bool) -> crate::Result<()> {
        self.unsupported("setOpRemindEnable")
    }

    fn is_op_remind_enabled(&self, _op: Op) -> crate::Result<bool> {
        self.unsupported("isOpRemindEnabled")
    }
}

#[cfg(test)]
mod test {
    use super::super::codes::*;
    use super::*;
    use crate::testing::{mock_adb, shell_output, MockAdb};
    use rstest::*;

    fn service(adb: MockAdb) -> ShellAppOpsService {
        ShellAppOpsService::new(Arc::new(adb), ModeResolver::default())
    }

    #[test]
    fn test_parse_get_output() {
        let out = "Uid mode: CAMERA: ignore\nCAMERA: allow; time=+2h13m ago; duration=+1s\n";
        assert_eq!(
            parse_get_output(out, "CAMERA"),
            GetOutput {
                uid_mode: Some(Mode::Ignored),
                package_mode: Some(Mode::Allowed),
            }
        );
        assert_eq!(parse_get_output("No operations.\n", "CAMERA"), GetOutput::default());
        assert_eq!(
            parse_get_output("READ_PHONE_STATE: deny\n", "OP_READ_PHONE_STATE").package_mode,
            Some(Mode::Errored)
        );
    }

    #[rstest]
    fn test_check_operation_uid_mode_wins(mut mock_adb: MockAdb) {
        mock_adb
            .expect_shell()
            .withf(|cmd| cmd == "appops get --user 0 'com.example.app' android:camera")
            .times(1)
            .returning(|_| Ok(shell_output("Uid mode: CAMERA: ignore\nCAMERA: allow\n")));
        let svc = service(mock_adb);
        assert_eq!(
            svc.check_operation(OP_CAMERA, 10123, "com.example.app")
                .unwrap(),
            Mode::Ignored
        );
    }

    #[rstest]
    fn test_check_operation_default_fallback(mut mock_adb: MockAdb) {
        mock_adb
            .expect_shell()
            .returning(|_| Ok(shell_output("No operations.\n")));
        let svc = service(mock_adb);
        assert_eq!(
            svc.check_operation(OP_MOCK_LOCATION, 1010123, "com.example.app")
                .unwrap(),
            Mode::Errored
        );
    }

    #[rstest]
    fn test_error_output(mut mock_adb: MockAdb) {
        mock_adb
            .expect_shell()
            .returning(|_| Ok(shell_output("Error: Unknown package: com.nope\n")));
        let svc = service(mock_adb);
        match svc.set_mode(OP_CAMERA, 10001, "com.nope", Mode::Ignored) {
            Err(crate::Error::RemoteAuthority(msg)) => {
                assert_eq!(msg, "Error: Unknown package: com.nope")
            }
            other => panic!("expected RemoteAuthority, got {:?}", other),
        }
    }

    #[rstest]
    fn test_error_word_inside_line_is_not_a_rejection(mut mock_adb: MockAdb) {
        mock_adb.expect_shell().returning(|_| {
            Ok(shell_output(
                "CAMERA: allow; time=+1s ago; proxy[uid=10200, pkg=com.example.ErrorReporter]\n",
            ))
        });
        let svc = service(mock_adb);
        assert_eq!(
            svc.check_operation(OP_CAMERA, 10123, "com.example.app")
                .unwrap(),
            Mode::Allowed
        );
    }

    #[rstest]
    fn test_set_uid_mode(mut mock_adb: MockAdb) {
        mock_adb
            .expect_shell()
            .withf(|cmd| cmd == "appops set 10123 android:run_in_background ignore")
            .times(1)
            .returning(|_| Ok(shell_output("")));
        let svc = service(mock_adb);
        svc.set_uid_mode(OP_RUN_IN_BACKGROUND, 10123, Mode::Ignored)
            .unwrap();
    }

    #[rstest]
    fn test_reset(mut mock_adb: MockAdb) {
        mock_adb
            .expect_shell()
            .withf(|cmd| cmd == "appops reset --user 10 'com.example.app'")
            .times(1)
            .returning(|_| Ok(shell_output("")));
        let svc = service(mock_adb);
        svc.reset_all_modes(Some(10), Some("com.example.app"))
            .unwrap();
    }

    #[rstest]
    fn test_unsupported(mock_adb: MockAdb) {
        let svc = service(mock_adb);
        assert!(matches!(
            svc.on_start_op("token", OP_CAMERA, 10123, "com.example.app"),
            Err(crate::Error::Unsupported(_))
        ));
    }
}

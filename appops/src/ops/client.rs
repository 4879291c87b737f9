use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::codes::{Op, OP_CAMERA, OP_RECORD_AUDIO};
use super::mode::Mode;
use crate::{Uid, UserId};

/// One op's recorded state for a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpEntry {
    pub op: Op,
    pub mode: Mode,
    pub time: i64,
    pub reject_time: i64,
    pub duration: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageOps {
    pub package_name: String,
    pub uid: Uid,
    pub ops: Vec<OpEntry>,
}

/// Restriction key to whether it is set, as handed to
/// [AppOpsService::set_user_restrictions]
pub type UserRestrictions = BTreeMap<String, bool>;

/// The remote authority that owns op modes
///
/// Every call may fail, implementations report failures as
/// [crate::Error::RemoteAuthority] or [crate::Error::Unsupported].
pub trait AppOpsService: Send + Sync {
    fn check_operation(&self, op: Op, uid: Uid, package: &str) -> crate::Result<Mode>;

    fn check_package(&self, uid: Uid, package: &str) -> crate::Result<Mode>;

    fn get_packages_for_ops(&self, ops: &[Op]) -> crate::Result<Vec<PackageOps>>;

    fn get_ops_for_package(
        &self,
        uid: Uid,
        package: &str,
        ops: &[Op],
    ) -> crate::Result<Vec<PackageOps>>;

    fn get_uid_ops(&self, uid: Uid, ops: &[Op]) -> crate::Result<Vec<PackageOps>>;

    fn set_uid_mode(&self, op: Op, uid: Uid, mode: Mode) -> crate::Result<()>;

    fn set_mode(&self, op: Op, uid: Uid, package: &str, mode: Mode) -> crate::Result<()>;

    /// Reset every resettable op, optionally limited to a user and package
    fn reset_all_modes(&self, user: Option<UserId>, package: Option<&str>) -> crate::Result<()>;

    fn set_user_restrictions(
        &self,
        restrictions: &UserRestrictions,
        token: &str,
        user: UserId,
    ) -> crate::Result<()>;

    fn set_user_restriction(
        &self,
        op: Op,
        restricted: bool,
        token: &str,
        user: UserId,
        exception_packages: &[String],
    ) -> crate::Result<()>;

    fn remove_user(&self, user: UserId) -> crate::Result<()>;

    fn is_ops_enabled(&self) -> crate::Result<bool>;

    fn set_ops_enabled(&self, enabled: bool) -> crate::Result<()>;

    fn on_start_op(&self, token: &str, op: Op, uid: Uid, package: &str) -> crate::Result<()>;

    fn on_finish_op(&self, token: &str, op: Op, uid: Uid, package: &str) -> crate::Result<()>;

    fn set_op_remind_enable(&self, op: Op, enable: bool) -> crate::Result<()>;

    fn is_op_remind_enabled(&self, op: Op) -> crate::Result<bool>;
}

/// Forwards policy calls to an [AppOpsService]. Nothing is cached and failed
/// calls are never retried.
#[derive(Clone)]
pub struct OpClient {
    service: Arc<dyn AppOpsService>,
}

macro_rules! forward {
    ($name:literal, $call:expr) => {{
        log::trace!("forwarding {}", $name);
        $call.map_err(|e| {
            log::debug!("{} failed: {}", $name, e);
            e.into_remote()
        })
    }};
}

impl OpClient {
    pub fn new(service: Arc<dyn AppOpsService>) -> Self {
        Self { service }
    }

    pub fn check_operation(&self, op: Op, uid: Uid, package: &str) -> crate::Result<Mode> {
        forward!(
            "checkOperation",
            self.service.check_operation(op, uid, package)
        )
    }

    pub fn check_package(&self, uid: Uid, package: &str) -> crate::Result<Mode> {
        forward!("checkPackage", self.service.check_package(uid, package))
    }

    pub fn get_packages_for_ops(&self, ops: &[Op]) -> crate::Result<Vec<PackageOps>> {
        forward!(
            "getPackagesForOps",
            self.service.get_packages_for_ops(ops)
        )
    }

    pub fn get_ops_for_package(
        &self,
        uid: Uid,
        package: &str,
        ops: &[Op],
    ) -> crate::Result<Vec<PackageOps>> {
        forward!(
            "getOpsForPackage",
            self.service.get_ops_for_package(uid, package, ops)
        )
    }

    pub fn get_uid_ops(&self, uid: Uid, ops: &[Op]) -> crate::Result<Vec<PackageOps>> {
        forward!("getUidOps", self.service.get_uid_ops(uid, ops))
    }

    pub fn set_uid_mode(&self, op: Op, uid: Uid, mode: Mode) -> crate::Result<()> {
        forward!("setUidMode", self.service.set_uid_mode(op, uid, mode))
    }

    pub fn set_mode(&self, op: Op, uid: Uid, package: &str, mode: Mode) -> crate::Result<()> {
        forward!(
            "setMode",
            self.service.set_mode(op, uid, package, mode)
        )
    }

    pub fn reset_all_modes(&self, user: Option<UserId>, package: Option<&str>) -> crate::Result<()> {
        forward!(
            "resetAllModes",
            self.service.reset_all_modes(user, package)
        )
    }

    pub fn set_user_restrictions(
        &self,
        restrictions: &UserRestrictions,
        token: &str,
        user: UserId,
    ) -> crate::Result<()> {
        forward!(
            "setUserRestrictions",
            self.service.set_user_restrictions(restrictions, token, user)
        )
    }

    pub fn set_user_restriction(
        &self,
        op: Op,
        restricted: bool,
        token: &str,
        user: UserId,
        exception_packages: &[String],
    ) -> crate::Result<()> {
        forward!(
            "setUserRestriction",
            self.service
                .set_user_restriction(op, restricted, token, user, exception_packages)
        )
    }

    pub fn remove_user(&self, user: UserId) -> crate::Result<()> {
        forward!("removeUser", self.service.remove_user(user))
    }

    pub fn is_ops_enabled(&self) -> crate::Result<bool> {
        forward!("isOpsEnabled", self.service.is_ops_enabled())
    }

    pub fn set_ops_enabled(&self, enabled: bool) -> crate::Result<()> {
        forward!("setOpsEnabled", self.service.set_ops_enabled(enabled))
    }

    pub fn on_start_op(&self, token: &str, op: Op, uid: Uid, package: &str) -> crate::Result<()> {
        forward!(
            "onStartOp",
            self.service.on_start_op(token, op, uid, package)
        )
    }

    pub fn on_finish_op(&self, token: &str, op: Op, uid: Uid, package: &str) -> crate::Result<()> {
        forward!(
            "onFinishOp",
            self.service.on_finish_op(token, op, uid, package)
        )
    }

    pub fn set_op_remind_enable(&self, op: Op, enable: bool) -> crate::Result<()> {
        forward!(
            "setOpRemindEnable",
            self.service.set_op_remind_enable(op, enable)
        )
    }

    pub fn is_op_remind_enabled(&self, op: Op) -> crate::Result<bool> {
        forward!(
            "isOpRemindEnabled",
            self.service.is_op_remind_enabled(op)
        )
    }

    /// Only camera and microphone ops can be reminded about
    pub fn is_op_remindable(&self, op: Op) -> bool {
        op == OP_CAMERA || op == OP_RECORD_AUDIO
    }
}

#[cfg(test)]
mod test {
    use super::super::codes::*;
    use super::*;
    use crate::testing::{mock_app_ops_service, MockAppOpsService};
    use rstest::*;

    #[rstest]
    fn test_check_operation_forwards(mut mock_app_ops_service: MockAppOpsService) {
        mock_app_ops_service
            .expect_check_operation()
            .withf(|op, uid, pkg| *op == OP_CAMERA && *uid == 10123 && pkg == "com.example.app")
            .times(1)
            .returning(|_, _, _| Ok(Mode::Ignored));
        let client = OpClient::new(Arc::new(mock_app_ops_service));
        assert_eq!(
            client
                .check_operation(OP_CAMERA, 10123, "com.example.app")
                .unwrap(),
            Mode::Ignored
        );
    }

    #[rstest]
    fn test_failure_is_propagated_once(mut mock_app_ops_service: MockAppOpsService) {
        mock_app_ops_service
            .expect_set_mode()
            .times(1)
            .returning(|_, _, _, _| Err(crate::Error::NoAdbDevice));
        let client = OpClient::new(Arc::new(mock_app_ops_service));
        let err = client
            .set_mode(OP_CAMERA, 10123, "com.example.app", Mode::Allowed)
            .unwrap_err();
        match err {
            crate::Error::RemoteAuthority(msg) => assert!(msg.contains("no adb device"), "{msg}"),
            e => panic!("expected RemoteAuthority, got {e}"),
        }
    }

    #[rstest]
    fn test_unsupported_kept(mut mock_app_ops_service: MockAppOpsService) {
        mock_app_ops_service
            .expect_is_ops_enabled()
            .returning(|| Err(crate::Error::Unsupported("isOpsEnabled".into())));
        let client = OpClient::new(Arc::new(mock_app_ops_service));
        assert!(matches!(
            client.is_ops_enabled(),
            Err(crate::Error::Unsupported(_))
        ));
    }

    #[rstest]
    fn test_reset_arguments(mut mock_app_ops_service: MockAppOpsService) {
        mock_app_ops_service
            .expect_reset_all_modes()
            .withf(|user, pkg| *user == Some(10) && *pkg == Some("com.example.app"))
            .times(1)
            .returning(|_, _| Ok(()));
        let client = OpClient::new(Arc::new(mock_app_ops_service));
        client
            .reset_all_modes(Some(10), Some("com.example.app"))
            .unwrap();
    }

    #[rstest]
    fn test_is_op_remindable(mock_app_ops_service: MockAppOpsService) {
        let client = OpClient::new(Arc::new(mock_app_ops_service));
        let remindable: Vec<Op> = (0..N_OP as Op)
            .filter(|op| client.is_op_remindable(*op))
            .collect();
        assert_eq!(remindable, vec![OP_CAMERA, OP_RECORD_AUDIO]);
    }
}

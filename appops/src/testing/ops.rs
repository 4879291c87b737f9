use mockall::mock;
use rstest::fixture;

use crate::ops::{Mode, Op, PackageOps, UserRestrictions};
use crate::{Uid, UserId};

mock! {
    pub AppOpsService {

    }

    impl crate::ops::AppOpsService for AppOpsService {
        fn check_operation(&self, op: Op, uid: Uid, package: &str) -> crate::Result<Mode>;
        fn check_package(&self, uid: Uid, package: &str) -> crate::Result<Mode>;
        fn get_packages_for_ops(&self, ops: &[Op]) -> crate::Result<Vec<PackageOps>>;
        fn get_ops_for_package(&self, uid: Uid, package: &str, ops: &[Op]) -> crate::Result<Vec<PackageOps>>;
        fn get_uid_ops(&self, uid: Uid, ops: &[Op]) -> crate::Result<Vec<PackageOps>>;
        fn set_uid_mode(&self, op: Op, uid: Uid, mode: Mode) -> crate::Result<()>;
        fn set_mode(&self, op: Op, uid: Uid, package: &str, mode: Mode) -> crate::Result<()>;
        fn reset_all_modes<'a>(&self, user: Option<UserId>, package: Option<&'a str>) -> crate::Result<()>;
        fn set_user_restrictions(&self, restrictions: &UserRestrictions, token: &str, user: UserId) -> crate::Result<()>;
        fn set_user_restriction(&self, op: Op, restricted: bool, token: &str, user: UserId, exception_packages: &[String]) -> crate::Result<()>;
        fn remove_user(&self, user: UserId) -> crate::Result<()>;
        fn is_ops_enabled(&self) -> crate::Result<bool>;
        fn set_ops_enabled(&self, enabled: bool) -> crate::Result<()>;
        fn on_start_op(&self, token: &str, op: Op, uid: Uid, package: &str) -> crate::Result<()>;
        fn on_finish_op(&self, token: &str, op: Op, uid: Uid, package: &str) -> crate::Result<()>;
        fn set_op_remind_enable(&self, op: Op, enable: bool) -> crate::Result<()>;
        fn is_op_remind_enabled(&self, op: Op) -> crate::Result<bool>;
    }
}

#[fixture]
pub fn mock_app_ops_service() -> MockAppOpsService {
    MockAppOpsService::new()
}

use mockall::mock;
use rstest::fixture;

use crate::pm::AppInfo;

mock! {
    pub PackageInventory {

    }

    impl crate::pm::PackageInventory for PackageInventory {
        fn list_installed_packages(&self) -> crate::Result<Vec<AppInfo>>;
    }
}

#[fixture]
pub fn mock_package_inventory() -> MockPackageInventory {
    MockPackageInventory::new()
}

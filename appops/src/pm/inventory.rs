use std::collections::HashSet;
use std::sync::Arc;

use super::app_info::{AppFlags, AppInfo};
use crate::adb::Adb;
use crate::utils::PackageAllowlist;
use crate::{Context, Uid};

pub const SYSTEM_UID: Uid = 1000;
pub const PHONE_UID: Uid = 1001;
pub const MEDIA_UID: Uid = 1013;

/// Source of the full installed package list the cache is rebuilt from
pub trait PackageInventory: Send + Sync {
    fn list_installed_packages(&self) -> crate::Result<Vec<AppInfo>>;
}

/// A [PackageInventory] that asks the device's package manager over `adb`
pub struct AdbPackageInventory {
    adb: Arc<dyn Adb>,
    web_view_providers: PackageAllowlist,
    whitelist: PackageAllowlist,
}

impl AdbPackageInventory {
    pub fn new(
        adb: Arc<dyn Adb>,
        web_view_providers: PackageAllowlist,
        whitelist: PackageAllowlist,
    ) -> Self {
        Self {
            adb,
            web_view_providers,
            whitelist,
        }
    }

    /// Build the inventory with the web view providers and whitelist from the
    /// project config
    pub fn from_context(ctx: &dyn Context, adb: Arc<dyn Adb>) -> crate::Result<Self> {
        let packages = &ctx.get_project_config()?.packages;
        let whitelist = packages.load_whitelist(ctx)?;
        let web_view_providers = packages.web_view_providers.iter().collect();
        Ok(Self::new(adb, web_view_providers, whitelist))
    }

    /// Names of the packages the package manager reports as system
    /// packages. Updated system apps live under `/data/app` but are still in
    /// this set.
    fn system_packages(&self) -> crate::Result<HashSet<String>> {
        let output = self
            .adb
            .shell_checked("pm list packages -s")
            .map_err(|e| e.into_provider())?;
        let names = output
            .stdout_utf8_lossy()
            .lines()
            .filter_map(|l| l.trim().strip_prefix("package:"))
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect();
        Ok(names)
    }

    fn classify(&self, system: &HashSet<String>, pkg_name: &str, uid: Uid) -> AppFlags {
        let mut flags = if system.contains(pkg_name) {
            AppFlags::SYSTEM
        } else {
            AppFlags::USER
        };
        match uid {
            SYSTEM_UID => flags |= AppFlags::SYSTEM_UID,
            PHONE_UID => flags |= AppFlags::SYSTEM_PHONE,
            MEDIA_UID => flags |= AppFlags::SYSTEM_MEDIA,
            _ => {}
        }
        if self.web_view_providers.allows(pkg_name) {
            flags |= AppFlags::WEB_VIEW_PROVIDER;
        }
        if self.whitelist.allows(pkg_name) {
            flags |= AppFlags::WHITE_LISTED;
        }
        flags
    }

    fn parse_line(&self, system: &HashSet<String>, line: &str) -> Option<AppInfo> {
        let (path_and_name, uid) = match line.rsplit_once(" uid:") {
            Some(v) => v,
            None => {
                log::error!("invalid output for list packages (no uid): {}", line);
                return None;
            }
        };
        let uid = match uid.trim().parse::<Uid>() {
            Ok(v) => v,
            Err(_) => {
                log::error!("invalid uid in list packages line: {}", line);
                return None;
            }
        };
        let path_and_name = match path_and_name.strip_prefix("package:") {
            Some(v) => v,
            None => {
                log::error!("invalid output for list packages (no `package:`): {}", line);
                return None;
            }
        };
        // Install paths can contain `=` themselves
        let (_path, pkg_name) = match path_and_name.rsplit_once('=') {
            Some(v) => v,
            None => {
                log::error!("invalid output for list packages (no `=`): {}", line);
                return None;
            }
        };
        if pkg_name.is_empty() {
            log::warn!("package missing name for line: {}", line);
            return None;
        }
        let flags = self.classify(system, pkg_name, uid);
        Some(AppInfo::new(pkg_name, uid, flags))
    }
}

impl PackageInventory for AdbPackageInventory {
    fn list_installed_packages(&self) -> crate::Result<Vec<AppInfo>> {
        let system = self.system_packages()?;
        let output = self
            .adb
            .shell_checked("pm list packages -f -U")
            .map_err(|e| e.into_provider())?;
        let stdout = output.stdout_utf8_lossy();
        let apps: Vec<AppInfo> = stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .filter_map(|l| self.parse_line(&system, l))
            .collect();
        log::debug!("pm listed {} packages", apps.len());
        Ok(apps)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::{mock_adb, shell_output, MockAdb};
    use rstest::*;
    use std::io;

    const PM_OUTPUT: &str = "package:/system/framework/framework-res.apk=android uid:1000
package:/system/priv-app/TeleService/TeleService.apk=com.android.phone uid:1001
package:/system/priv-app/MediaProvider/MediaProvider.apk=com.android.providers.media uid:1013
package:/product/app/WebViewGoogle/WebViewGoogle.apk=com.google.android.webview uid:10098
package:/data/app/~~Xk3d==/com.example.app-9a_Q==/base.apk=com.example.app uid:10123
garbage line
package:/data/app/com.example.broken/base.apk=com.example.broken uid:notanumber
";

    const PM_SYSTEM_OUTPUT: &str = "package:android
package:com.android.phone
package:com.android.providers.media
package:com.google.android.webview
package:com.google.android.gms
";

    fn expect_pm(adb: &mut MockAdb, listing: &'static str) {
        adb.expect_shell()
            .withf(|cmd| cmd == "pm list packages -s")
            .returning(|_| Ok(shell_output(PM_SYSTEM_OUTPUT)));
        adb.expect_shell()
            .withf(|cmd| cmd == "pm list packages -f -U")
            .returning(move |_| Ok(shell_output(listing)));
    }

    fn inventory(adb: MockAdb) -> AdbPackageInventory {
        AdbPackageInventory::new(
            Arc::new(adb),
            ["com.google.android.webview"].iter().collect(),
            ["com.android.phone"].iter().collect(),
        )
    }

    #[rstest]
    fn test_list_installed_packages(mut mock_adb: MockAdb) {
        expect_pm(&mut mock_adb, PM_OUTPUT);

        let apps = inventory(mock_adb).list_installed_packages().unwrap();
        let flags: Vec<(&str, Uid, AppFlags)> = apps
            .iter()
            .map(|it| (it.pkg_name.as_str(), it.uid, it.flags))
            .collect();

        assert_eq!(
            flags,
            vec![
                ("android", 1000, AppFlags::SYSTEM | AppFlags::SYSTEM_UID),
                (
                    "com.android.phone",
                    1001,
                    AppFlags::SYSTEM | AppFlags::SYSTEM_PHONE | AppFlags::WHITE_LISTED
                ),
                (
                    "com.android.providers.media",
                    1013,
                    AppFlags::SYSTEM | AppFlags::SYSTEM_MEDIA
                ),
                (
                    "com.google.android.webview",
                    10098,
                    AppFlags::SYSTEM | AppFlags::WEB_VIEW_PROVIDER
                ),
                ("com.example.app", 10123, AppFlags::USER),
            ]
        );
        assert_eq!(apps[4].label, "com.example.app");
    }

    #[rstest]
    fn test_updated_system_app_is_system(mut mock_adb: MockAdb) {
        expect_pm(
            &mut mock_adb,
            "package:/data/app/~~abc==/com.google.android.gms-1/base.apk=com.google.android.gms uid:10050\n",
        );
        let apps = inventory(mock_adb).list_installed_packages().unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].flags, AppFlags::SYSTEM);
        assert!(!apps[0].is_a(AppFlags::USER));
    }

    #[rstest]
    fn test_adb_failure_is_provider_error(mut mock_adb: MockAdb) {
        mock_adb
            .expect_shell()
            .returning(|_| Err(io::Error::new(io::ErrorKind::NotFound, "adb not found")));
        match inventory(mock_adb).list_installed_packages() {
            Err(crate::Error::Provider(msg)) => assert!(msg.contains("adb not found"), "{msg}"),
            other => panic!("expected Provider, got {:?}", other.map(|v| v.len())),
        }
    }
}

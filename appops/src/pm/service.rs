use std::sync::{Arc, Mutex};

use super::app_info::{AppFlags, AppInfo};
use super::cache::PackageCache;
use super::inventory::PackageInventory;
use super::monitor::{CacheInvalidator, PackageEventListener, PackageMonitor};
use crate::{Context, Uid};

struct Registration {
    monitor: Arc<dyn PackageMonitor>,
    listener: Arc<dyn PackageEventListener>,
}

/// Owns the [PackageCache] lifecycle and answers package queries from it
pub struct PkgManagerService {
    cache: Arc<PackageCache>,
    host_package: Option<String>,
    registration: Mutex<Option<Registration>>,
}

impl PkgManagerService {
    pub fn new(host_package: Option<String>) -> Self {
        Self {
            cache: Arc::new(PackageCache::new()),
            host_package,
            registration: Mutex::new(None),
        }
    }

    /// Create the service with the host package from the project config
    pub fn from_context(ctx: &dyn Context) -> crate::Result<Self> {
        let cfg = ctx.get_project_config()?;
        Ok(Self::new(cfg.packages.host_package.clone()))
    }

    pub fn cache(&self) -> &Arc<PackageCache> {
        &self.cache
    }

    pub fn on_start(&self, provider: Box<dyn PackageInventory>) {
        self.cache.on_start(provider);
    }

    /// Start following package changes. The cache is invalidated first so
    /// anything read before this point is reloaded.
    pub fn system_ready(&self, monitor: Arc<dyn PackageMonitor>) {
        self.cache.invalidate();
        let listener: Arc<dyn PackageEventListener> =
            Arc::new(CacheInvalidator::new(Arc::clone(&self.cache)));
        monitor.register(Arc::clone(&listener));

        let prev = self
            .registration
            .lock()
            .expect("failed to lock")
            .replace(Registration { monitor, listener });
        if let Some(prev) = prev {
            log::warn!("system_ready called twice, dropping the previous monitor");
            prev.monitor.unregister(&prev.listener);
        }
    }

    pub fn shutdown(&self) {
        if let Some(reg) = self.registration.lock().expect("failed to lock").take() {
            reg.monitor.unregister(&reg.listener);
        }
    }

    pub fn pkg_names_for_uid(&self, uid: Uid) -> crate::Result<Option<Vec<String>>> {
        self.cache.pkg_names_for_uid(uid)
    }

    pub fn uid_for_pkg_name(&self, pkg_name: &str) -> crate::Result<Option<Uid>> {
        self.cache.uid_for_pkg_name(pkg_name)
    }

    /// Uid of the configured host package, if it is installed
    pub fn host_app_uid(&self) -> crate::Result<Option<Uid>> {
        match &self.host_package {
            Some(pkg) => self.cache.uid_for_pkg_name(pkg),
            None => Ok(None),
        }
    }

    pub fn installed_pkgs(&self, flags: AppFlags) -> crate::Result<Vec<AppInfo>> {
        self.cache.installed_pkgs(flags)
    }

    pub fn app_info(&self, pkg_name: &str) -> crate::Result<Option<AppInfo>> {
        self.cache.app_info(pkg_name)
    }

    pub fn all_apps(&self) -> crate::Result<Vec<AppInfo>> {
        self.cache.all_apps()
    }

    pub fn whitelist_pkgs(&self) -> crate::Result<Vec<String>> {
        self.cache.whitelist_pkgs()
    }

    pub fn is_pkg_in_whitelist(&self, pkg_name: &str) -> crate::Result<bool> {
        self.cache.is_pkg_in_whitelist(pkg_name)
    }
}

impl Drop for PkgManagerService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pm::LocalPackageMonitor;
    use crate::testing::{mock_package_inventory, MockPackageInventory};
    use rstest::*;

    #[fixture]
    fn abc_inventory(mut mock_package_inventory: MockPackageInventory) -> MockPackageInventory {
        mock_package_inventory
            .expect_list_installed_packages()
            .returning(|| {
                Ok(vec![
                    AppInfo::new("A", 1000, AppFlags::SYSTEM),
                    AppInfo::new("B", 1000, AppFlags::USER),
                    AppInfo::new("C", 2000, AppFlags::WHITE_LISTED),
                ])
            });
        mock_package_inventory
    }

    #[rstest]
    fn test_queries(abc_inventory: MockPackageInventory) {
        let svc = PkgManagerService::new(Some(String::from("C")));
        svc.on_start(Box::new(abc_inventory));

        assert_eq!(
            svc.pkg_names_for_uid(1000).unwrap(),
            Some(vec![String::from("A"), String::from("B")])
        );
        assert_eq!(svc.pkg_names_for_uid(3000).unwrap(), None);
        assert_eq!(svc.uid_for_pkg_name("C").unwrap(), Some(2000));
        assert_eq!(svc.uid_for_pkg_name("D").unwrap(), None);

        let selected: Vec<String> = svc
            .installed_pkgs(AppFlags::SYSTEM | AppFlags::WHITE_LISTED)
            .unwrap()
            .into_iter()
            .map(|it| it.pkg_name)
            .collect();
        assert_eq!(selected, vec!["A", "C"]);

        assert!(svc.is_pkg_in_whitelist("C").unwrap());
        assert!(!svc.is_pkg_in_whitelist("B").unwrap());
        assert_eq!(svc.whitelist_pkgs().unwrap(), vec!["C"]);
        assert_eq!(svc.app_info("B").unwrap().map(|it| it.uid), Some(1000));
        assert_eq!(svc.host_app_uid().unwrap(), Some(2000));
        assert_eq!(svc.all_apps().unwrap().len(), 3);
    }

    #[rstest]
    fn test_lifecycle(abc_inventory: MockPackageInventory) {
        let svc = PkgManagerService::new(None);
        svc.on_start(Box::new(abc_inventory));
        let monitor = Arc::new(LocalPackageMonitor::new());

        svc.all_apps().unwrap();
        svc.system_ready(Arc::clone(&monitor) as Arc<dyn PackageMonitor>);
        assert!(!svc.cache().is_valid());
        assert_eq!(monitor.listener_count(), 1);

        svc.all_apps().unwrap();
        monitor.package_removed("B", 1000);
        assert!(!svc.cache().is_valid());

        svc.shutdown();
        assert_eq!(monitor.listener_count(), 0);
        assert_eq!(svc.host_app_uid().unwrap(), None);
    }
}

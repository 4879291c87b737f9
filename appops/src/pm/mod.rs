//! Installed package registry

pub mod app_info;
pub mod cache;
pub mod inventory;
pub mod monitor;
pub mod service;

pub use app_info::{AppFlags, AppInfo};
pub use cache::{PackageCache, PkgSnapshot};
pub use inventory::{AdbPackageInventory, PackageInventory};
pub use monitor::{
    CacheInvalidator, LocalPackageMonitor, PackageEvent, PackageEventListener, PackageMonitor,
};
pub use service::PkgManagerService;

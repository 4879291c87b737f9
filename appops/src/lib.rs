pub mod context;
pub use context::{Context, DefaultContext};

pub mod config;

pub mod errors;
pub use errors::{Error, Result};

pub mod adb;

pub mod command;
pub use command::run_cmd;

pub mod ops;
pub use ops::{Mode, ModeResolver, Op, OpClient, OpTable};

pub mod pm;
pub use pm::{AppFlags, AppInfo, PackageCache, PkgManagerService};

pub mod utils;

/// Identity an installed package runs as
pub type Uid = u32;

/// A device user
pub type UserId = u32;

#[cfg(test)]
pub mod testing;

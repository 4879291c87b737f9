//! Op taxonomy and mode resolution

pub mod client;
pub mod codes;
pub mod mode;
pub mod resolver;
pub mod shell;
pub mod table;

pub use client::{AppOpsService, OpClient, OpEntry, PackageOps, UserRestrictions};
pub use codes::{Op, N_OP};
pub use mode::{mode_name, Mode};
pub use resolver::ModeResolver;
pub use shell::ShellAppOpsService;
pub use table::{OpColumns, OpRow, OpTable};

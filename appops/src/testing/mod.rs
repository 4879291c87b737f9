mod adb;
mod context;
mod ops;
mod pm;

pub use adb::*;
pub use context::*;
pub use ops::*;
pub use pm::*;

mod fs;
pub use fs::*;

mod allowlist;
pub use allowlist::PackageAllowlist;

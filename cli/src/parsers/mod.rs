use clap::error::ErrorKind;
use std::fmt::Display;

mod op;
pub use op::OpValueParser;

mod mode;
pub use mode::ModeValueParser;

mod flags;
pub use flags::AppFlagsValueParser;

pub fn simple_error(err: impl Display) -> clap::Error {
    clap::Error::raw(ErrorKind::InvalidValue, format!("{}\n", err.to_string()))
}

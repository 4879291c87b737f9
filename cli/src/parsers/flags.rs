use clap::builder::{NonEmptyStringValueParser, TypedValueParser};

use crate::parsers::simple_error;
use appops::AppFlags;

#[derive(Clone)]
pub struct AppFlagsValueParser;

impl TypedValueParser for AppFlagsValueParser {
    type Value = AppFlags;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        arg: Option<&clap::Arg>,
        value: &std::ffi::OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let parser = NonEmptyStringValueParser::new();
        let val = parser.parse_ref(cmd, arg, value)?;
        val.parse::<AppFlags>().map_err(simple_error)
    }
}

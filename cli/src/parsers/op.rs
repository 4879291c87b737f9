use clap::builder::{NonEmptyStringValueParser, TypedValueParser};

use crate::parsers::simple_error;
use appops::{ModeResolver, Op};

/// Accepts a numeric op id, a debug name (`CAMERA`) or a public id
/// (`android:camera`)
#[derive(Clone)]
pub struct OpValueParser;

impl TypedValueParser for OpValueParser {
    type Value = Op;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        arg: Option<&clap::Arg>,
        value: &std::ffi::OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let parser = NonEmptyStringValueParser::new();
        let val = parser.parse_ref(cmd, arg, value)?;
        let resolver = ModeResolver::default();
        resolver
            .parse_op(&val)
            .map_err(|_| simple_error(format!("no op named {}", val)))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::*;

    fn parse(value: &str) -> Result<Op, clap::Error> {
        let cmd = clap::Command::new("test");
        OpValueParser.parse_ref(&cmd, None, std::ffi::OsStr::new(value))
    }

    #[rstest]
    #[case("26", 26)]
    #[case("CAMERA", 26)]
    #[case("android:camera", 26)]
    #[case("android:record_audio", 27)]
    fn test_parse_op(#[case] value: &str, #[case] expected: Op) {
        assert_eq!(parse(value).unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_op() {
        assert!(parse("android:nope").is_err());
        assert!(parse("78").is_err());
    }
}

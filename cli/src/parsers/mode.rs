use clap::builder::{NonEmptyStringValueParser, TypedValueParser};

use crate::parsers::simple_error;
use appops::Mode;

/// Accepts a mode name (`allow`, `ignore`, ...) or its number
#[derive(Clone)]
pub struct ModeValueParser;

impl TypedValueParser for ModeValueParser {
    type Value = Mode;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        arg: Option<&clap::Arg>,
        value: &std::ffi::OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let parser = NonEmptyStringValueParser::new();
        let val = parser.parse_ref(cmd, arg, value)?;
        let res = match val.parse::<i32>() {
            Ok(n) => Mode::try_from(n),
            Err(_) => val.parse::<Mode>(),
        };
        res.map_err(|_| {
            let names: Vec<&str> = Mode::ALL.iter().map(|m| m.name()).collect();
            simple_error(format!(
                "invalid mode {}, expected one of {}",
                val,
                names.join(", ")
            ))
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("allow", Mode::Allowed)]
    #[case("1", Mode::Ignored)]
    #[case("foreground", Mode::Foreground)]
    fn test_parse_mode(#[case] value: &str, #[case] expected: Mode) {
        let cmd = clap::Command::new("test");
        let mode = ModeValueParser
            .parse_ref(&cmd, None, std::ffi::OsStr::new(value))
            .unwrap();
        assert_eq!(mode, expected);
    }

    #[test]
    fn test_parse_bad_mode() {
        let cmd = clap::Command::new("test");
        assert!(ModeValueParser
            .parse_ref(&cmd, None, std::ffi::OsStr::new("5"))
            .is_err());
    }
}

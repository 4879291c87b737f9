use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const MODE_ALLOWED: i32 = 0;
pub const MODE_IGNORED: i32 = 1;
pub const MODE_ERRORED: i32 = 2;
pub const MODE_DEFAULT: i32 = 3;
pub const MODE_FOREGROUND: i32 = 4;

/// Names indexed by the numeric mode
pub const MODE_NAMES: [&str; 5] = ["allow", "ignore", "deny", "default", "foreground"];

/// The decision for an op. The numeric values cross process boundaries and
/// must never be renumbered.
#[repr(i32)]
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum Mode {
    Allowed = MODE_ALLOWED,
    Ignored = MODE_IGNORED,
    Errored = MODE_ERRORED,
    Default = MODE_DEFAULT,
    Foreground = MODE_FOREGROUND,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Allowed,
        Mode::Ignored,
        Mode::Errored,
        Mode::Default,
        Mode::Foreground,
    ];

    #[inline]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        MODE_NAMES[self as usize]
    }
}

/// Human readable name for a numeric mode, never failing on values from a
/// newer authority
pub fn mode_name(mode: i32) -> String {
    match usize::try_from(mode).ok().and_then(|i| MODE_NAMES.get(i)) {
        Some(name) => String::from(*name),
        None => format!("mode={}", mode),
    }
}

impl Serialize for Mode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.as_i32())
    }
}

impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = i32::deserialize(deserializer)?;
        Mode::try_from(value).map_err(serde::de::Error::custom)
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Mode> for i32 {
    fn from(value: Mode) -> Self {
        value.as_i32()
    }
}

impl TryFrom<i32> for Mode {
    type Error = crate::Error;

    fn try_from(value: i32) -> crate::Result<Self> {
        Ok(match value {
            MODE_ALLOWED => Mode::Allowed,
            MODE_IGNORED => Mode::Ignored,
            MODE_ERRORED => Mode::Errored,
            MODE_DEFAULT => Mode::Default,
            MODE_FOREGROUND => Mode::Foreground,
            _ => return Err(crate::Error::NotFound(mode_name(value))),
        })
    }
}

impl FromStr for Mode {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Mode::ALL
            .iter()
            .find(|m| m.name() == s)
            .copied()
            .ok_or_else(|| crate::Error::NotFound(format!("mode `{}`", s)))
    }
}

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::Uid;

bitflags! {
    /// Categories an installed app can belong to. An app may carry several.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AppFlags: u32 {
        const USER = 1 << 0;
        const SYSTEM = 1 << 1;
        const SYSTEM_UID = 1 << 2;
        const SYSTEM_MEDIA = 1 << 3;
        const SYSTEM_PHONE = 1 << 4;
        const WEB_VIEW_PROVIDER = 1 << 5;
        const WHITE_LISTED = 1 << 6;
    }
}

impl AppFlags {
    /// Category order used when collecting apps for a mask
    pub const CATEGORY_ORDER: [AppFlags; 7] = [
        AppFlags::SYSTEM,
        AppFlags::SYSTEM_MEDIA,
        AppFlags::SYSTEM_PHONE,
        AppFlags::SYSTEM_UID,
        AppFlags::USER,
        AppFlags::WEB_VIEW_PROVIDER,
        AppFlags::WHITE_LISTED,
    ];

    pub fn category_name(self) -> &'static str {
        if self == AppFlags::USER {
            "user"
        } else if self == AppFlags::SYSTEM {
            "system"
        } else if self == AppFlags::SYSTEM_UID {
            "system-uid"
        } else if self == AppFlags::SYSTEM_MEDIA {
            "system-media"
        } else if self == AppFlags::SYSTEM_PHONE {
            "system-phone"
        } else if self == AppFlags::WEB_VIEW_PROVIDER {
            "web-view-provider"
        } else if self == AppFlags::WHITE_LISTED {
            "whitelisted"
        } else {
            "mixed"
        }
    }
}

impl Display for AppFlags {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = AppFlags::CATEGORY_ORDER
            .iter()
            .filter(|it| self.contains(**it))
            .map(|it| it.category_name())
            .collect();
        write!(f, "{}", names.join(","))
    }
}

impl FromStr for AppFlags {
    type Err = crate::Error;

    /// Parse a comma separated list of category names, `all` selects every
    /// category
    fn from_str(s: &str) -> crate::Result<Self> {
        let mut flags = AppFlags::empty();
        for part in s.split(',').map(str::trim).filter(|it| !it.is_empty()) {
            if part == "all" {
                flags |= AppFlags::all();
                continue;
            }
            let flag = AppFlags::CATEGORY_ORDER
                .iter()
                .find(|it| it.category_name() == part)
                .ok_or_else(|| crate::Error::NotFound(format!("app category {}", part)))?;
            flags |= *flag;
        }
        Ok(flags)
    }
}

impl Serialize for AppFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for AppFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(AppFlags::from_bits_truncate(u32::deserialize(deserializer)?))
    }
}

/// An installed application as reported by the package inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub pkg_name: String,
    pub uid: Uid,
    pub flags: AppFlags,
    pub label: String,
}

impl AppInfo {
    pub fn new<S: Into<String>>(pkg_name: S, uid: Uid, flags: AppFlags) -> Self {
        let pkg_name = pkg_name.into();
        Self {
            label: pkg_name.clone(),
            pkg_name,
            uid,
            flags,
        }
    }

    pub fn with_label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = label.into();
        self
    }

    #[inline]
    pub fn is_a(&self, category: AppFlags) -> bool {
        self.flags.intersects(category)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_flags_parse_and_display() {
        let flags: AppFlags = "system, whitelisted".parse().unwrap();
        assert_eq!(flags, AppFlags::SYSTEM | AppFlags::WHITE_LISTED);
        assert_eq!(flags.to_string(), "system,whitelisted");
        assert_eq!("all".parse::<AppFlags>().unwrap(), AppFlags::all());
        assert!("vendor".parse::<AppFlags>().is_err());
    }

    #[test]
    fn test_flag_bits() {
        assert_eq!(AppFlags::USER.bits(), 1);
        assert_eq!(AppFlags::SYSTEM.bits(), 2);
        assert_eq!(AppFlags::WHITE_LISTED.bits(), 64);
        assert_eq!(serde_json::to_string(&AppFlags::SYSTEM_PHONE).unwrap(), "16");
    }
}

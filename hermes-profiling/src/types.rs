use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::impl_str_serde;

/// Correlation key between a sampling session and the transaction it was taken for.
///
/// Formats as 32 lowercase hex digits without dashes, the same way event identifiers are sent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProfileId(pub Uuid);

impl ProfileId {
    /// Creates a new random profile id.
    #[inline]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Tests if the UUID is nil.
    #[inline]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for ProfileId {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_simple())
    }
}

impl FromStr for ProfileId {
    type Err = uuid::Error;

    fn from_str(uuid_str: &str) -> Result<Self, Self::Err> {
        uuid_str.parse().map(ProfileId)
    }
}

impl_str_serde!(ProfileId, "a profile identifier");

/// A memory address, such as an instruction address or the load address of an image.
///
/// Native profilers send addresses as zero-padded 64-bit hex strings, and they are written back
/// in that form.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Addr(pub u64);

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl FromStr for Addr {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16).map(Addr),
            None => s.parse().map(Addr),
        }
    }
}

impl_str_serde!(Addr, "a hex address");

/// The mobile platform the application runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// iOS, with an optional Apple native profile.
    #[default]
    Ios,
    /// Android, with an optional Android trace.
    Android,
}

impl Platform {
    /// Returns the URL of the JavaScript bundle shipped with the application.
    pub fn default_bundle_name(self) -> &'static str {
        match self {
            Platform::Ios => "app:///main.jsbundle",
            Platform::Android => "app:///index.android.bundle",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_id_format() {
        let id: ProfileId = "A2669CD2-C7E0-47ED-8298-4AAF9666A6B6".parse().unwrap();
        assert_eq!(id.to_string(), "a2669cd2c7e047ed82984aaf9666a6b6");
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            r#""a2669cd2c7e047ed82984aaf9666a6b6""#
        );
    }

    #[test]
    fn test_new_profile_ids_differ() {
        assert_ne!(ProfileId::new(), ProfileId::new());
        assert!(!ProfileId::new().is_nil());
    }

    #[test]
    fn test_addr_keeps_padding() {
        let addr: Addr = serde_json::from_str(r#""0x0000000000000003""#).unwrap();
        assert_eq!(addr, Addr(3));
        assert_eq!(
            serde_json::to_string(&addr).unwrap(),
            r#""0x0000000000000003""#
        );
    }

    #[test]
    fn test_addr_decimal() {
        assert_eq!("4096".parse::<Addr>().unwrap(), Addr(0x1000));
    }

    #[test]
    fn test_bundle_names() {
        assert_eq!(Platform::Ios.default_bundle_name(), "app:///main.jsbundle");
        assert_eq!(
            Platform::Android.default_bundle_name(),
            "app:///index.android.bundle"
        );
    }
}

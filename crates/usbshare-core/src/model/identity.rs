// ── Hardware identity ──
//
// A `UsbId` is the vendor/product pair that survives re-plugging and
// moving a device to another port. It is the only key the ignore list
// uses; bus ids are positional and never identify a device across time.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Placeholder used for both halves of an identity that could not be
/// extracted from the instance id.
const UNKNOWN_PART: &str = "-";

fn instance_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)USB\\VID_(\w{4})&PID_(\w{4})").expect("valid instance id regex")
    })
}

fn persisted_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\w{4}):(\w{4})$").expect("valid VID:PID regex"))
}

/// Vendor/product identity of a USB device, normalized to lowercase.
///
/// The unknown identity (`-:-`) marks devices whose instance id did not
/// carry a `VID_xxxx&PID_xxxx` pair. It is never persisted and never
/// matches a real identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UsbId {
    vendor: String,
    product: String,
}

impl UsbId {
    /// Build an identity from two 4-character word tokens.
    ///
    /// Returns `None` when either half is not exactly four word characters.
    pub fn new(vendor: impl AsRef<str>, product: impl AsRef<str>) -> Option<Self> {
        let (vendor, product) = (vendor.as_ref(), product.as_ref());
        if is_token(vendor) && is_token(product) {
            Some(Self {
                vendor: vendor.to_lowercase(),
                product: product.to_lowercase(),
            })
        } else {
            None
        }
    }

    /// The `-:-` sentinel.
    pub fn unknown() -> Self {
        Self {
            vendor: UNKNOWN_PART.to_owned(),
            product: UNKNOWN_PART.to_owned(),
        }
    }

    /// Extract the identity from a Windows-style instance id such as
    /// `USB\VID_0403&PID_6001\A901O7VP`.
    ///
    /// The first match wins; anything without a match yields [`UsbId::unknown`].
    pub fn from_instance_id(instance_id: Option<&str>) -> Self {
        instance_id
            .and_then(|id| instance_id_regex().captures(id))
            .and_then(|caps| Self::new(caps.get(1)?.as_str(), caps.get(2)?.as_str()))
            .unwrap_or_else(Self::unknown)
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    /// `false` for the `-:-` sentinel.
    pub fn is_known(&self) -> bool {
        self.vendor != UNKNOWN_PART && self.product != UNKNOWN_PART
    }
}

fn is_token(s: &str) -> bool {
    s.chars().count() == 4 && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

impl Default for UsbId {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for UsbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.vendor, self.product)
    }
}

/// Error returned when a string is not a `VID:PID` pair.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected VID:PID (two 4-character tokens), got {input:?}")]
pub struct ParseUsbIdError {
    pub input: String,
}

impl FromStr for UsbId {
    type Err = ParseUsbIdError;

    /// Parse the persisted `vvvv:pppp` form. Surrounding whitespace is
    /// ignored; the sentinel is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseUsbIdError {
            input: s.to_owned(),
        };
        let caps = persisted_regex().captures(s.trim()).ok_or_else(err)?;
        match (caps.get(1), caps.get(2)) {
            (Some(vendor), Some(product)) => {
                Self::new(vendor.as_str(), product.as_str()).ok_or_else(err)
            }
            _ => Err(err()),
        }
    }
}

impl Serialize for UsbId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UsbId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

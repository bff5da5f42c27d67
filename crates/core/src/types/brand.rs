//! Storefront brand identifier.
//!
//! Craftline operates two retail brands, each with its own category
//! hierarchy: Indikriti (handcrafted home and lifestyle goods) and
//! Winsome Lane (apparel). Brand-scoped data carries this enum rather
//! than a free-form string so the two trees can never be mixed up.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a brand slug is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown brand: {0:?} (expected \"indikriti\" or \"winsome-lane\")")]
pub struct BrandParseError(pub String);

/// One of the Craftline storefront brands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Brand {
    /// Indikriti - handcrafted home and lifestyle goods.
    Indikriti,
    /// Winsome Lane - apparel.
    WinsomeLane,
}

impl Brand {
    /// All brands, in display order.
    pub const ALL: [Self; 2] = [Self::Indikriti, Self::WinsomeLane];

    /// URL/database slug for the brand.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Indikriti => "indikriti",
            Self::WinsomeLane => "winsome-lane",
        }
    }

    /// Human-readable brand name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Indikriti => "Indikriti",
            Self::WinsomeLane => "Winsome Lane",
        }
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Brand {
    type Err = BrandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "indikriti" => Ok(Self::Indikriti),
            "winsome-lane" => Ok(Self::WinsomeLane),
            other => Err(BrandParseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_slug_roundtrip() {
        for brand in Brand::ALL {
            let parsed: Brand = brand.as_str().parse().expect("valid slug");
            assert_eq!(parsed, brand);
        }
    }

    #[test]
    fn test_brand_parse_rejects_unknown() {
        let err = "acme".parse::<Brand>().expect_err("unknown brand");
        assert_eq!(err.0, "acme");
    }

    #[test]
    fn test_brand_serde_kebab_case() {
        let json = serde_json::to_string(&Brand::WinsomeLane).expect("serialize");
        assert_eq!(json, "\"winsome-lane\"");

        let back: Brand = serde_json::from_str("\"indikriti\"").expect("deserialize");
        assert_eq!(back, Brand::Indikriti);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Brand::Indikriti.display_name(), "Indikriti");
        assert_eq!(Brand::WinsomeLane.display_name(), "Winsome Lane");
    }
}

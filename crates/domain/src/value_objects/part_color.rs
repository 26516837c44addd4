//! PartColor - Finish of a catalogued part

use crate::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed palette of part finishes used on the line
///
/// Serialized as the display name, which is also what the hosted table stores
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartColor {
    #[default]
    #[serde(rename = "Hamilton White")]
    HamiltonWhite,
    #[serde(rename = "Sun Gold Black")]
    SunGoldBlack,
    #[serde(rename = "Atlantis Blue")]
    AtlantisBlue,
    #[serde(rename = "Ayers Grey")]
    AyersGrey,
    #[serde(rename = "KU Grey")]
    KuGrey,
    #[serde(rename = "Nebula Grey")]
    NebulaGrey,
    #[serde(rename = "Incolor")]
    Incolor,
}

impl PartColor {
    pub const ALL: [PartColor; 7] = [
        PartColor::HamiltonWhite,
        PartColor::SunGoldBlack,
        PartColor::AtlantisBlue,
        PartColor::AyersGrey,
        PartColor::KuGrey,
        PartColor::NebulaGrey,
        PartColor::Incolor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartColor::HamiltonWhite => "Hamilton White",
            PartColor::SunGoldBlack => "Sun Gold Black",
            PartColor::AtlantisBlue => "Atlantis Blue",
            PartColor::AyersGrey => "Ayers Grey",
            PartColor::KuGrey => "KU Grey",
            PartColor::NebulaGrey => "Nebula Grey",
            PartColor::Incolor => "Incolor",
        }
    }
}

impl fmt::Display for PartColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartColor {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        let wanted = s.trim();
        PartColor::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::UnknownColor(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("ku grey".parse::<PartColor>().unwrap(), PartColor::KuGrey);
        assert_eq!(
            "  Atlantis Blue ".parse::<PartColor>().unwrap(),
            PartColor::AtlantisBlue
        );
        assert!("Purple".parse::<PartColor>().is_err());
    }

    #[test]
    fn test_serializes_as_display_name() {
        let json = serde_json::to_string(&PartColor::SunGoldBlack).unwrap();
        assert_eq!(json, "\"Sun Gold Black\"");
        let back: PartColor = serde_json::from_str("\"Incolor\"").unwrap();
        assert_eq!(back, PartColor::Incolor);
    }
}

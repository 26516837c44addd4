//! PartModel - Vehicle model a part fits

use crate::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartModel {
    #[serde(rename = "B01 HEV")]
    B01Hev,
    #[serde(rename = "B01 PHEV19")]
    B01Phev19,
    #[serde(rename = "B01 PHEV35")]
    B01Phev35,
    #[serde(rename = "B03")]
    B03,
    #[serde(rename = "P3012 LOW")]
    P3012Low,
    #[serde(rename = "P3012 MID")]
    P3012Mid,
    #[serde(rename = "P3012 HIGH")]
    P3012High,
    #[serde(rename = "P11")]
    P11,
}

impl PartModel {
    pub const ALL: [PartModel; 8] = [
        PartModel::B01Hev,
        PartModel::B01Phev19,
        PartModel::B01Phev35,
        PartModel::B03,
        PartModel::P3012Low,
        PartModel::P3012Mid,
        PartModel::P3012High,
        PartModel::P11,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartModel::B01Hev => "B01 HEV",
            PartModel::B01Phev19 => "B01 PHEV19",
            PartModel::B01Phev35 => "B01 PHEV35",
            PartModel::B03 => "B03",
            PartModel::P3012Low => "P3012 LOW",
            PartModel::P3012Mid => "P3012 MID",
            PartModel::P3012High => "P3012 HIGH",
            PartModel::P11 => "P11",
        }
    }

    /// Parse a comma separated model list, dropping entries that are not
    /// supported models
    pub fn parse_list(raw: &str) -> Vec<PartModel> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| match s.parse::<PartModel>() {
                Ok(model) => Some(model),
                Err(_) => {
                    tracing::warn!(model = s, "Ignoring unknown part model");
                    None
                }
            })
            .collect()
    }
}

impl fmt::Display for PartModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartModel {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        let wanted = s.trim();
        PartModel::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::UnknownModel(s.to_string()))
    }
}

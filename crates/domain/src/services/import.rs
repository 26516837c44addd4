//! Spreadsheet row mapping for bulk catalog import

use crate::entities::PartDraft;
use crate::value_objects::{PartColor, PartModel};
use serde::Deserialize;
use tracing::warn;

/// One spreadsheet row. Every column is optional; the header names follow
/// the catalog's camelCase field names.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    #[serde(default)]
    pub part_number: Option<String>,
    #[serde(default)]
    pub part_name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub workstation: Option<String>,
    #[serde(default)]
    pub models: Option<String>,
}

impl ImportRow {
    /// Lenient mapping: missing text becomes empty, unknown colors fall back
    /// to the default finish, unknown models are dropped
    pub fn into_draft(self) -> PartDraft {
        let color = match self.color.as_deref().map(str::trim) {
            None | Some("") => PartColor::default(),
            Some(raw) => raw.parse::<PartColor>().unwrap_or_else(|_| {
                warn!(color = raw, "Unknown color in import row, using default");
                PartColor::default()
            }),
        };

        PartDraft {
            part_number: self.part_number.unwrap_or_default().trim().to_string(),
            part_name: self.part_name.unwrap_or_default().trim().to_string(),
            color,
            workstation: self.workstation.unwrap_or_default().trim().to_string(),
            models: self
                .models
                .as_deref()
                .map(PartModel::parse_list)
                .unwrap_or_default(),
        }
    }
}

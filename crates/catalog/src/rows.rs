//! Mapping between `parts` table rows and `PartRecord`

use domain::{PartColor, PartModel, PartRecord, TimestampMs};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One row of the `parts` table (snake_case columns)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartRow {
    pub id: String,
    #[serde(default)]
    pub part_number: Option<String>,
    #[serde(default)]
    pub part_name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub workstation: Option<String>,
    #[serde(default)]
    pub models: Option<Vec<String>>,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    #[serde(default)]
    pub timestamp: Option<TimestampMs>,
}

impl From<&PartRecord> for PartRow {
    fn from(part: &PartRecord) -> Self {
        Self {
            id: part.id.clone(),
            part_number: Some(part.part_number.clone()),
            part_name: Some(part.part_name.clone()),
            color: Some(part.color.as_str().to_string()),
            workstation: Some(part.workstation.clone()),
            models: Some(part.models.iter().map(|m| m.as_str().to_string()).collect()),
            image_urls: Some(part.image_urls.clone()),
            timestamp: Some(part.timestamp),
        }
    }
}

impl PartRow {
    /// Null columns become empty values; unknown colors and models written by
    /// other clients are tolerated
    pub fn into_record(self) -> PartRecord {
        let color = match self.color.as_deref() {
            None | Some("") => PartColor::default(),
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(part_id = %self.id, color = raw, "Unknown color in catalog row");
                PartColor::default()
            }),
        };

        let models = self
            .models
            .unwrap_or_default()
            .iter()
            .filter_map(|raw| match raw.parse::<PartModel>() {
                Ok(model) => Some(model),
                Err(_) => {
                    warn!(part_id = %self.id, model = %raw, "Unknown model in catalog row");
                    None
                }
            })
            .collect();

        PartRecord {
            id: self.id,
            part_number: self.part_number.unwrap_or_default(),
            part_name: self.part_name.unwrap_or_default(),
            color,
            workstation: self.workstation.unwrap_or_default(),
            models,
            image_urls: self.image_urls.unwrap_or_default(),
            timestamp: self.timestamp.unwrap_or_default(),
        }
    }
}

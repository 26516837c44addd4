//! PartRecord - A catalogued physical part
//!
//! Entity with identity (UUID string) and the user-editable draft that
//! creates or edits it.

use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{PartColor, PartModel};
use crate::{now_ms, TimestampMs};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of photo angles accepted in a single submission
pub const MAX_CAPTURE_ANGLES: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartRecord {
    pub id: String,
    pub part_number: String,
    pub part_name: String,
    pub color: PartColor,
    pub workstation: String,
    #[serde(default)]
    pub models: Vec<PartModel>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub timestamp: TimestampMs,
}

/// User-entered fields of a part
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartDraft {
    pub part_number: String,
    pub part_name: String,
    pub color: PartColor,
    pub workstation: String,
    #[serde(default)]
    pub models: Vec<PartModel>,
}

impl PartDraft {
    /// Required fields must be non-blank
    pub fn validate(&self) -> DomainResult<()> {
        if self.part_number.trim().is_empty() {
            return Err(DomainError::MissingField("part_number"));
        }
        if self.part_name.trim().is_empty() {
            return Err(DomainError::MissingField("part_name"));
        }
        if self.workstation.trim().is_empty() {
            return Err(DomainError::MissingField("workstation"));
        }
        Ok(())
    }

    /// Add the model when absent, remove it when present
    pub fn toggle_model(&mut self, model: PartModel) {
        if let Some(pos) = self.models.iter().position(|m| *m == model) {
            self.models.remove(pos);
        } else {
            self.models.push(model);
        }
    }
}

impl PartRecord {
    /// New record from a validated draft and freshly captured photos
    pub fn from_draft(draft: PartDraft, photos: Vec<String>) -> DomainResult<Self> {
        draft.validate()?;
        check_photo_count(photos.len())?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            part_number: draft.part_number.trim().to_string(),
            part_name: draft.part_name.trim().to_string(),
            color: draft.color,
            workstation: draft.workstation.trim().to_string(),
            models: draft.models,
            image_urls: photos,
            timestamp: now_ms(),
        })
    }

    /// Record built from an import row; photos are attached later
    pub fn imported(draft: PartDraft) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            part_number: draft.part_number,
            part_name: draft.part_name,
            color: draft.color,
            workstation: draft.workstation,
            models: draft.models,
            image_urls: Vec::new(),
            timestamp: now_ms(),
        }
    }

    /// Edit: replace editable fields, append new photos after the stored ones.
    /// Identity and creation timestamp are kept.
    pub fn apply_draft(&mut self, draft: PartDraft, extra_photos: Vec<String>) -> DomainResult<()> {
        draft.validate()?;
        check_photo_count(extra_photos.len())?;

        self.part_number = draft.part_number.trim().to_string();
        self.part_name = draft.part_name.trim().to_string();
        self.color = draft.color;
        self.workstation = draft.workstation.trim().to_string();
        self.models = draft.models;
        self.image_urls.extend(extra_photos);
        Ok(())
    }

    pub fn add_photo(&mut self, photo: String) {
        self.image_urls.push(photo);
    }

    pub fn has_photos(&self) -> bool {
        self.image_urls.iter().any(|url| !url.trim().is_empty())
    }

    /// First stored photo, used as the recognition reference
    pub fn first_photo(&self) -> Option<&str> {
        self.image_urls
            .iter()
            .map(String::as_str)
            .find(|url| !url.trim().is_empty())
    }

    pub fn to_draft(&self) -> PartDraft {
        PartDraft {
            part_number: self.part_number.clone(),
            part_name: self.part_name.clone(),
            color: self.color,
            workstation: self.workstation.clone(),
            models: self.models.clone(),
        }
    }

    /// Short human label used in prompts and listings
    pub fn label(&self) -> String {
        format!("{} ({})", self.part_name, self.part_number)
    }
}

fn check_photo_count(count: usize) -> DomainResult<()> {
    if count > MAX_CAPTURE_ANGLES {
        return Err(DomainError::TooManyPhotos {
            count,
            max_allowed: MAX_CAPTURE_ANGLES,
        });
    }
    Ok(())
}

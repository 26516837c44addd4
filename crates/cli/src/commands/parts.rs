//! Catalog management subcommands

use crate::context::{load_photo, load_photos, AppContext};
use crate::progress::ProgressType;
use anyhow::{Context, Result};
use catalog::import_csv;
use clap::Args;
use colored::Colorize;
use domain::{search_parts, DomainError, PartColor, PartDraft, PartModel, PartRecord, PartRepository};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Args)]
pub struct ListCommand {
    /// Filter by part number or name (case-insensitive)
    #[arg(short, long)]
    search: Option<String>,

    /// Print the records as JSON
    #[arg(long)]
    json: bool,
}

impl ListCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let catalog = ctx.catalog()?;
        let spinner = ProgressType::Catalog.create_spinner("Loading catalog...");
        let parts = catalog.list_parts().await?;
        spinner.finish_and_clear();

        let found = search_parts(&parts, self.search.as_deref().unwrap_or(""));

        if self.json {
            println!("{}", serde_json::to_string_pretty(&found)?);
            return Ok(());
        }

        if found.is_empty() {
            println!("{} No parts found", "ℹ".blue());
            return Ok(());
        }

        println!(
            "{} {}",
            "✓".green(),
            format!("{} of {} parts", found.len(), parts.len()).bold()
        );
        for part in found {
            print_part(part);
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct AddCommand {
    #[arg(long)]
    number: String,

    #[arg(long)]
    name: String,

    #[arg(long)]
    workstation: String,

    #[arg(long, default_value_t = PartColor::default())]
    color: PartColor,

    /// Compatible vehicle model, repeatable
    #[arg(long = "model")]
    models: Vec<PartModel>,

    /// Photo file, repeatable
    #[arg(long = "photo")]
    photos: Vec<PathBuf>,
}

impl AddCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let catalog = ctx.catalog()?;
        let draft = PartDraft {
            part_number: self.number,
            part_name: self.name,
            color: self.color,
            workstation: self.workstation,
            models: self.models,
        };
        draft.validate()?;

        let photos = load_photos(&self.photos).await?;
        let record = PartRecord::from_draft(draft, photos)?;

        let spinner = ProgressType::Upload.create_spinner("Saving part...");
        let saved = catalog.save_part(&record).await?;
        spinner.finish_success("Part saved");

        info!(id = %saved.id, photos = saved.image_urls.len(), "Part created");
        print_part(&saved);
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct EditCommand {
    id: String,

    #[arg(long)]
    number: Option<String>,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    workstation: Option<String>,

    #[arg(long)]
    color: Option<PartColor>,

    /// Replaces the model list when given, repeatable
    #[arg(long = "model")]
    models: Vec<PartModel>,

    /// Photo appended after the stored ones, repeatable
    #[arg(long = "photo")]
    photos: Vec<PathBuf>,
}

impl EditCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let catalog = ctx.catalog()?;
        let mut part = catalog
            .find_part(&self.id)
            .await?
            .ok_or_else(|| DomainError::PartNotFound(self.id.clone()))?;

        let mut draft = part.to_draft();
        if let Some(number) = self.number {
            draft.part_number = number;
        }
        if let Some(name) = self.name {
            draft.part_name = name;
        }
        if let Some(workstation) = self.workstation {
            draft.workstation = workstation;
        }
        if let Some(color) = self.color {
            draft.color = color;
        }
        if !self.models.is_empty() {
            draft.models = self.models;
        }
        draft.validate()?;

        let photos = load_photos(&self.photos).await?;
        part.apply_draft(draft, photos)?;

        let spinner = ProgressType::Upload.create_spinner("Saving changes...");
        let saved = catalog.save_part(&part).await?;
        spinner.finish_success("Part updated");

        print_part(&saved);
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct AddPhotoCommand {
    id: String,
    file: PathBuf,
}

impl AddPhotoCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let catalog = ctx.catalog()?;
        let mut part = catalog
            .find_part(&self.id)
            .await?
            .ok_or_else(|| DomainError::PartNotFound(self.id.clone()))?;

        part.add_photo(load_photo(&self.file).await?);

        let spinner = ProgressType::Upload.create_spinner("Uploading photo...");
        let saved = catalog.save_part(&part).await?;
        spinner.finish_success(&format!(
            "{} now has {} photo(s)",
            saved.label(),
            saved.image_urls.len()
        ));
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct DeleteCommand {
    id: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

impl DeleteCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let catalog = ctx.catalog()?;
        let part = catalog
            .find_part(&self.id)
            .await?
            .ok_or_else(|| DomainError::PartNotFound(self.id.clone()))?;

        if !self.yes && !confirm(&format!("Delete {}?", part.label()))? {
            println!("{} Cancelled", "ℹ".blue());
            return Ok(());
        }

        catalog.delete_part(&part.id).await?;
        println!("{} Deleted {}", "✓".green(), part.label().bold());
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct ImportCommand {
    /// CSV with columns partNumber, partName, color, workstation, models
    file: PathBuf,
}

impl ImportCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let catalog = ctx.catalog()?;
        let file = std::fs::File::open(&self.file)
            .with_context(|| format!("Failed to open {}", self.file.display()))?;

        let spinner = ProgressType::Catalog.create_spinner("Importing parts...");
        match import_csv(file, &catalog).await {
            Ok(count) => {
                spinner.finish_success(&format!("Imported {count} part(s)"));
                Ok(())
            }
            Err(e) => {
                spinner.finish_error("Import failed");
                Err(e.into())
            }
        }
    }
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} {} [y/N] ", "?".yellow().bold(), question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub fn print_part(part: &PartRecord) {
    let models = part
        .models
        .iter()
        .map(PartModel::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    println!(
        "- {} {} [{}]",
        part.part_number.bold(),
        part.part_name,
        part.color.as_str().dimmed()
    );
    println!("    id: {}", part.id.dimmed());
    println!("    workstation: {}", part.workstation);
    if !models.is_empty() {
        println!("    models: {models}");
    }
    println!("    photos: {}", part.image_urls.len());
}

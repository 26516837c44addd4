use crate::context::AppContext;
use crate::progress::ProgressType;
use anyhow::Result;
use catalog::BucketStatus;
use clap::Args;
use colored::Colorize;

#[derive(Debug, Args)]
pub struct InitStorageCommand;

impl InitStorageCommand {
    /// Never fails on bucket problems; the bucket can still be created by hand
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let catalog = ctx.catalog()?;
        let spinner = ProgressType::Catalog.create_spinner("Checking storage bucket...");

        match catalog.ensure_bucket().await {
            BucketStatus::Exists => {
                spinner.finish_success(&format!("Bucket '{}' already exists", catalog.bucket()))
            }
            BucketStatus::Created => {
                spinner.finish_success(&format!("Bucket '{}' created", catalog.bucket()))
            }
            BucketStatus::Unavailable(reason) => {
                spinner.finish_error("Bucket could not be verified");
                println!("   {}", reason.dimmed());
                println!(
                    "   {} create a public bucket named '{}' in the Supabase dashboard",
                    "→".yellow(),
                    catalog.bucket()
                );
            }
        }
        Ok(())
    }
}

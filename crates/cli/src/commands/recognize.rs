use crate::context::{AppContext, CREDENTIAL_HINT};
use crate::progress::ProgressType;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use domain::{resolve_matches, ResolvedMatch};
use recognition::{RecognitionReport, Recognizer};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct RecognizeCommand {
    /// Photo of the part to identify (JPEG or PNG)
    image: PathBuf,

    /// Print the matches as JSON
    #[arg(long)]
    json: bool,
}

impl RecognizeCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let target = tokio::fs::read(&self.image)
            .await
            .with_context(|| format!("Failed to read image {}", self.image.display()))?;

        let catalog = ctx.catalog()?;
        let spinner = ProgressType::Catalog.create_spinner("Loading catalog...");
        let parts = catalog.list_parts().await?;
        spinner.finish_and_clear();

        let recognizer = Recognizer::with_http_images(Arc::new(ctx.gemini()?), &ctx.config)?;
        let spinner = ProgressType::Analysis.create_spinner("Comparing with reference photos...");

        let report = match recognizer.analyze(&target, &parts).await {
            Ok(report) => {
                spinner.finish_and_clear();
                report
            }
            Err(e) => {
                spinner.finish_error("Analysis failed");
                if e.is_credential() {
                    eprintln!("{} {}", "→".yellow(), CREDENTIAL_HINT);
                }
                return Err(e.into());
            }
        };

        let matches = resolve_matches(&report.result, &parts);
        if self.json {
            println!("{}", serde_json::to_string_pretty(&report_json(&report, &matches))?);
        } else {
            print_report(&report, &matches);
        }
        Ok(())
    }
}

fn report_json(report: &RecognitionReport, matches: &[ResolvedMatch<'_>]) -> serde_json::Value {
    json!({
        "detectedFeatures": report.result.detected_features,
        "referencesSent": report.references_sent,
        "matches": matches
            .iter()
            .map(|m| json!({
                "id": m.part.id,
                "partNumber": m.part.part_number,
                "partName": m.part.part_name,
                "workstation": m.part.workstation,
                "score": m.score,
                "reason": m.reason,
                "highConfidence": m.is_high_confidence(),
            }))
            .collect::<Vec<_>>(),
    })
}

fn print_report(report: &RecognitionReport, matches: &[ResolvedMatch<'_>]) {
    println!("{} {}", "Detected:".bold(), report.result.detected_features);
    println!(
        "{}",
        format!("Compared against {} reference photo(s)", report.references_sent).dimmed()
    );
    println!();

    if matches.is_empty() {
        println!("{} No matching part found in the catalog", "✗".red());
        return;
    }

    for m in matches {
        let score = format!("{:>3.0}%", m.score);
        let score = if m.is_high_confidence() {
            score.green().bold()
        } else {
            score.yellow()
        };
        let badge = if m.is_high_confidence() {
            " HIGH CONFIDENCE".green().bold().to_string()
        } else {
            String::new()
        };

        println!(
            "{} {} {}{}",
            score,
            m.part.part_number.bold(),
            m.part.part_name,
            badge
        );
        println!("     workstation: {}", m.part.workstation);
        println!("     {}", m.reason.dimmed());
    }
}

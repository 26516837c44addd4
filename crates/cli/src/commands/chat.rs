use crate::context::{AppContext, CREDENTIAL_HINT};
use crate::progress::ProgressType;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use console::style;
use llm::{catalog_summary, ChatSession, RetryConfig};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Args)]
pub struct ChatCommand {
    /// Single question; starts an interactive session when omitted
    message: Option<String>,
}

impl ChatCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let parts = if ctx.config.supabase_configured() {
            match ctx.catalog()?.list_parts().await {
                Ok(parts) => parts,
                Err(e) => {
                    warn!(error = %e, "Catalog unavailable, chatting without it");
                    Vec::new()
                }
            }
        } else {
            warn!("Cloud catalog not configured, chatting without it");
            Vec::new()
        };

        let client = ctx.gemini()?.with_retry_config(
            RetryConfig::conservative().with_max_retries(ctx.config.gemini.chat_retries),
        );
        let mut session = ChatSession::new(
            Arc::new(client),
            ctx.config.gemini.chat_model.clone(),
            &catalog_summary(&parts),
        )
        .with_thinking_budget(ctx.config.gemini.thinking_budget);

        match self.message {
            Some(message) => {
                if let Some(reply) = ask(&mut session, &message).await? {
                    println!("{reply}");
                }
                Ok(())
            }
            None => run_interactive_chat(&mut session).await,
        }
    }
}

async fn ask(session: &mut ChatSession, message: &str) -> Result<Option<String>> {
    let spinner = ProgressType::Assistant.create_spinner("Thinking...");
    match session.send(message).await {
        Ok(reply) => {
            spinner.finish_and_clear();
            Ok(reply)
        }
        Err(e) => {
            spinner.finish_error("Assistant unavailable");
            if e.is_credential_error() {
                eprintln!("{} {}", "→".yellow(), CREDENTIAL_HINT);
            }
            Err(e.into())
        }
    }
}

async fn run_interactive_chat(session: &mut ChatSession) -> Result<()> {
    println!(
        "{} {}",
        style("[AIdentify]").cyan().bold(),
        style("Ask about parts, workstations or vehicle models.").bold()
    );
    println!("{}", style("Type 'exit' or 'quit' to leave.").dim());
    println!();

    loop {
        print!("{} ", style("You:").green().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        match ask(session, input).await {
            Ok(Some(reply)) => println!("{} {}\n", style("Assistant:").blue().bold(), reply),
            Ok(None) => {}
            // The failed turn was rolled back; keep the session going
            Err(e) => eprintln!("{} {:#}\n", "✗".red(), e),
        }
    }

    println!("{}", style("Bye!").dim());
    Ok(())
}

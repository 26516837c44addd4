//! Multi-turn catalog assistant

use crate::error::GeminiResult;
use crate::providers::{Content, GenerateContentRequest, GenerationConfig, GenerativeModel, Part};
use domain::PartRecord;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_THINKING_BUDGET: u32 = 16384;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    fn to_content(&self) -> Content {
        let parts = vec![Part::text(self.text.clone())];
        match self.role {
            ChatRole::User => Content::user(parts),
            ChatRole::Model => Content::model(parts),
        }
    }
}

/// JSON array of `"name (number)"` labels handed to the assistant as context
pub fn catalog_summary(parts: &[PartRecord]) -> String {
    let labels: Vec<String> = parts
        .iter()
        .map(|p| format!("{} ({})", p.part_name, p.part_number))
        .collect();
    serde_json::to_string(&labels).unwrap_or_else(|_| "[]".to_string())
}

pub struct ChatSession {
    model: Arc<dyn GenerativeModel>,
    model_name: String,
    system_instruction: String,
    thinking_budget: Option<u32>,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        model_name: impl Into<String>,
        catalog_summary: &str,
    ) -> Self {
        Self {
            model,
            model_name: model_name.into(),
            system_instruction: format!(
                "You are the AIdentify Assistant. Help with industrial information about \
                 automotive parts, assembly workstations and vehicle models. \
                 Catalog parts: {catalog_summary}"
            ),
            thinking_budget: Some(DEFAULT_THINKING_BUDGET),
            history: Vec::new(),
        }
    }

    /// `0` disables thinking
    pub fn with_thinking_budget(mut self, budget: u32) -> Self {
        self.thinking_budget = (budget > 0).then_some(budget);
        self
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Send one user turn with the full history.
    ///
    /// Blank input is ignored and yields `None`. On failure the user turn is
    /// dropped again so the history only holds completed exchanges.
    pub async fn send(&mut self, message: &str) -> GeminiResult<Option<String>> {
        let message = message.trim();
        if message.is_empty() {
            return Ok(None);
        }

        self.history.push(ChatMessage {
            role: ChatRole::User,
            text: message.to_string(),
        });

        let mut config = GenerationConfig::default();
        if let Some(budget) = self.thinking_budget {
            config = config.with_thinking_budget(budget);
        }
        let request = GenerateContentRequest {
            contents: self.history.iter().map(ChatMessage::to_content).collect(),
            ..Default::default()
        }
        .with_system_instruction(self.system_instruction.clone())
        .with_generation_config(config);

        debug!(turns = self.history.len(), model = %self.model_name, "Sending chat turn");

        match self.model.generate_text(&self.model_name, &request).await {
            Ok(reply) => {
                self.history.push(ChatMessage {
                    role: ChatRole::Model,
                    text: reply.clone(),
                });
                Ok(Some(reply))
            }
            Err(e) => {
                warn!(error = %e, "Chat turn failed");
                self.history.pop();
                Err(e)
            }
        }
    }
}

//! Conversational bar lookup
//!
//! One-shot "which bars fit this request" helper: the user's free-text
//! message plus a one-line summary of every bar goes to the chat model,
//! which answers with matching record ids and a short reply. Ids that do
//! not exist in the store are dropped before anything is shown.

use crate::config::AppConfig;
use crate::models::BarRecord;
use crate::services::OpenAiClient;
use crate::store;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// A bar matched by the lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedBar {
    pub id: String,
    pub name: String,
}

/// Outcome of one lookup: the model's reply plus the validated matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskOutcome {
    pub reply: String,
    pub matches: Vec<MatchedBar>,
}

/// The reply shape the model is asked for.
#[derive(Debug, Deserialize)]
struct MatchReply {
    #[serde(default)]
    ids: Vec<String>,
    #[serde(default)]
    reply: String,
}

const SYSTEM_PROMPT: &str = "You help people pick a bar in Stockholm. \
Given a request and the list of known bars, answer with a JSON object \
{\"ids\": [...], \"reply\": \"...\"} where ids are the ids of the bars \
that fit the request (possibly empty) and reply is one or two friendly \
sentences. Use only ids from the list.";

/// Run one conversational lookup against the store.
pub async fn run(config: &AppConfig, store_path: &Path, message: &str) -> Result<AskOutcome> {
    let api_key = config.require_openai_api_key()?;

    let records = store::load_store(store_path)
        .with_context(|| format!("failed to read store {}", store_path.display()))?;

    let client =
        OpenAiClient::new(api_key.to_string()).context("failed to build OpenAI client")?;

    let user_prompt = build_user_prompt(message, &records);
    let value = client
        .complete_json(SYSTEM_PROMPT, &user_prompt)
        .await
        .context("bar lookup request failed")?;

    let reply: MatchReply =
        serde_json::from_value(value).context("bar lookup reply had an unexpected shape")?;

    Ok(validate_reply(reply, &records))
}

/// One summary line per bar, in store order.
fn build_user_prompt(message: &str, records: &[BarRecord]) -> String {
    let mut prompt = format!("Request: {}\n\nBars:\n", message);
    for record in records {
        prompt.push_str(&summary_line(record));
        prompt.push('\n');
    }
    prompt
}

fn summary_line(record: &BarRecord) -> String {
    let mut line = format!("- {} | {}", record.id, record.name);

    if let Some(price) = record.price {
        line.push_str(&format!(" | beer {} SEK", price));
    }
    if record.has_dance_floor() {
        line.push_str(" | dance floor");
    }
    if let Some(tags) = &record.tags {
        if !tags.is_empty() {
            let joined = tags.iter().cloned().collect::<Vec<_>>().join(", ");
            line.push_str(&format!(" | tags: {}", joined));
        }
    }
    if let Some(moods) = &record.moods {
        if !moods.is_empty() {
            let joined = moods
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            line.push_str(&format!(" | moods: {}", joined));
        }
    }

    line
}

/// Keep only ids that exist in the store, in the order the model gave
/// them, without duplicates.
fn validate_reply(reply: MatchReply, records: &[BarRecord]) -> AskOutcome {
    let mut matches: Vec<MatchedBar> = Vec::new();

    for id in reply.ids {
        if matches.iter().any(|m| m.id == id) {
            continue;
        }
        match records.iter().find(|r| r.id == id) {
            Some(record) => matches.push(MatchedBar {
                id: record.id.clone(),
                name: record.name.clone(),
            }),
            None => warn!(id = %id, "Lookup reply named an unknown bar id"),
        }
    }

    AskOutcome {
        reply: reply.reply,
        matches,
    }
}

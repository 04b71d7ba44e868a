//! LLM-backed mood classification
//!
//! Asks a chat model which moods fit a bar, given its structured fields
//! and up to a handful of review snippets. The vocabulary is closed:
//! every label the model returns is validated against [`Mood`] and
//! anything else is dropped. An empty or all-invalid reply leaves the
//! record's existing moods alone, so one bad classification run can
//! never wipe earlier results.

use crate::models::{BarRecord, Mood};
use crate::services::openai_client::{OpenAiClient, OpenAiError};
use std::collections::BTreeSet;

/// Mood classifier over the OpenAI chat client.
pub struct MoodClassifier {
    client: OpenAiClient,
}

impl MoodClassifier {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }

    /// Classify one bar into the closed mood vocabulary.
    ///
    /// Unknown labels in the reply are logged and discarded; the
    /// returned set contains valid moods only and may be empty.
    pub async fn classify(
        &self,
        record: &BarRecord,
        reviews: &[String],
    ) -> Result<BTreeSet<Mood>, OpenAiError> {
        let user_prompt = build_user_prompt(record, reviews);
        let reply = self
            .client
            .complete_json(&system_prompt(), &user_prompt)
            .await?;

        let (moods, rejected) = parse_mood_labels(&reply);

        if !rejected.is_empty() {
            tracing::warn!(
                bar = %record.name,
                rejected = ?rejected,
                "Classifier returned labels outside the mood vocabulary"
            );
        }

        tracing::debug!(bar = %record.name, moods = ?moods, "Moods classified");

        Ok(moods)
    }
}

/// Install a classified mood set on a record.
///
/// Returns whether the record changed. An empty set is a failed
/// classification and never overwrites existing moods.
pub fn apply_moods(record: &mut BarRecord, moods: BTreeSet<Mood>) -> bool {
    if moods.is_empty() {
        return false;
    }
    if record.moods.as_ref() == Some(&moods) {
        return false;
    }
    record.moods = Some(moods);
    true
}

/// The system prompt enumerates the vocabulary from [`Mood::ALL`], so
/// prompt and validation can never disagree about what is allowed.
fn system_prompt() -> String {
    let labels = Mood::ALL.map(|m| m.as_str()).join(", ");
    format!(
        "You classify Stockholm bars by the occasions they suit. \
         Reply with a JSON object {{\"moods\": [...]}} where each entry is \
         one of: {labels}. Pick every mood that clearly fits, none that do \
         not. Use only labels from that list."
    )
}

/// Assemble the structured fields and review snippets into one prompt.
fn build_user_prompt(record: &BarRecord, reviews: &[String]) -> String {
    let mut prompt = format!("Bar: {}\n", record.name);

    if let Some(address) = record.resolved_address() {
        prompt.push_str(&format!("Address: {}\n", address));
    }
    if let Some(price) = record.price {
        prompt.push_str(&format!("Cheapest beer: {} SEK\n", price));
    }
    if let Some(dance_floor) = &record.dance_floor {
        prompt.push_str(&format!("Dance floor: {}\n", dance_floor));
    }
    if let Some(notes) = &record.dance_notes {
        prompt.push_str(&format!("Dance notes: {}\n", notes));
    }
    if let Some(tags) = &record.tags {
        if !tags.is_empty() {
            let joined = tags.iter().cloned().collect::<Vec<_>>().join(", ");
            prompt.push_str(&format!("Tags: {}\n", joined));
        }
    }

    if reviews.is_empty() {
        prompt.push_str("No reviews available.\n");
    } else {
        prompt.push_str("Reviews:\n");
        for review in reviews {
            prompt.push_str(&format!("- {}\n", review));
        }
    }

    prompt
}

/// Validate a classification reply against the mood vocabulary.
///
/// Accepts either `{"moods": [...]}` or a bare JSON array. Returns the
/// valid moods and the labels that were rejected.
fn parse_mood_labels(reply: &serde_json::Value) -> (BTreeSet<Mood>, Vec<String>) {
    let labels = reply
        .get("moods")
        .and_then(|v| v.as_array())
        .or_else(|| reply.as_array());

    let mut moods = BTreeSet::new();
    let mut rejected = Vec::new();

    let Some(labels) = labels else {
        return (moods, rejected);
    };

    for label in labels {
        let Some(text) = label.as_str() else {
            rejected.push(label.to_string());
            continue;
        };
        match text.parse::<Mood>() {
            Ok(mood) => {
                moods.insert(mood);
            }
            Err(_) => rejected.push(text.to_string()),
        }
    }

    (moods, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid_labels() {
        let reply = json!({"moods": ["party_night", "group_friends"]});
        let (moods, rejected) = parse_mood_labels(&reply);

        assert_eq!(
            moods,
            BTreeSet::from([Mood::PartyNight, Mood::GroupFriends])
        );
        assert!(rejected.is_empty());
    }

    #[test]
    fn test_parse_bare_array() {
        let reply = json!(["chill_hangout"]);
        let (moods, rejected) = parse_mood_labels(&reply);

        assert_eq!(moods, BTreeSet::from([Mood::ChillHangout]));
        assert!(rejected.is_empty());
    }

    #[test]
    fn test_unknown_labels_are_rejected() {
        let reply = json!({"moods": ["party_night", "romantic", "after_work"]});
        let (moods, rejected) = parse_mood_labels(&reply);

        assert_eq!(moods, BTreeSet::from([Mood::PartyNight]));
        assert_eq!(rejected, vec!["romantic".to_string(), "after_work".to_string()]);
    }

    #[test]
    fn test_non_string_labels_are_rejected() {
        let reply = json!({"moods": ["party_night", 3, null]});
        let (moods, rejected) = parse_mood_labels(&reply);

        assert_eq!(moods, BTreeSet::from([Mood::PartyNight]));
        assert_eq!(rejected.len(), 2);
    }

    #[test]
    fn test_unexpected_shape_yields_nothing() {
        let reply = json!({"labels": ["party_night"]});
        let (moods, rejected) = parse_mood_labels(&reply);

        assert!(moods.is_empty());
        assert!(rejected.is_empty());
    }

    #[test]
    fn test_duplicate_labels_collapse() {
        let reply = json!({"moods": ["party_night", "party_night"]});
        let (moods, _) = parse_mood_labels(&reply);
        assert_eq!(moods.len(), 1);
    }

    #[test]
    fn test_apply_moods_sets_and_reports_change() {
        let mut bar = BarRecord::new("kvarnen", "Kvarnen");
        let moods = BTreeSet::from([Mood::PartyNight]);

        assert!(apply_moods(&mut bar, moods.clone()));
        assert_eq!(bar.moods, Some(moods));
    }

    #[test]
    fn test_apply_empty_set_keeps_prior_moods() {
        let mut bar = BarRecord::new("kvarnen", "Kvarnen");
        bar.moods = Some(BTreeSet::from([Mood::ChillHangout]));

        assert!(!apply_moods(&mut bar, BTreeSet::new()));
        assert_eq!(bar.moods, Some(BTreeSet::from([Mood::ChillHangout])));
    }

    #[test]
    fn test_apply_same_set_is_not_a_change() {
        let mut bar = BarRecord::new("kvarnen", "Kvarnen");
        let moods = BTreeSet::from([Mood::FirstDate, Mood::ChillDate]);
        bar.moods = Some(moods.clone());

        assert!(!apply_moods(&mut bar, moods));
    }

    #[test]
    fn test_user_prompt_includes_structured_fields_and_reviews() {
        let mut bar = BarRecord::new("kvarnen", "Kvarnen");
        bar.address = Some("Tjärhovsgatan 4".to_string());
        bar.price = Some(62);
        bar.dance_floor = Some("yes".to_string());
        bar.tags = Some(BTreeSet::from(["party".to_string()]));

        let reviews = vec!["Classic beer hall, gets loud at night.".to_string()];
        let prompt = build_user_prompt(&bar, &reviews);

        assert!(prompt.contains("Bar: Kvarnen"));
        assert!(prompt.contains("Tjärhovsgatan 4"));
        assert!(prompt.contains("62 SEK"));
        assert!(prompt.contains("Dance floor: yes"));
        assert!(prompt.contains("Tags: party"));
        assert!(prompt.contains("Classic beer hall"));
    }

    #[test]
    fn test_user_prompt_notes_missing_reviews() {
        let bar = BarRecord::new("kvarnen", "Kvarnen");
        let prompt = build_user_prompt(&bar, &[]);
        assert!(prompt.contains("No reviews available."));
    }

    #[test]
    fn test_system_prompt_enumerates_the_whole_vocabulary() {
        let prompt = system_prompt();
        for mood in Mood::ALL {
            assert!(prompt.contains(mood.as_str()), "missing {mood}");
        }
    }
}

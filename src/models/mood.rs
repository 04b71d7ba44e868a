//! Closed mood vocabulary for LLM-assigned classification
//!
//! The map front end filters bars on these exact seven strings, so the
//! vocabulary is closed: any other label coming back from the classifier
//! is discarded at this boundary and never reaches the store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A mood label from the closed classification vocabulary.
///
/// Serializes as snake_case (`first_date`, `party_night`, ...), matching
/// the strings the front end and the classifier prompt use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    FirstDate,
    ThirdDate,
    ChillDate,
    PartyNight,
    ChillHangout,
    GroupFriends,
    CheapNightOut,
}

/// Returned when a label is not part of the closed vocabulary.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown mood label: {0}")]
pub struct UnknownMood(pub String);

impl Mood {
    /// Every mood, in stable order. Used to build the classifier prompt.
    pub const ALL: [Mood; 7] = [
        Mood::FirstDate,
        Mood::ThirdDate,
        Mood::ChillDate,
        Mood::PartyNight,
        Mood::ChillHangout,
        Mood::GroupFriends,
        Mood::CheapNightOut,
    ];

    /// The wire string for this mood.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::FirstDate => "first_date",
            Mood::ThirdDate => "third_date",
            Mood::ChillDate => "chill_date",
            Mood::PartyNight => "party_night",
            Mood::ChillHangout => "chill_hangout",
            Mood::GroupFriends => "group_friends",
            Mood::CheapNightOut => "cheap_night_out",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = UnknownMood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "first_date" => Ok(Mood::FirstDate),
            "third_date" => Ok(Mood::ThirdDate),
            "chill_date" => Ok(Mood::ChillDate),
            "party_night" => Ok(Mood::PartyNight),
            "chill_hangout" => Ok(Mood::ChillHangout),
            "group_friends" => Ok(Mood::GroupFriends),
            "cheap_night_out" => Ok(Mood::CheapNightOut),
            other => Err(UnknownMood(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_all_labels() {
        for mood in Mood::ALL {
            assert_eq!(mood.as_str().parse::<Mood>().unwrap(), mood);
        }
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&Mood::CheapNightOut).unwrap();
        assert_eq!(json, "\"cheap_night_out\"");

        let back: Mood = serde_json::from_str("\"party_night\"").unwrap();
        assert_eq!(back, Mood::PartyNight);
    }

    #[test]
    fn test_unknown_label_rejected() {
        assert!("romantic".parse::<Mood>().is_err());
        assert!("".parse::<Mood>().is_err());
        // Not in the vocabulary even though it looks plausible
        assert!("second_date".parse::<Mood>().is_err());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(" first_date ".parse::<Mood>().unwrap(), Mood::FirstDate);
    }
}

//! Reflective journaling quest.
use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::{
    JOURNAL_BONUS_CHARS, JOURNAL_BONUS_HEARTS, JOURNAL_DAILY_REWARD_CAP, JOURNAL_GOLD_PER_ENTRY,
    JOURNAL_MAX_ENTRIES, JOURNAL_MIN_CHARS,
};
use crate::ledger::{Currency, RewardGrant, RewardLedger, RewardSource};

const MIND_PROMPTS: &[&str] = &[
    "What idea kept coming back to you today?",
    "What did you learn that surprised you?",
    "Which decision are you putting off, and why?",
];
const BODY_PROMPTS: &[&str] = &[
    "How did your body feel when you woke up?",
    "What is one small thing you did for your health today?",
    "When did you feel the most energy today?",
];
const HEART_PROMPTS: &[&str] = &[
    "Who made your day better, and how?",
    "What are you grateful for right now?",
    "Which feeling was strongest today?",
];
const SPIRIT_PROMPTS: &[&str] = &[
    "What gave today meaning?",
    "Where do you want to be a year from now?",
    "What would you tell yourself from a week ago?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalZone {
    #[default]
    Mind,
    Body,
    Heart,
    Spirit,
}

impl JournalZone {
    pub const ALL: [Self; 4] = [Self::Mind, Self::Body, Self::Heart, Self::Spirit];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mind => "mind",
            Self::Body => "body",
            Self::Heart => "heart",
            Self::Spirit => "spirit",
        }
    }

    #[must_use]
    pub const fn prompts(self) -> &'static [&'static str] {
        match self {
            Self::Mind => MIND_PROMPTS,
            Self::Body => BODY_PROMPTS,
            Self::Heart => HEART_PROMPTS,
            Self::Spirit => SPIRIT_PROMPTS,
        }
    }
}

impl fmt::Display for JournalZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JournalZone {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mind" => Ok(Self::Mind),
            "body" => Ok(Self::Body),
            "heart" => Ok(Self::Heart),
            "spirit" => Ok(Self::Spirit),
            _ => Err(()),
        }
    }
}

/// Random prompt for a zone.
pub fn next_prompt<R>(zone: JournalZone, rng: &mut R) -> &'static str
where
    R: Rng + ?Sized,
{
    let prompts = zone.prompts();
    prompts[rng.gen_range(0..prompts.len())]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    pub min_chars: usize,
    pub bonus_chars: usize,
    pub daily_reward_cap: u32,
    pub gold_per_entry: u64,
    pub bonus_hearts: u64,
    pub max_entries: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            min_chars: JOURNAL_MIN_CHARS,
            bonus_chars: JOURNAL_BONUS_CHARS,
            daily_reward_cap: JOURNAL_DAILY_REWARD_CAP,
            gold_per_entry: JOURNAL_GOLD_PER_ENTRY,
            bonus_hearts: JOURNAL_BONUS_HEARTS,
            max_entries: JOURNAL_MAX_ENTRIES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: u64,
    pub prompt: String,
    pub response: String,
    pub zone: JournalZone,
    pub written_at: DateTime<Utc>,
    #[serde(default)]
    pub rewarded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalOutcome {
    pub entry_id: u64,
    pub rewarded: bool,
    pub grants: SmallVec<[RewardGrant; 2]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JournalError {
    #[error("a prompt is required")]
    MissingPrompt,
    #[error("response needs at least {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalState {
    #[serde(default)]
    pub entries: VecDeque<JournalEntry>,
    #[serde(default)]
    pub next_id: u64,
}

impl JournalState {
    #[must_use]
    pub fn rewarded_on(&self, day: NaiveDate) -> u32 {
        let count = self
            .entries
            .iter()
            .filter(|entry| entry.rewarded && entry.written_at.date_naive() == day)
            .count();
        crate::numbers::usize_to_u32(count)
    }

    #[must_use]
    pub fn entries_in(&self, zone: JournalZone) -> Vec<&JournalEntry> {
        self.entries.iter().filter(|e| e.zone == zone).collect()
    }

    /// Store an entry and pay the daily-capped reward.
    ///
    /// # Errors
    ///
    /// Rejects a blank prompt or a trimmed response shorter than
    /// `cfg.min_chars`.
    pub fn submit(
        &mut self,
        prompt: &str,
        response: &str,
        zone: JournalZone,
        ledger: &mut RewardLedger,
        cfg: &JournalConfig,
        at: DateTime<Utc>,
    ) -> Result<JournalOutcome, JournalError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(JournalError::MissingPrompt);
        }
        let response = response.trim();
        let length = response.chars().count();
        if length < cfg.min_chars.max(1) {
            return Err(JournalError::TooShort {
                min: cfg.min_chars.max(1),
                actual: length,
            });
        }

        let rewarded = self.rewarded_on(at.date_naive()) < cfg.daily_reward_cap;
        let mut grants = SmallVec::new();
        if rewarded {
            if cfg.gold_per_entry > 0 {
                grants.push(RewardGrant::gold(cfg.gold_per_entry));
            }
            if length >= cfg.bonus_chars && cfg.bonus_hearts > 0 {
                grants.push(RewardGrant::new(Currency::Hearts, cfg.bonus_hearts));
            }
            ledger.apply_grants(
                RewardSource::Journal,
                &grants,
                &format!("{zone} reflection"),
                at,
            );
        }

        let entry_id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        self.entries.push_back(JournalEntry {
            id: entry_id,
            prompt: prompt.to_string(),
            response: response.to_string(),
            zone,
            written_at: at,
            rewarded,
        });
        while self.entries.len() > cfg.max_entries.max(1) {
            self.entries.pop_front();
        }

        Ok(JournalOutcome {
            entry_id,
            rewarded,
            grants,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 4, 21, 0, 0).unwrap()
    }

    const RESPONSE: &str = "Today I finally went for the long walk I kept postponing.";

    #[test]
    fn prompts_come_from_the_zone() {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        for zone in JournalZone::ALL {
            let prompt = next_prompt(zone, &mut rng);
            assert!(zone.prompts().contains(&prompt));
        }
    }

    #[test]
    fn short_responses_are_rejected() {
        let mut state = JournalState::default();
        let mut ledger = RewardLedger::default();
        let err = state
            .submit(
                "Prompt",
                "   too short   ",
                JournalZone::Mind,
                &mut ledger,
                &JournalConfig::default(),
                at(),
            )
            .unwrap_err();
        assert_eq!(err, JournalError::TooShort { min: 20, actual: 9 });
        assert!(state.entries.is_empty());
    }

    #[test]
    fn rewards_stop_after_daily_cap() {
        let cfg = JournalConfig::default();
        let mut state = JournalState::default();
        let mut ledger = RewardLedger::default();
        for _ in 0..cfg.daily_reward_cap {
            let outcome = state
                .submit("p", RESPONSE, JournalZone::Heart, &mut ledger, &cfg, at())
                .unwrap();
            assert!(outcome.rewarded);
        }
        let capped = state
            .submit("p", RESPONSE, JournalZone::Heart, &mut ledger, &cfg, at())
            .unwrap();
        assert!(!capped.rewarded);
        assert!(capped.grants.is_empty());
        assert_eq!(state.entries.len(), 4);
        assert_eq!(
            ledger.gold.gold,
            u64::from(cfg.daily_reward_cap) * cfg.gold_per_entry
        );

        let tomorrow = at() + Duration::days(1);
        let fresh = state
            .submit("p", RESPONSE, JournalZone::Heart, &mut ledger, &cfg, tomorrow)
            .unwrap();
        assert!(fresh.rewarded);
    }

    #[test]
    fn long_entries_earn_a_heart() {
        let cfg = JournalConfig::default();
        let mut state = JournalState::default();
        let mut ledger = RewardLedger::default();
        let long = "a".repeat(cfg.bonus_chars);
        let outcome = state
            .submit("p", &long, JournalZone::Spirit, &mut ledger, &cfg, at())
            .unwrap();
        assert_eq!(outcome.grants.len(), 2);
        assert_eq!(ledger.balance.hearts, cfg.bonus_hearts);
    }

    #[test]
    fn entries_are_capped_oldest_first() {
        let cfg = JournalConfig {
            max_entries: 2,
            ..JournalConfig::default()
        };
        let mut state = JournalState::default();
        let mut ledger = RewardLedger::default();
        for _ in 0..3 {
            state
                .submit("p", RESPONSE, JournalZone::Body, &mut ledger, &cfg, at())
                .unwrap();
        }
        let ids: Vec<u64> = state.entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}

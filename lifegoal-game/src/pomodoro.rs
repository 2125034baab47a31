//! Pomodoro focus timer.
//!
//! The UI owns the actual interval timer and feeds elapsed seconds through
//! [`PomodoroSession::tick`]; this module only tracks progress and pays the
//! completion reward exactly once per session.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use thiserror::Error;

use crate::constants::{
    POMODORO_ALLOWED_MINUTES, POMODORO_GOLD_PER_MINUTE, POMODORO_TOKEN_BLOCK_MINUTES,
    POMODORO_TOKENS_PER_BLOCK,
};
use crate::ledger::{Currency, RewardGrant, RewardLedger, RewardSource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PomodoroConfig {
    pub allowed_minutes: Vec<u32>,
    pub gold_per_minute: u64,
    pub token_block_minutes: u32,
    pub tokens_per_block: u64,
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            allowed_minutes: POMODORO_ALLOWED_MINUTES.to_vec(),
            gold_per_minute: POMODORO_GOLD_PER_MINUTE,
            token_block_minutes: POMODORO_TOKEN_BLOCK_MINUTES,
            tokens_per_block: POMODORO_TOKENS_PER_BLOCK,
        }
    }
}

impl PomodoroConfig {
    /// Rewards for a completed session of `minutes`.
    #[must_use]
    pub fn reward_for_minutes(&self, minutes: u32) -> SmallVec<[RewardGrant; 2]> {
        let mut grants = SmallVec::new();
        let gold = u64::from(minutes).saturating_mul(self.gold_per_minute);
        if gold > 0 {
            grants.push(RewardGrant::gold(gold));
        }
        if self.token_block_minutes > 0 {
            let blocks = u64::from(minutes / self.token_block_minutes);
            let tokens = blocks.saturating_mul(self.tokens_per_block);
            if tokens > 0 {
                grants.push(RewardGrant::new(Currency::GameTokens, tokens));
            }
        }
        grants
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PomodoroStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
    Abandoned,
}

impl fmt::Display for PomodoroStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PomodoroError {
    #[error("cannot {action} a {from} session")]
    InvalidTransition {
        from: PomodoroStatus,
        action: &'static str,
    },
    #[error("{0}-minute sessions are not offered")]
    UnsupportedDuration(u32),
    #[error("session reward already claimed")]
    AlreadyClaimed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroSession {
    #[serde(default)]
    pub duration_secs: u32,
    #[serde(default)]
    pub elapsed_secs: u32,
    #[serde(default)]
    pub status: PomodoroStatus,
    #[serde(default)]
    pub rewarded: bool,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_sessions: u32,
}

impl PomodoroSession {
    const fn invalid(&self, action: &'static str) -> PomodoroError {
        PomodoroError::InvalidTransition {
            from: self.status,
            action,
        }
    }

    #[must_use]
    pub const fn minutes(&self) -> u32 {
        self.duration_secs / 60
    }

    #[must_use]
    pub const fn remaining_secs(&self) -> u32 {
        self.duration_secs.saturating_sub(self.elapsed_secs)
    }

    /// Begin a new session. Finished or abandoned sessions are replaced.
    ///
    /// # Errors
    ///
    /// Fails while a session is running or paused, or when `minutes` is not
    /// one of the configured durations.
    pub fn start(
        &mut self,
        minutes: u32,
        cfg: &PomodoroConfig,
        at: DateTime<Utc>,
    ) -> Result<(), PomodoroError> {
        if matches!(self.status, PomodoroStatus::Running | PomodoroStatus::Paused) {
            return Err(self.invalid("start"));
        }
        if !cfg.allowed_minutes.contains(&minutes) {
            return Err(PomodoroError::UnsupportedDuration(minutes));
        }
        self.duration_secs = minutes.saturating_mul(60);
        self.elapsed_secs = 0;
        self.status = PomodoroStatus::Running;
        self.rewarded = false;
        self.started_at = Some(at);
        Ok(())
    }

    /// # Errors
    ///
    /// Only a running session can be paused.
    pub fn pause(&mut self) -> Result<(), PomodoroError> {
        if self.status != PomodoroStatus::Running {
            return Err(self.invalid("pause"));
        }
        self.status = PomodoroStatus::Paused;
        Ok(())
    }

    /// # Errors
    ///
    /// Only a paused session can be resumed.
    pub fn resume(&mut self) -> Result<(), PomodoroError> {
        if self.status != PomodoroStatus::Paused {
            return Err(self.invalid("resume"));
        }
        self.status = PomodoroStatus::Running;
        Ok(())
    }

    /// Advance a running session. Elapsed time is clamped to the duration.
    ///
    /// # Errors
    ///
    /// Ticks are rejected unless the session is running.
    pub fn tick(&mut self, secs: u32) -> Result<PomodoroStatus, PomodoroError> {
        if self.status != PomodoroStatus::Running {
            return Err(self.invalid("tick"));
        }
        self.elapsed_secs = self
            .elapsed_secs
            .saturating_add(secs)
            .min(self.duration_secs);
        if self.elapsed_secs >= self.duration_secs {
            self.status = PomodoroStatus::Completed;
            self.completed_sessions = self.completed_sessions.saturating_add(1);
        }
        Ok(self.status)
    }

    /// # Errors
    ///
    /// Only running or paused sessions can be abandoned.
    pub fn abandon(&mut self) -> Result<(), PomodoroError> {
        if !matches!(self.status, PomodoroStatus::Running | PomodoroStatus::Paused) {
            return Err(self.invalid("abandon"));
        }
        self.status = PomodoroStatus::Abandoned;
        Ok(())
    }

    /// Pay the completion reward once.
    ///
    /// # Errors
    ///
    /// Fails for sessions that are not completed or were already paid.
    pub fn claim_reward(
        &mut self,
        ledger: &mut RewardLedger,
        cfg: &PomodoroConfig,
        at: DateTime<Utc>,
    ) -> Result<SmallVec<[RewardGrant; 2]>, PomodoroError> {
        if self.status != PomodoroStatus::Completed {
            return Err(self.invalid("claim"));
        }
        if self.rewarded {
            return Err(PomodoroError::AlreadyClaimed);
        }
        let grants = cfg.reward_for_minutes(self.minutes());
        let context = format!("{}-minute focus session", self.minutes());
        ledger.apply_grants(RewardSource::Pomodoro, &grants, &context, at);
        self.rewarded = true;
        Ok(grants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 10, 8, 30, 0).unwrap()
    }

    #[test]
    fn full_cycle_pays_once() {
        let cfg = PomodoroConfig::default();
        let mut session = PomodoroSession::default();
        let mut ledger = RewardLedger::default();
        session.start(25, &cfg, at()).unwrap();
        session.tick(600).unwrap();
        session.pause().unwrap();
        assert!(session.tick(10).is_err());
        session.resume().unwrap();
        assert_eq!(session.tick(5_000).unwrap(), PomodoroStatus::Completed);
        assert_eq!(session.elapsed_secs, 1_500);
        assert_eq!(session.remaining_secs(), 0);

        let grants = session.claim_reward(&mut ledger, &cfg, at()).unwrap();
        assert_eq!(grants.len(), 2);
        assert_eq!(ledger.gold.gold, 50);
        assert_eq!(ledger.balance.game_tokens, 1);
        assert_eq!(
            session.claim_reward(&mut ledger, &cfg, at()),
            Err(PomodoroError::AlreadyClaimed)
        );
        assert_eq!(ledger.gold.gold, 50);
    }

    #[test]
    fn short_sessions_pay_gold_only() {
        let grants = PomodoroConfig::default().reward_for_minutes(15);
        assert_eq!(grants.as_slice(), &[RewardGrant::gold(30)]);
    }

    #[test]
    fn unsupported_duration_is_rejected() {
        let mut session = PomodoroSession::default();
        assert_eq!(
            session.start(7, &PomodoroConfig::default(), at()),
            Err(PomodoroError::UnsupportedDuration(7))
        );
        assert_eq!(session.status, PomodoroStatus::Idle);
    }

    #[test]
    fn running_session_cannot_restart() {
        let cfg = PomodoroConfig::default();
        let mut session = PomodoroSession::default();
        session.start(5, &cfg, at()).unwrap();
        assert!(matches!(
            session.start(5, &cfg, at()),
            Err(PomodoroError::InvalidTransition { action: "start", .. })
        ));
    }

    #[test]
    fn abandoned_sessions_are_not_claimable() {
        let cfg = PomodoroConfig::default();
        let mut session = PomodoroSession::default();
        let mut ledger = RewardLedger::default();
        session.start(45, &cfg, at()).unwrap();
        session.tick(60).unwrap();
        session.abandon().unwrap();
        assert!(session.claim_reward(&mut ledger, &cfg, at()).is_err());
        assert!(ledger.log.is_empty());
        session.start(5, &cfg, at()).unwrap();
        assert_eq!(session.status, PomodoroStatus::Running);
    }
}

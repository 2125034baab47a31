//! Shared currency balance and the capped reward log every mini-game mutates.
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::REWARD_LOG_CAP;
use crate::numbers::signed_amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    Dice,
    GameTokens,
    Hearts,
    Gold,
}

impl Currency {
    pub const ALL: [Self; 4] = [Self::Dice, Self::GameTokens, Self::Hearts, Self::Gold];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dice => "dice",
            Self::GameTokens => "game_tokens",
            Self::Hearts => "hearts",
            Self::Gold => "gold",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dice" => Ok(Self::Dice),
            "game_tokens" | "tokens" => Ok(Self::GameTokens),
            "hearts" => Ok(Self::Hearts),
            "gold" | "coins" => Ok(Self::Gold),
            _ => Err(()),
        }
    }
}

/// Where a balance change originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardSource {
    LuckyRoll,
    LapBonus,
    Pomodoro,
    Journal,
    Wheel,
    Campaign,
    Purchase,
    Adjustment,
}

impl RewardSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LuckyRoll => "lucky_roll",
            Self::LapBonus => "lap_bonus",
            Self::Pomodoro => "pomodoro",
            Self::Journal => "journal",
            Self::Wheel => "wheel",
            Self::Campaign => "campaign",
            Self::Purchase => "purchase",
            Self::Adjustment => "adjustment",
        }
    }
}

impl fmt::Display for RewardSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dice, game tokens and hearts. Gold lives in [`GoldCounter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyBalance {
    #[serde(default)]
    pub dice: u64,
    #[serde(default)]
    pub game_tokens: u64,
    #[serde(default)]
    pub hearts: u64,
}

/// Separately persisted gold/coin counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldCounter {
    #[serde(default)]
    pub gold: u64,
}

/// A fixed amount of one currency granted by a mini-game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardGrant {
    pub currency: Currency,
    pub amount: u64,
}

impl RewardGrant {
    #[must_use]
    pub const fn new(currency: Currency, amount: u64) -> Self {
        Self { currency, amount }
    }

    #[must_use]
    pub const fn gold(amount: u64) -> Self {
        Self::new(Currency::Gold, amount)
    }
}

/// One entry of the reward log. `amount` is signed: debits are negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEvent {
    pub source: RewardSource,
    pub currency: Currency,
    pub amount: i64,
    pub context: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only log trimmed to [`REWARD_LOG_CAP`] entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RewardLog {
    entries: VecDeque<RewardEvent>,
}

impl RewardLog {
    pub fn push(&mut self, event: RewardEvent) {
        self.entries.push_back(event);
        while self.entries.len() > REWARD_LOG_CAP {
            self.entries.pop_front();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &RewardEvent> {
        self.entries.iter()
    }

    /// The newest `count` events, newest first.
    #[must_use]
    pub fn recent(&self, count: usize) -> Vec<RewardEvent> {
        self.entries.iter().rev().take(count).cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("not enough {currency}: need {needed}, have {available}")]
    InsufficientFunds {
        currency: Currency,
        needed: u64,
        available: u64,
    },
}

/// In-memory view of a user's balances and log.
///
/// The three parts are persisted as separate documents; see
/// [`crate::engine::LifeGoalEngine`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardLedger {
    #[serde(default)]
    pub balance: CurrencyBalance,
    #[serde(default)]
    pub gold: GoldCounter,
    #[serde(default)]
    pub log: RewardLog,
}

impl RewardLedger {
    #[must_use]
    pub const fn from_parts(balance: CurrencyBalance, gold: GoldCounter, log: RewardLog) -> Self {
        Self { balance, gold, log }
    }

    #[must_use]
    pub const fn balance_of(&self, currency: Currency) -> u64 {
        match currency {
            Currency::Dice => self.balance.dice,
            Currency::GameTokens => self.balance.game_tokens,
            Currency::Hearts => self.balance.hearts,
            Currency::Gold => self.gold.gold,
        }
    }

    const fn slot_mut(&mut self, currency: Currency) -> &mut u64 {
        match currency {
            Currency::Dice => &mut self.balance.dice,
            Currency::GameTokens => &mut self.balance.game_tokens,
            Currency::Hearts => &mut self.balance.hearts,
            Currency::Gold => &mut self.gold.gold,
        }
    }

    fn record(
        &mut self,
        source: RewardSource,
        currency: Currency,
        amount: i64,
        context: String,
        at: DateTime<Utc>,
    ) {
        debug!("ledger {source} {currency} {amount:+} ({context})");
        self.log.push(RewardEvent {
            source,
            currency,
            amount,
            context,
            timestamp: at,
        });
    }

    /// Add `amount` and log it. Returns the new balance.
    pub fn credit(
        &mut self,
        source: RewardSource,
        currency: Currency,
        amount: u64,
        context: impl Into<String>,
        at: DateTime<Utc>,
    ) -> u64 {
        if amount == 0 {
            return self.balance_of(currency);
        }
        let slot = self.slot_mut(currency);
        *slot = slot.saturating_add(amount);
        let updated = *slot;
        self.record(source, currency, signed_amount(amount), context.into(), at);
        updated
    }

    /// Subtract up to `amount`, flooring the balance at zero.
    ///
    /// Returns the amount actually removed, which is also what gets logged.
    pub fn debit(
        &mut self,
        source: RewardSource,
        currency: Currency,
        amount: u64,
        context: impl Into<String>,
        at: DateTime<Utc>,
    ) -> u64 {
        let slot = self.slot_mut(currency);
        let removed = amount.min(*slot);
        if removed == 0 {
            return 0;
        }
        *slot -= removed;
        self.record(source, currency, -signed_amount(removed), context.into(), at);
        removed
    }

    /// All-or-nothing spend used for entry costs. Returns the remaining
    /// balance; on shortfall nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientFunds`] when the balance is below
    /// `amount`.
    pub fn try_spend(
        &mut self,
        source: RewardSource,
        currency: Currency,
        amount: u64,
        context: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<u64, LedgerError> {
        let available = self.balance_of(currency);
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                currency,
                needed: amount,
                available,
            });
        }
        self.debit(source, currency, amount, context, at);
        Ok(self.balance_of(currency))
    }

    /// Credit every grant under one source and context.
    pub fn apply_grants(
        &mut self,
        source: RewardSource,
        grants: &[RewardGrant],
        context: &str,
        at: DateTime<Utc>,
    ) {
        for grant in grants {
            self.credit(source, grant.currency, grant.amount, context, at);
        }
    }
}

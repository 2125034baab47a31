//! Daily spin wheel.
use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{WHEEL_EXTRA_SPIN_COST, WHEEL_FREE_SPINS_PER_DAY};
use crate::ledger::{Currency, RewardGrant, RewardLedger, RewardSource};
use crate::weighted::choose_weighted_index;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum WheelPrize {
    Gold(u64),
    Dice(u64),
    GameTokens(u64),
    Hearts(u64),
    Nothing,
}

impl WheelPrize {
    #[must_use]
    pub const fn grant(self) -> Option<RewardGrant> {
        let (currency, amount) = match self {
            Self::Gold(amount) => (Currency::Gold, amount),
            Self::Dice(amount) => (Currency::Dice, amount),
            Self::GameTokens(amount) => (Currency::GameTokens, amount),
            Self::Hearts(amount) => (Currency::Hearts, amount),
            Self::Nothing => return None,
        };
        if amount == 0 {
            None
        } else {
            Some(RewardGrant::new(currency, amount))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelSegment {
    pub label: String,
    pub prize: WheelPrize,
    pub weight: u32,
}

impl WheelSegment {
    fn new(label: &str, prize: WheelPrize, weight: u32) -> Self {
        Self {
            label: label.to_string(),
            prize,
            weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    pub segments: Vec<WheelSegment>,
    pub free_spins_per_day: u32,
    pub extra_spin_cost: u64,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            segments: vec![
                WheelSegment::new("10 Gold", WheelPrize::Gold(10), 30),
                WheelSegment::new("25 Gold", WheelPrize::Gold(25), 20),
                WheelSegment::new("50 Gold", WheelPrize::Gold(50), 10),
                WheelSegment::new("100 Gold", WheelPrize::Gold(100), 4),
                WheelSegment::new("1 Die", WheelPrize::Dice(1), 14),
                WheelSegment::new("3 Dice", WheelPrize::Dice(3), 5),
                WheelSegment::new("Game Token", WheelPrize::GameTokens(1), 8),
                WheelSegment::new("Heart", WheelPrize::Hearts(1), 4),
                WheelSegment::new("Try Again", WheelPrize::Nothing, 5),
            ],
            free_spins_per_day: WHEEL_FREE_SPINS_PER_DAY,
            extra_spin_cost: WHEEL_EXTRA_SPIN_COST,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub segment_index: usize,
    pub label: String,
    pub prize: WheelPrize,
    pub paid_spin: bool,
    pub spun_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WheelError {
    #[error("wheel has no selectable segments")]
    NoSegments,
    #[error("an extra spin costs {cost} game tokens")]
    NotEnoughTokens { cost: u64 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelState {
    #[serde(default)]
    pub last_spin: Option<SpinOutcome>,
    #[serde(default)]
    pub last_spin_day: Option<NaiveDate>,
    #[serde(default)]
    pub spins_today: u32,
    #[serde(default)]
    pub total_spins: u64,
}

impl WheelState {
    fn spins_on(&self, day: NaiveDate) -> u32 {
        if self.last_spin_day == Some(day) {
            self.spins_today
        } else {
            0
        }
    }

    #[must_use]
    pub fn free_spin_available(&self, cfg: &WheelConfig, at: DateTime<Utc>) -> bool {
        self.spins_on(at.date_naive()) < cfg.free_spins_per_day
    }

    /// Spin once. The first spins of each UTC day are free; later spins
    /// cost game tokens.
    ///
    /// # Errors
    ///
    /// Fails without charging when the wheel has no weight, or when a paid
    /// spin cannot be afforded.
    pub fn spin<R>(
        &mut self,
        ledger: &mut RewardLedger,
        cfg: &WheelConfig,
        rng: &mut R,
        at: DateTime<Utc>,
    ) -> Result<SpinOutcome, WheelError>
    where
        R: Rng + ?Sized,
    {
        if cfg.segments.iter().all(|segment| segment.weight == 0) {
            return Err(WheelError::NoSegments);
        }

        let today = at.date_naive();
        let paid_spin = !self.free_spin_available(cfg, at);
        if paid_spin && cfg.extra_spin_cost > 0 {
            ledger
                .try_spend(
                    RewardSource::Wheel,
                    Currency::GameTokens,
                    cfg.extra_spin_cost,
                    "extra wheel spin",
                    at,
                )
                .map_err(|_| WheelError::NotEnoughTokens {
                    cost: cfg.extra_spin_cost,
                })?;
        }

        let segment_index = choose_weighted_index(cfg.segments.iter().map(|s| s.weight), rng)
            .ok_or(WheelError::NoSegments)?;
        let segment = &cfg.segments[segment_index];
        if let Some(grant) = segment.prize.grant() {
            ledger.credit(
                RewardSource::Wheel,
                grant.currency,
                grant.amount,
                format!("wheel: {}", segment.label),
                at,
            );
        }

        let outcome = SpinOutcome {
            segment_index,
            label: segment.label.clone(),
            prize: segment.prize,
            paid_spin,
            spun_at: at,
        };
        self.spins_today = self.spins_on(today).saturating_add(1);
        self.last_spin_day = Some(today);
        self.total_spins = self.total_spins.saturating_add(1);
        self.last_spin = Some(outcome.clone());
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 14, 10, 0, 0).unwrap()
    }

    #[test]
    fn first_spin_of_the_day_is_free() {
        let cfg = WheelConfig::default();
        let mut state = WheelState::default();
        let mut ledger = RewardLedger::default();
        let mut rng = ChaCha20Rng::seed_from_u64(21);
        let outcome = state.spin(&mut ledger, &cfg, &mut rng, at()).unwrap();
        assert!(!outcome.paid_spin);
        assert_eq!(state.spins_today, 1);
        assert_eq!(state.last_spin.as_ref(), Some(&outcome));
        assert!(!state.free_spin_available(&cfg, at()));
    }

    #[test]
    fn second_spin_requires_tokens() {
        let cfg = WheelConfig::default();
        let mut state = WheelState::default();
        let mut ledger = RewardLedger::default();
        let mut rng = ChaCha20Rng::seed_from_u64(22);
        state.spin(&mut ledger, &cfg, &mut rng, at()).unwrap();
        ledger.balance.game_tokens = 0;
        let err = state.spin(&mut ledger, &cfg, &mut rng, at()).unwrap_err();
        assert_eq!(err, WheelError::NotEnoughTokens { cost: 1 });
        assert_eq!(state.spins_today, 1);

        ledger.balance.game_tokens = 1;
        let paid = state.spin(&mut ledger, &cfg, &mut rng, at()).unwrap();
        assert!(paid.paid_spin);
        assert_eq!(state.spins_today, 2);
    }

    #[test]
    fn free_spin_resets_next_day() {
        let cfg = WheelConfig::default();
        let mut state = WheelState::default();
        let mut ledger = RewardLedger::default();
        let mut rng = ChaCha20Rng::seed_from_u64(23);
        state.spin(&mut ledger, &cfg, &mut rng, at()).unwrap();
        let tomorrow = at() + Duration::days(1);
        assert!(state.free_spin_available(&cfg, tomorrow));
        let outcome = state.spin(&mut ledger, &cfg, &mut rng, tomorrow).unwrap();
        assert!(!outcome.paid_spin);
        assert_eq!(state.spins_today, 1);
        assert_eq!(state.total_spins, 2);
    }

    #[test]
    fn zero_weight_wheel_is_rejected() {
        let cfg = WheelConfig {
            segments: vec![WheelSegment::new("Nope", WheelPrize::Gold(5), 0)],
            ..WheelConfig::default()
        };
        let mut state = WheelState::default();
        let mut ledger = RewardLedger::default();
        let mut rng = ChaCha20Rng::seed_from_u64(24);
        assert_eq!(
            state.spin(&mut ledger, &cfg, &mut rng, at()),
            Err(WheelError::NoSegments)
        );
        assert_eq!(state.total_spins, 0);
    }

    #[test]
    fn prizes_are_credited() {
        let cfg = WheelConfig {
            segments: vec![WheelSegment::new("Jackpot", WheelPrize::Dice(3), 1)],
            ..WheelConfig::default()
        };
        let mut state = WheelState::default();
        let mut ledger = RewardLedger::default();
        let mut rng = ChaCha20Rng::seed_from_u64(25);
        state.spin(&mut ledger, &cfg, &mut rng, at()).unwrap();
        assert_eq!(ledger.balance.dice, 3);
        assert_eq!(WheelPrize::Nothing.grant(), None);
    }
}

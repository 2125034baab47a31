//! Per-user engine tying the reward subsystems to storage.
//!
//! Every operation is a read-modify-write over the user's documents: load
//! what it touches, mutate in memory, write back on success. Failed
//! operations write nothing.
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use smallvec::SmallVec;
use std::cell::Cell;
use std::rc::Rc;
use thiserror::Error;

use crate::campaign::{CampaignError, CampaignProgress, NodeCompletion};
use crate::config::GameConfig;
use crate::journal::{JournalError, JournalOutcome, JournalState, JournalZone, next_prompt};
use crate::ledger::{
    Currency, CurrencyBalance, GoldCounter, LedgerError, RewardEvent, RewardGrant, RewardLedger,
    RewardLog, RewardSource,
};
use crate::lucky_roll::{self, LuckyRollError, LuckyRollState, RollOutcome, TileKind};
use crate::pomodoro::{PomodoroError, PomodoroSession, PomodoroStatus};
use crate::seed::{derive_stream_seed, user_seed};
use crate::storage::{
    KeyValueStore, StorageFeature, load_or_default, load_or_else, save_quietly, storage_key,
};
use crate::wheel::{SpinOutcome, WheelError, WheelState};

/// Source of "now" for timestamps and day boundaries.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl FixedClock {
    #[must_use]
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(at)),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.now.set(at);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    LuckyRoll(#[from] LuckyRollError),
    #[error(transparent)]
    Pomodoro(#[from] PomodoroError),
    #[error(transparent)]
    Journal(#[from] JournalError),
    #[error(transparent)]
    Wheel(#[from] WheelError),
    #[error(transparent)]
    Campaign(#[from] CampaignError),
}

/// Main engine for one signed-in user.
pub struct LifeGoalEngine<S, C = SystemClock>
where
    S: KeyValueStore,
    C: Clock,
{
    store: S,
    clock: C,
    user_id: String,
    seed: u64,
    config: GameConfig,
    rng: ChaCha20Rng,
    /// Lucky Roll ring, keyed by the board seed it was generated from.
    tiles: Option<(u64, Vec<TileKind>)>,
}

impl<S> LifeGoalEngine<S, SystemClock>
where
    S: KeyValueStore,
{
    /// Create an engine on the system clock with a time-derived roll stream.
    pub fn new(store: S, user_id: &str, config: GameConfig) -> Self {
        let seed = user_seed(user_id);
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let rng_seed = derive_stream_seed(seed, &nanos.to_le_bytes());
        Self::with_clock(store, SystemClock, user_id, config, rng_seed)
    }
}

impl<S, C> LifeGoalEngine<S, C>
where
    S: KeyValueStore,
    C: Clock,
{
    /// Create an engine with an explicit clock and roll seed.
    pub fn with_clock(
        store: S,
        clock: C,
        user_id: &str,
        config: GameConfig,
        rng_seed: u64,
    ) -> Self {
        Self {
            store,
            clock,
            user_id: user_id.trim().to_string(),
            seed: user_seed(user_id),
            config,
            rng: ChaCha20Rng::seed_from_u64(rng_seed),
            tiles: None,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    fn key(&self, feature: StorageFeature) -> String {
        storage_key(feature, &self.user_id)
    }

    // Ledger -----------------------------------------------------------------

    #[must_use]
    pub fn ledger(&self) -> RewardLedger {
        let balance: CurrencyBalance =
            load_or_default(&self.store, &self.key(StorageFeature::Currency));
        let gold: GoldCounter = load_or_default(&self.store, &self.key(StorageFeature::Gold));
        let log: RewardLog = load_or_default(&self.store, &self.key(StorageFeature::RewardLog));
        RewardLedger::from_parts(balance, gold, log)
    }

    fn save_ledger(&self, ledger: &RewardLedger) {
        save_quietly(
            &self.store,
            &self.key(StorageFeature::Currency),
            &ledger.balance,
        );
        save_quietly(&self.store, &self.key(StorageFeature::Gold), &ledger.gold);
        save_quietly(
            &self.store,
            &self.key(StorageFeature::RewardLog),
            &ledger.log,
        );
    }

    #[must_use]
    pub fn balance(&self) -> CurrencyBalance {
        self.ledger().balance
    }

    #[must_use]
    pub fn gold(&self) -> u64 {
        self.ledger().gold.gold
    }

    /// Newest `count` reward events, newest first.
    #[must_use]
    pub fn reward_log(&self, count: usize) -> Vec<RewardEvent> {
        self.ledger().log.recent(count)
    }

    /// Returns the new balance of `currency`.
    pub fn credit(
        &self,
        source: RewardSource,
        currency: Currency,
        amount: u64,
        context: &str,
    ) -> u64 {
        let mut ledger = self.ledger();
        let total = ledger.credit(source, currency, amount, context, self.clock.now());
        self.save_ledger(&ledger);
        total
    }

    /// Returns the amount actually removed (balances floor at zero).
    pub fn debit(
        &self,
        source: RewardSource,
        currency: Currency,
        amount: u64,
        context: &str,
    ) -> u64 {
        let mut ledger = self.ledger();
        let removed = ledger.debit(source, currency, amount, context, self.clock.now());
        self.save_ledger(&ledger);
        removed
    }

    /// All-or-nothing spend, e.g. for shop purchases.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Ledger`] when the balance is short.
    pub fn spend(
        &self,
        source: RewardSource,
        currency: Currency,
        amount: u64,
        context: &str,
    ) -> Result<u64, EngineError> {
        let mut ledger = self.ledger();
        let remaining = ledger.try_spend(source, currency, amount, context, self.clock.now())?;
        self.save_ledger(&ledger);
        Ok(remaining)
    }

    // Lucky Roll -------------------------------------------------------------

    #[must_use]
    pub fn lucky_roll_state(&self) -> LuckyRollState {
        load_or_else(&self.store, &self.key(StorageFeature::LuckyRoll), || {
            LuckyRollState::new(self.seed)
        })
    }

    /// # Errors
    ///
    /// Returns [`EngineError::LuckyRoll`] when no dice are left.
    pub fn roll_dice(&mut self) -> Result<RollOutcome, EngineError> {
        let mut state = self.lucky_roll_state();
        let mut ledger = self.ledger();
        if self.tiles.as_ref().is_none_or(|(seed, _)| *seed != state.seed) {
            let tiles = lucky_roll::generate_tiles(state.seed, &self.config.lucky_roll);
            self.tiles = Some((state.seed, tiles));
        }
        let tiles = self.tiles.as_ref().map_or(&[][..], |(_, tiles)| tiles.as_slice());
        let outcome = lucky_roll::roll(
            &mut state,
            &mut ledger,
            &self.config.lucky_roll,
            tiles,
            &mut self.rng,
            self.clock.now(),
        )?;
        debug!(
            "user {} rolled {} ({} -> {})",
            self.user_id, outcome.roll, outcome.from, outcome.to
        );
        save_quietly(&self.store, &self.key(StorageFeature::LuckyRoll), &state);
        self.save_ledger(&ledger);
        Ok(outcome)
    }

    // Pomodoro ---------------------------------------------------------------

    #[must_use]
    pub fn focus_session(&self) -> PomodoroSession {
        load_or_default(&self.store, &self.key(StorageFeature::Pomodoro))
    }

    fn update_focus<T, F>(&self, apply: F) -> Result<T, EngineError>
    where
        F: FnOnce(&mut PomodoroSession) -> Result<T, PomodoroError>,
    {
        let mut session = self.focus_session();
        let value = apply(&mut session)?;
        save_quietly(&self.store, &self.key(StorageFeature::Pomodoro), &session);
        Ok(value)
    }

    /// # Errors
    ///
    /// See [`PomodoroSession::start`].
    pub fn start_focus(&self, minutes: u32) -> Result<(), EngineError> {
        let now = self.clock.now();
        let cfg = &self.config.pomodoro;
        self.update_focus(|session| session.start(minutes, cfg, now))
    }

    /// # Errors
    ///
    /// See [`PomodoroSession::pause`].
    pub fn pause_focus(&self) -> Result<(), EngineError> {
        self.update_focus(PomodoroSession::pause)
    }

    /// # Errors
    ///
    /// See [`PomodoroSession::resume`].
    pub fn resume_focus(&self) -> Result<(), EngineError> {
        self.update_focus(PomodoroSession::resume)
    }

    /// # Errors
    ///
    /// See [`PomodoroSession::tick`].
    pub fn tick_focus(&self, secs: u32) -> Result<PomodoroStatus, EngineError> {
        self.update_focus(|session| session.tick(secs))
    }

    /// # Errors
    ///
    /// See [`PomodoroSession::abandon`].
    pub fn abandon_focus(&self) -> Result<(), EngineError> {
        self.update_focus(PomodoroSession::abandon)
    }

    /// # Errors
    ///
    /// See [`PomodoroSession::claim_reward`].
    pub fn claim_focus_reward(&self) -> Result<SmallVec<[RewardGrant; 2]>, EngineError> {
        let mut ledger = self.ledger();
        let now = self.clock.now();
        let cfg = &self.config.pomodoro;
        let grants = self.update_focus(|session| session.claim_reward(&mut ledger, cfg, now))?;
        self.save_ledger(&ledger);
        Ok(grants)
    }

    // Journal ----------------------------------------------------------------

    #[must_use]
    pub fn journal(&self) -> JournalState {
        load_or_default(&self.store, &self.key(StorageFeature::Journal))
    }

    pub fn journal_prompt(&mut self, zone: JournalZone) -> &'static str {
        next_prompt(zone, &mut self.rng)
    }

    /// # Errors
    ///
    /// See [`JournalState::submit`].
    pub fn submit_journal(
        &self,
        prompt: &str,
        response: &str,
        zone: JournalZone,
    ) -> Result<JournalOutcome, EngineError> {
        let mut journal = self.journal();
        let mut ledger = self.ledger();
        let outcome = journal.submit(
            prompt,
            response,
            zone,
            &mut ledger,
            &self.config.journal,
            self.clock.now(),
        )?;
        save_quietly(&self.store, &self.key(StorageFeature::Journal), &journal);
        if outcome.rewarded {
            self.save_ledger(&ledger);
        }
        Ok(outcome)
    }

    // Wheel ------------------------------------------------------------------

    #[must_use]
    pub fn wheel_state(&self) -> WheelState {
        load_or_default(&self.store, &self.key(StorageFeature::Wheel))
    }

    #[must_use]
    pub fn free_spin_available(&self) -> bool {
        self.wheel_state()
            .free_spin_available(&self.config.wheel, self.clock.now())
    }

    /// # Errors
    ///
    /// See [`WheelState::spin`].
    pub fn spin_wheel(&mut self) -> Result<SpinOutcome, EngineError> {
        let mut wheel = self.wheel_state();
        let mut ledger = self.ledger();
        let outcome = wheel.spin(
            &mut ledger,
            &self.config.wheel,
            &mut self.rng,
            self.clock.now(),
        )?;
        save_quietly(&self.store, &self.key(StorageFeature::Wheel), &wheel);
        self.save_ledger(&ledger);
        Ok(outcome)
    }

    // Campaign ---------------------------------------------------------------

    /// Current campaign progress; a first visit generates level 1.
    #[must_use]
    pub fn campaign(&self) -> CampaignProgress {
        let mut progress: CampaignProgress =
            load_or_else(&self.store, &self.key(StorageFeature::Campaign), || {
                CampaignProgress::new(self.seed, &self.config.campaign)
            });
        if progress.boards.is_empty() {
            progress.seed = self.seed;
            progress.ensure_started(&self.config.campaign);
        }
        progress
    }

    /// # Errors
    ///
    /// See [`CampaignProgress::complete_node`].
    pub fn complete_campaign_node(&self, node_id: &str) -> Result<NodeCompletion, EngineError> {
        let mut progress = self.campaign();
        let mut ledger = self.ledger();
        let completion =
            progress.complete_node(node_id, &mut ledger, &self.config.campaign, self.clock.now())?;
        if let Some(level) = completion.next_level {
            info!("user {} reached campaign level {level}", self.user_id);
        }
        save_quietly(&self.store, &self.key(StorageFeature::Campaign), &progress);
        self.save_ledger(&ledger);
        Ok(completion)
    }

    /// Remove every document stored for this user.
    pub fn reset_user(&self) {
        for feature in StorageFeature::ALL {
            let key = self.key(feature);
            if let Err(err) = self.store.remove_item(&key) {
                log::warn!("could not remove {key}: {err}");
            }
        }
    }
}

//! Lucky Roll: the dice-board reward loop.
//!
//! A ring of tiles generated from the user's seed. Each roll costs one die,
//! moves the token 1-6 tiles and pays out whatever the landed tile grants.
//! Passing Start completes a lap and pays the lap bonus.
use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::constants::{
    DIE_FACES, LAP_BONUS_GOLD, LAP_BONUS_HEARTS, LUCKY_ROLL_BOARD_SIZE, LUCKY_ROLL_MIN_BOARD_SIZE,
    TILE_COINS_GOLD, TILE_DICE_REWARD, TILE_HEARTS_REWARD, TILE_MINIGAME_TOKENS,
    TILE_TOKENS_REWARD, TILE_WEIGHT_COINS, TILE_WEIGHT_DICE, TILE_WEIGHT_EMPTY,
    TILE_WEIGHT_HEARTS, TILE_WEIGHT_MINIGAME, TILE_WEIGHT_TOKENS,
};
use crate::ledger::{Currency, RewardGrant, RewardLedger, RewardSource};
use crate::numbers::usize_to_u32;
use crate::seed::derive_stream_seed;
use crate::weighted::choose_weighted;

/// Mini-games a board tile can point the player at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MiniGameKind {
    Pomodoro,
    Journal,
    Wheel,
}

impl MiniGameKind {
    pub const ALL: [Self; 3] = [Self::Pomodoro, Self::Journal, Self::Wheel];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "game", rename_all = "snake_case")]
pub enum TileKind {
    Start,
    Coins,
    Dice,
    Tokens,
    Hearts,
    MiniGame(MiniGameKind),
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileWeights {
    pub coins: u32,
    pub dice: u32,
    pub tokens: u32,
    pub hearts: u32,
    pub minigame: u32,
    pub empty: u32,
}

impl Default for TileWeights {
    fn default() -> Self {
        Self {
            coins: TILE_WEIGHT_COINS,
            dice: TILE_WEIGHT_DICE,
            tokens: TILE_WEIGHT_TOKENS,
            hearts: TILE_WEIGHT_HEARTS,
            minigame: TILE_WEIGHT_MINIGAME,
            empty: TILE_WEIGHT_EMPTY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LuckyRollConfig {
    pub board_size: usize,
    pub lap_bonus_gold: u64,
    pub lap_bonus_hearts: u64,
    pub coins_gold: u64,
    pub dice_reward: u64,
    pub tokens_reward: u64,
    pub hearts_reward: u64,
    pub minigame_tokens: u64,
    pub tile_weights: TileWeights,
}

impl Default for LuckyRollConfig {
    fn default() -> Self {
        Self {
            board_size: LUCKY_ROLL_BOARD_SIZE,
            lap_bonus_gold: LAP_BONUS_GOLD,
            lap_bonus_hearts: LAP_BONUS_HEARTS,
            coins_gold: TILE_COINS_GOLD,
            dice_reward: TILE_DICE_REWARD,
            tokens_reward: TILE_TOKENS_REWARD,
            hearts_reward: TILE_HEARTS_REWARD,
            minigame_tokens: TILE_MINIGAME_TOKENS,
            tile_weights: TileWeights::default(),
        }
    }
}

impl LuckyRollConfig {
    #[must_use]
    pub fn effective_board_size(&self) -> usize {
        self.board_size.max(LUCKY_ROLL_MIN_BOARD_SIZE)
    }

    /// Reward paid for landing on `tile`, if any.
    #[must_use]
    pub const fn tile_reward(&self, tile: TileKind) -> Option<RewardGrant> {
        let grant = match tile {
            TileKind::Start | TileKind::Empty => return None,
            TileKind::Coins => RewardGrant::new(Currency::Gold, self.coins_gold),
            TileKind::Dice => RewardGrant::new(Currency::Dice, self.dice_reward),
            TileKind::Tokens => RewardGrant::new(Currency::GameTokens, self.tokens_reward),
            TileKind::Hearts => RewardGrant::new(Currency::Hearts, self.hearts_reward),
            TileKind::MiniGame(_) => RewardGrant::new(Currency::GameTokens, self.minigame_tokens),
        };
        if grant.amount == 0 { None } else { Some(grant) }
    }
}

/// Generate the tile ring for a seed. Tile 0 is always Start.
#[must_use]
pub fn generate_tiles(seed: u64, cfg: &LuckyRollConfig) -> Vec<TileKind> {
    let size = cfg.effective_board_size();
    let mut rng = ChaCha20Rng::seed_from_u64(derive_stream_seed(seed, b"lucky-roll"));
    let weights = cfg.tile_weights;
    let table = [
        (TileKind::Coins, weights.coins),
        (TileKind::Dice, weights.dice),
        (TileKind::Tokens, weights.tokens),
        (TileKind::Hearts, weights.hearts),
        (TileKind::MiniGame(MiniGameKind::Pomodoro), weights.minigame),
        (TileKind::Empty, weights.empty),
    ];

    let mut tiles = Vec::with_capacity(size);
    tiles.push(TileKind::Start);
    for _ in 1..size {
        let tile = match choose_weighted(&table, &mut rng).copied() {
            Some(TileKind::MiniGame(_)) => {
                let game = MiniGameKind::ALL[rng.gen_range(0..MiniGameKind::ALL.len())];
                TileKind::MiniGame(game)
            }
            Some(tile) => tile,
            None => TileKind::Empty,
        };
        tiles.push(tile);
    }
    tiles
}

/// Persisted dice-board progress for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LuckyRollState {
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub position: usize,
    #[serde(default)]
    pub laps: u32,
    #[serde(default)]
    pub total_rolls: u64,
    #[serde(default)]
    pub last_roll: Option<u8>,
}

impl LuckyRollState {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn tiles(&self, cfg: &LuckyRollConfig) -> Vec<TileKind> {
        generate_tiles(self.seed, cfg)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollOutcome {
    pub roll: u8,
    pub from: usize,
    pub to: usize,
    pub tile: TileKind,
    pub lap_completed: bool,
    /// Times Start was passed or landed on; above one only on boards
    /// smaller than a die.
    #[serde(default)]
    pub laps_completed: u32,
    pub rewards: SmallVec<[RewardGrant; 3]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LuckyRollError {
    #[error("no dice left to roll")]
    NoDice,
}

/// Spend one die, move, and pay out lap and tile rewards.
///
/// `tiles` is the ring from [`generate_tiles`] for `state.seed`; callers
/// rolling repeatedly keep it around instead of regenerating it.
///
/// # Errors
///
/// Returns [`LuckyRollError::NoDice`] without touching state when the
/// balance holds no dice.
pub fn roll<R>(
    state: &mut LuckyRollState,
    ledger: &mut RewardLedger,
    cfg: &LuckyRollConfig,
    tiles: &[TileKind],
    rng: &mut R,
    at: DateTime<Utc>,
) -> Result<RollOutcome, LuckyRollError>
where
    R: Rng + ?Sized,
{
    ledger
        .try_spend(RewardSource::LuckyRoll, Currency::Dice, 1, "dice roll", at)
        .map_err(|_| LuckyRollError::NoDice)?;

    let size = cfg.effective_board_size();
    let roll = rng.gen_range(1..=DIE_FACES);
    let from = state.position % size;
    let advanced = from + usize::from(roll);
    let laps_completed = usize_to_u32(advanced / size);
    let to = advanced % size;

    state.position = to;
    state.total_rolls = state.total_rolls.saturating_add(1);
    state.last_roll = Some(roll);

    let mut rewards = SmallVec::new();
    for _ in 0..laps_completed {
        state.laps = state.laps.saturating_add(1);
        let context = format!("lap {} complete", state.laps);
        for grant in [
            RewardGrant::new(Currency::Gold, cfg.lap_bonus_gold),
            RewardGrant::new(Currency::Hearts, cfg.lap_bonus_hearts),
        ] {
            if grant.amount > 0 {
                ledger.credit(RewardSource::LapBonus, grant.currency, grant.amount, &*context, at);
                rewards.push(grant);
            }
        }
    }

    let tile = tiles.get(to).copied().unwrap_or(TileKind::Empty);
    if let Some(grant) = cfg.tile_reward(tile) {
        ledger.credit(
            RewardSource::LuckyRoll,
            grant.currency,
            grant.amount,
            format!("landed on tile {to}"),
            at,
        );
        rewards.push(grant);
    }

    Ok(RollOutcome {
        roll,
        from,
        to,
        tile,
        lap_completed: laps_completed > 0,
        laps_completed,
        rewards,
    })
}

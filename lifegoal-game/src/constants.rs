//! Centralized balance and tuning constants for LifeGoal reward logic.
//!
//! These values define the deterministic math of the reward economy.
//! Config structs default to them, so a deployment can override a value
//! through JSON while the baseline stays reviewed in version control.

// Storage ------------------------------------------------------------------
pub(crate) const STORAGE_PREFIX: &str = "lifegoal";

// Reward log ---------------------------------------------------------------
/// Maximum number of reward events kept per user; oldest are dropped first.
pub const REWARD_LOG_CAP: usize = 200;

// Lucky Roll ---------------------------------------------------------------
pub(crate) const DIE_FACES: u8 = 6;
pub(crate) const LUCKY_ROLL_BOARD_SIZE: usize = 24;
pub(crate) const LUCKY_ROLL_MIN_BOARD_SIZE: usize = 2;
pub(crate) const LAP_BONUS_GOLD: u64 = 100;
pub(crate) const LAP_BONUS_HEARTS: u64 = 1;
pub(crate) const TILE_COINS_GOLD: u64 = 20;
pub(crate) const TILE_DICE_REWARD: u64 = 2;
pub(crate) const TILE_TOKENS_REWARD: u64 = 1;
pub(crate) const TILE_HEARTS_REWARD: u64 = 1;
pub(crate) const TILE_MINIGAME_TOKENS: u64 = 1;
pub(crate) const TILE_WEIGHT_COINS: u32 = 40;
pub(crate) const TILE_WEIGHT_DICE: u32 = 10;
pub(crate) const TILE_WEIGHT_TOKENS: u32 = 14;
pub(crate) const TILE_WEIGHT_HEARTS: u32 = 6;
pub(crate) const TILE_WEIGHT_MINIGAME: u32 = 15;
pub(crate) const TILE_WEIGHT_EMPTY: u32 = 15;

// Pomodoro -----------------------------------------------------------------
pub(crate) const POMODORO_ALLOWED_MINUTES: [u32; 5] = [5, 15, 25, 45, 60];
pub(crate) const POMODORO_GOLD_PER_MINUTE: u64 = 2;
pub(crate) const POMODORO_TOKEN_BLOCK_MINUTES: u32 = 25;
pub(crate) const POMODORO_TOKENS_PER_BLOCK: u64 = 1;

// Journal ------------------------------------------------------------------
pub(crate) const JOURNAL_MIN_CHARS: usize = 20;
pub(crate) const JOURNAL_BONUS_CHARS: usize = 200;
pub(crate) const JOURNAL_DAILY_REWARD_CAP: u32 = 3;
pub(crate) const JOURNAL_GOLD_PER_ENTRY: u64 = 15;
pub(crate) const JOURNAL_BONUS_HEARTS: u64 = 1;
pub(crate) const JOURNAL_MAX_ENTRIES: usize = 500;

// Spin wheel ---------------------------------------------------------------
pub(crate) const WHEEL_FREE_SPINS_PER_DAY: u32 = 1;
pub(crate) const WHEEL_EXTRA_SPIN_COST: u64 = 1;

// Campaign boards ----------------------------------------------------------
pub(crate) const CAMPAIGN_X_MIN: f32 = 8.0;
pub(crate) const CAMPAIGN_X_MAX: f32 = 92.0;
pub(crate) const CAMPAIGN_Y_MIN: f32 = 15.0;
pub(crate) const CAMPAIGN_Y_MAX: f32 = 85.0;
pub(crate) const CAMPAIGN_X_JITTER: f32 = 3.0;
/// Node coordinates are percentages of the board canvas.
pub(crate) const CAMPAIGN_CANVAS_MAX: f32 = 100.0;

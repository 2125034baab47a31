//! LifeGoal Game Engine
//!
//! Platform-agnostic reward and mini-game logic for the LifeGoal habit app.
//! This crate owns the currency ledger, the Lucky Roll board, focus sessions,
//! journaling, the daily wheel and the campaign map. Persistence goes through
//! [`KeyValueStore`], so the same engine runs in the browser and natively.

pub mod campaign;
pub mod config;
pub mod constants;
pub mod engine;
pub mod journal;
pub mod ledger;
pub mod lucky_roll;
pub mod numbers;
pub mod pomodoro;
pub mod seed;
pub mod storage;
pub mod weighted;
pub mod wheel;

// Re-export commonly used types
pub use campaign::{
    BoardNode, BoardTheme, CampaignBoard, CampaignConfig, CampaignError, CampaignProgress,
    LevelTier, NodeCompletion, NodeKind, NodeStatus, TierRewards, generate_board,
};
pub use config::{ConfigSource, GameConfig};
pub use engine::{Clock, EngineError, FixedClock, LifeGoalEngine, SystemClock};
pub use journal::{
    JournalConfig, JournalEntry, JournalError, JournalOutcome, JournalState, JournalZone,
    next_prompt,
};
pub use ledger::{
    Currency, CurrencyBalance, GoldCounter, LedgerError, RewardEvent, RewardGrant, RewardLedger,
    RewardLog, RewardSource,
};
pub use lucky_roll::{
    LuckyRollConfig, LuckyRollError, LuckyRollState, MiniGameKind, RollOutcome, TileKind,
    TileWeights, generate_tiles,
};
pub use pomodoro::{PomodoroConfig, PomodoroError, PomodoroSession, PomodoroStatus};
pub use seed::{derive_stream_seed, user_seed};
pub use storage::{KeyValueStore, MemoryStore, StorageError, StorageFeature, storage_key};
pub use weighted::{choose_weighted, choose_weighted_index};
pub use wheel::{SpinOutcome, WheelConfig, WheelError, WheelPrize, WheelSegment, WheelState};

//! Procedurally generated campaign boards.
//!
//! A board is a short sequence of objective nodes. Exactly one node is
//! active at a time and nodes complete strictly in index order. Completing
//! the last node finishes the board and appends the next level's board.
//!
//! Generation is deterministic per `(user seed, level)`: the theme rotates
//! with the level, the node count and node kinds come from the level tier,
//! and node coordinates come from a seeded stream.
use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use thiserror::Error;

use crate::constants::{
    CAMPAIGN_CANVAS_MAX, CAMPAIGN_X_JITTER, CAMPAIGN_X_MAX, CAMPAIGN_X_MIN, CAMPAIGN_Y_MAX,
    CAMPAIGN_Y_MIN,
};
use crate::ledger::{Currency, RewardGrant, RewardLedger, RewardSource};
use crate::numbers::{clamp_finite, usize_to_f32};
use crate::seed::{campaign_tag, derive_stream_seed};
use crate::weighted::choose_weighted;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardTheme {
    Meadow,
    Forest,
    Desert,
    Tundra,
    Volcano,
    Skyline,
}

impl BoardTheme {
    pub const ROTATION: [Self; 6] = [
        Self::Meadow,
        Self::Forest,
        Self::Desert,
        Self::Tundra,
        Self::Volcano,
        Self::Skyline,
    ];

    /// Theme for a level; level 1 starts the rotation.
    #[must_use]
    pub fn for_level(level: u32) -> Self {
        let idx = level.max(1).saturating_sub(1) as usize % Self::ROTATION.len();
        Self::ROTATION[idx]
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Meadow => "Meadow",
            Self::Forest => "Forest",
            Self::Desert => "Desert",
            Self::Tundra => "Tundra",
            Self::Volcano => "Volcano",
            Self::Skyline => "Skyline",
        }
    }
}

impl fmt::Display for BoardTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Habit,
    Goal,
    Journal,
    MiniGame,
    Boss,
}

impl NodeKind {
    fn title(self, theme: BoardTheme) -> String {
        match self {
            Self::Habit => format!("{theme} habit check-in"),
            Self::Goal => format!("{theme} goal milestone"),
            Self::Journal => format!("{theme} reflection"),
            Self::MiniGame => format!("{theme} challenge"),
            Self::Boss => format!("{theme} guardian"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    #[default]
    Locked,
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelTier {
    Novice,
    Adept,
    Expert,
    Master,
}

/// Fixed reward magnitudes for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierRewards {
    pub node_gold: u64,
    pub boss_gold: u64,
    pub boss_dice: u64,
    pub completion_hearts: u64,
}

const NOVICE_KINDS: &[(NodeKind, u32)] = &[
    (NodeKind::Habit, 5),
    (NodeKind::Goal, 3),
    (NodeKind::Journal, 2),
];
const ADEPT_KINDS: &[(NodeKind, u32)] = &[
    (NodeKind::Habit, 4),
    (NodeKind::Goal, 3),
    (NodeKind::Journal, 2),
    (NodeKind::MiniGame, 2),
];
const EXPERT_KINDS: &[(NodeKind, u32)] = &[
    (NodeKind::Habit, 3),
    (NodeKind::Goal, 4),
    (NodeKind::Journal, 2),
    (NodeKind::MiniGame, 3),
];
const MASTER_KINDS: &[(NodeKind, u32)] = &[
    (NodeKind::Habit, 2),
    (NodeKind::Goal, 5),
    (NodeKind::Journal, 2),
    (NodeKind::MiniGame, 4),
];

impl LevelTier {
    #[must_use]
    pub const fn from_level(level: u32) -> Self {
        match level {
            0..=3 => Self::Novice,
            4..=6 => Self::Adept,
            7..=9 => Self::Expert,
            _ => Self::Master,
        }
    }

    #[must_use]
    pub const fn node_count(self) -> usize {
        match self {
            Self::Novice => 5,
            Self::Adept => 7,
            Self::Expert => 9,
            Self::Master => 12,
        }
    }

    /// Weighted kinds for every node except the closing boss.
    #[must_use]
    pub const fn kind_weights(self) -> &'static [(NodeKind, u32)] {
        match self {
            Self::Novice => NOVICE_KINDS,
            Self::Adept => ADEPT_KINDS,
            Self::Expert => EXPERT_KINDS,
            Self::Master => MASTER_KINDS,
        }
    }

    #[must_use]
    pub const fn rewards(self) -> TierRewards {
        match self {
            Self::Novice => TierRewards {
                node_gold: 10,
                boss_gold: 50,
                boss_dice: 1,
                completion_hearts: 1,
            },
            Self::Adept => TierRewards {
                node_gold: 20,
                boss_gold: 100,
                boss_dice: 2,
                completion_hearts: 1,
            },
            Self::Expert => TierRewards {
                node_gold: 35,
                boss_gold: 175,
                boss_dice: 3,
                completion_hearts: 2,
            },
            Self::Master => TierRewards {
                node_gold: 50,
                boss_gold: 250,
                boss_dice: 5,
                completion_hearts: 3,
            },
        }
    }

    fn node_reward(self, kind: NodeKind) -> SmallVec<[RewardGrant; 2]> {
        let rewards = self.rewards();
        let mut grants = SmallVec::new();
        if kind == NodeKind::Boss {
            grants.push(RewardGrant::gold(rewards.boss_gold));
            grants.push(RewardGrant::new(Currency::Dice, rewards.boss_dice));
        } else {
            grants.push(RewardGrant::gold(rewards.node_gold));
        }
        grants
    }
}

/// Layout bounds for node coordinates, in percent of the board canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignConfig {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
    pub x_jitter: f32,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            x_min: CAMPAIGN_X_MIN,
            x_max: CAMPAIGN_X_MAX,
            y_min: CAMPAIGN_Y_MIN,
            y_max: CAMPAIGN_Y_MAX,
            x_jitter: CAMPAIGN_X_JITTER,
        }
    }
}

impl CampaignConfig {
    fn x_bounds(&self) -> (f32, f32) {
        ordered(
            canvas_coord(self.x_min, CAMPAIGN_X_MIN),
            canvas_coord(self.x_max, CAMPAIGN_X_MAX),
        )
    }

    fn y_bounds(&self) -> (f32, f32) {
        ordered(
            canvas_coord(self.y_min, CAMPAIGN_Y_MIN),
            canvas_coord(self.y_max, CAMPAIGN_Y_MAX),
        )
    }

    /// Horizontal jitter magnitude; non-finite values disable jitter.
    fn jitter(&self) -> f32 {
        if self.x_jitter.is_finite() {
            self.x_jitter.abs().min(CAMPAIGN_CANVAS_MAX)
        } else {
            0.0
        }
    }
}

/// Keep a configured coordinate on the canvas, using `fallback` when it is
/// not finite.
fn canvas_coord(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, CAMPAIGN_CANVAS_MAX)
    } else {
        fallback
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    (a.min(b), a.max(b))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardNode {
    pub id: String,
    pub index: usize,
    pub kind: NodeKind,
    pub title: String,
    pub status: NodeStatus,
    pub x: f32,
    pub y: f32,
    pub reward: SmallVec<[RewardGrant; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignBoard {
    pub level: u32,
    pub theme: BoardTheme,
    pub tier: LevelTier,
    pub nodes: Vec<BoardNode>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl CampaignBoard {
    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.nodes
            .iter()
            .position(|node| node.status == NodeStatus::Active)
    }

    #[must_use]
    pub fn active_node(&self) -> Option<&BoardNode> {
        self.active_index().and_then(|idx| self.nodes.get(idx))
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.nodes.is_empty()
            && self
                .nodes
                .iter()
                .all(|node| node.status == NodeStatus::Completed)
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.status == NodeStatus::Completed)
            .count()
    }
}

/// Generate the board for `level` (levels start at 1).
#[must_use]
pub fn generate_board(seed: u64, level: u32, cfg: &CampaignConfig) -> CampaignBoard {
    let level = level.max(1);
    let tier = LevelTier::from_level(level);
    let theme = BoardTheme::for_level(level);
    let count = tier.node_count();
    let mut rng = ChaCha20Rng::seed_from_u64(derive_stream_seed(seed, &campaign_tag(level)));

    let (x_min, x_max) = cfg.x_bounds();
    let (y_min, y_max) = cfg.y_bounds();
    let step = if count > 1 {
        (x_max - x_min) / usize_to_f32(count - 1)
    } else {
        0.0
    };
    let jitter = cfg.jitter();

    let nodes = (0..count)
        .map(|index| {
            let kind = if index + 1 == count {
                NodeKind::Boss
            } else {
                choose_weighted(tier.kind_weights(), &mut rng)
                    .copied()
                    .unwrap_or(NodeKind::Habit)
            };
            let base_x = x_min + step * usize_to_f32(index);
            let x = clamp_finite(base_x + rng.gen_range(-jitter..=jitter), x_min, x_max);
            let y = rng.gen_range(y_min..=y_max);
            BoardNode {
                id: format!("L{level}-N{index}"),
                index,
                kind,
                title: kind.title(theme),
                status: if index == 0 {
                    NodeStatus::Active
                } else {
                    NodeStatus::Locked
                },
                x,
                y,
                reward: tier.node_reward(kind),
            }
        })
        .collect();

    CampaignBoard {
        level,
        theme,
        tier,
        nodes,
        completed_at: None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CampaignError {
    #[error("node {0} is not on the current board")]
    UnknownNode(String),
    #[error("node {0} is locked")]
    NodeLocked(String),
    #[error("node {0} is already completed")]
    AlreadyCompleted(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCompletion {
    pub node_id: String,
    pub grants: SmallVec<[RewardGrant; 4]>,
    pub board_completed: bool,
    pub next_level: Option<u32>,
}

/// Every board a user has generated, oldest first. The last board is the
/// one in play.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignProgress {
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub boards: Vec<CampaignBoard>,
}

impl CampaignProgress {
    #[must_use]
    pub fn new(seed: u64, cfg: &CampaignConfig) -> Self {
        Self {
            seed,
            boards: vec![generate_board(seed, 1, cfg)],
        }
    }

    /// Generate level 1 if nothing was loaded.
    pub fn ensure_started(&mut self, cfg: &CampaignConfig) {
        if self.boards.is_empty() {
            self.boards.push(generate_board(self.seed, 1, cfg));
        }
    }

    #[must_use]
    pub fn current_board(&self) -> Option<&CampaignBoard> {
        self.boards.last()
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.current_board().map_or(1, |board| board.level)
    }

    #[must_use]
    pub fn completed_boards(&self) -> usize {
        self.boards.iter().filter(|b| b.is_complete()).count()
    }

    /// Complete the active node of the current board.
    ///
    /// # Errors
    ///
    /// Fails when `node_id` is not the active node: unknown ids, locked
    /// nodes and nodes completed earlier are all rejected without changes.
    pub fn complete_node(
        &mut self,
        node_id: &str,
        ledger: &mut RewardLedger,
        cfg: &CampaignConfig,
        at: DateTime<Utc>,
    ) -> Result<NodeCompletion, CampaignError> {
        self.ensure_started(cfg);
        let seed = self.seed;
        let earlier_boards = self.boards.len().saturating_sub(1);
        let seen_before = self.boards[..earlier_boards]
            .iter()
            .any(|board| board.nodes.iter().any(|node| node.id == node_id));
        let Some(board) = self.boards.last_mut() else {
            return Err(CampaignError::UnknownNode(node_id.to_string()));
        };

        let Some(idx) = board.nodes.iter().position(|node| node.id == node_id) else {
            return Err(if seen_before {
                CampaignError::AlreadyCompleted(node_id.to_string())
            } else {
                CampaignError::UnknownNode(node_id.to_string())
            });
        };
        match board.nodes[idx].status {
            NodeStatus::Active => {}
            NodeStatus::Locked => return Err(CampaignError::NodeLocked(node_id.to_string())),
            NodeStatus::Completed => {
                return Err(CampaignError::AlreadyCompleted(node_id.to_string()));
            }
        }

        let mut grants: SmallVec<[RewardGrant; 4]> = SmallVec::new();
        let node = &mut board.nodes[idx];
        node.status = NodeStatus::Completed;
        let context = node.title.clone();
        ledger.apply_grants(RewardSource::Campaign, &node.reward, &context, at);
        grants.extend(node.reward.iter().copied());

        if let Some(next) = board.nodes.get_mut(idx + 1) {
            next.status = NodeStatus::Active;
        }

        let mut next_level = None;
        let board_completed = board.is_complete();
        if board_completed {
            board.completed_at = Some(at);
            let hearts = board.tier.rewards().completion_hearts;
            if hearts > 0 {
                let bonus = RewardGrant::new(Currency::Hearts, hearts);
                ledger.apply_grants(
                    RewardSource::Campaign,
                    &[bonus],
                    &format!("level {} cleared", board.level),
                    at,
                );
                grants.push(bonus);
            }
            let level = board.level.saturating_add(1);
            self.boards.push(generate_board(seed, level, cfg));
            next_level = Some(level);
        }

        Ok(NodeCompletion {
            node_id: node_id.to_string(),
            grants,
            board_completed,
            next_level,
        })
    }
}

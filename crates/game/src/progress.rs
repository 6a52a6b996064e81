//! Star count and level unlocks.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::level::LevelId;

/// Persistent player progress.
///
/// Saving and loading is left to the caller; the struct round-trips through
/// serde.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Stars collected across all levels.
    pub stars: u32,

    /// Level the player is in.
    pub current: LevelId,

    /// Levels that can be entered.
    pub unlocked: BTreeSet<LevelId>,

    /// Stars needed to unlock each gated level.
    pub requirements: BTreeMap<LevelId, u32>,
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    /// Fresh progress: in the hub with the grass world open.
    pub fn new() -> Self {
        Self {
            stars: 0,
            current: LevelId::Hub,
            unlocked: [LevelId::Hub, LevelId::Grass].into_iter().collect(),
            requirements: [(LevelId::Desert, 3), (LevelId::Ice, 8), (LevelId::Lava, 15)]
                .into_iter()
                .collect(),
        }
    }

    /// Stars needed for `level`, zero for ungated levels.
    pub fn requirement(&self, level: LevelId) -> u32 {
        self.requirements.get(&level).copied().unwrap_or(0)
    }

    /// Stars still missing before `level` opens.
    pub fn stars_needed(&self, level: LevelId) -> u32 {
        self.requirement(level).saturating_sub(self.stars)
    }

    /// Whether `level` can be entered.
    pub fn is_unlocked(&self, level: LevelId) -> bool {
        self.unlocked.contains(&level) || self.stars_needed(level) == 0
    }

    /// Count a collected star and return any levels it unlocked.
    pub fn collect_star(&mut self) -> Vec<LevelId> {
        self.stars += 1;

        let opened: Vec<LevelId> = self
            .requirements
            .iter()
            .filter(|(level, needed)| self.stars >= **needed && !self.unlocked.contains(*level))
            .map(|(&level, _)| level)
            .collect();
        self.unlocked.extend(opened.iter().copied());

        log::info!("star collected, total {}", self.stars);
        for level in &opened {
            log::info!("unlocked {}", level);
        }
        opened
    }

    /// Check that `level` may be entered.
    pub fn check_entry(&self, level: LevelId) -> GameResult<()> {
        if self.is_unlocked(level) {
            Ok(())
        } else {
            Err(GameError::LevelLocked {
                level,
                needed: self.stars_needed(level),
            })
        }
    }
}

//! Battle history and win/loss statistics.

use crate::{BattleRecord, BattleResult, Deck};
use chrono::{Local, NaiveDateTime};

/// Timestamp format used in deck files
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Aggregated battle statistics for a deck
#[derive(Clone, Debug, PartialEq)]
pub struct BattleStats {
    pub total: usize,
    pub wins: usize,
    pub losses: usize,
    /// `100 * wins / total`
    pub win_pct: f64,
    /// Loss count per opponent, in order of each opponent's first loss
    pub losses_by_opponent: Vec<(String, usize)>,
}

impl BattleStats {
    /// One `*` per win
    pub fn win_bar(&self) -> String {
        "*".repeat(self.wins)
    }

    /// One `*` per loss
    pub fn loss_bar(&self) -> String {
        "*".repeat(self.losses)
    }
}

impl Deck {
    /// Append a battle stamped with the current local time
    pub fn record_battle(&mut self, result: BattleResult, opponent: &str) -> &BattleRecord {
        self.record_battle_at(result, opponent, Local::now().naive_local())
    }

    /// Append a battle with an explicit timestamp
    pub fn record_battle_at(
        &mut self,
        result: BattleResult,
        opponent: &str,
        at: NaiveDateTime,
    ) -> &BattleRecord {
        let record = BattleRecord {
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            result,
            opponent: opponent.trim().to_string(),
        };
        tracing::info!(
            "Recorded {} against '{}' for deck '{}'",
            record.result,
            record.opponent,
            self.name
        );
        self.battle_history.push(record);
        &self.battle_history[self.battle_history.len() - 1]
    }

    /// Win/loss statistics, or `None` when no battles are recorded
    pub fn statistics(&self) -> Option<BattleStats> {
        let total = self.battle_history.len();
        if total == 0 {
            return None;
        }

        let mut wins = 0;
        let mut losses_by_opponent: Vec<(String, usize)> = Vec::new();
        for battle in &self.battle_history {
            match battle.result {
                BattleResult::Win => wins += 1,
                BattleResult::Loss => {
                    match losses_by_opponent
                        .iter_mut()
                        .find(|(opponent, _)| *opponent == battle.opponent)
                    {
                        Some((_, count)) => *count += 1,
                        None => losses_by_opponent.push((battle.opponent.clone(), 1)),
                    }
                }
            }
        }

        Some(BattleStats {
            total,
            wins,
            losses: total - wins,
            win_pct: 100.0 * wins as f64 / total as f64,
            losses_by_opponent,
        })
    }
}

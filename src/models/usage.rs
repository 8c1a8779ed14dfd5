use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-user character ledger.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Usage {
    pub user_id: i64,
    pub characters_used: i64,
    pub characters_remaining: i64,
    pub last_generated_at: Option<DateTime<Utc>>,
}

impl Usage {
    pub fn new(user_id: i64, characters_remaining: i64) -> Self {
        Self {
            user_id,
            characters_used: 0,
            characters_remaining,
            last_generated_at: None,
        }
    }

    pub fn can_afford(&self, cost: i64) -> bool {
        cost <= self.characters_remaining
    }

    /// Applies a charge in place. Returns false and leaves the ledger
    /// untouched when the balance is too small.
    pub fn charge(&mut self, cost: i64, at: DateTime<Utc>) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.characters_used += cost;
        self.characters_remaining -= cost;
        self.last_generated_at = Some(at);
        true
    }
}

//! Open positions.

use serde::{Deserialize, Serialize};

use crate::model::{Direction, Instrument};

/// An open position parsed from the positions table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub instrument: Instrument,
    pub quantity: f64,
    pub direction: Direction,
    /// Average entry price.
    pub price: f64,
    pub timestamp: Option<String>,
    pub exchange_id: Option<String>,
    pub margin: Option<f64>,
}

impl Position {
    pub fn new(
        instrument: Instrument,
        quantity: f64,
        direction: Direction,
        price: f64,
    ) -> Self {
        Self {
            instrument,
            quantity,
            direction,
            price,
            timestamp: None,
            exchange_id: None,
            margin: None,
        }
    }

    /// Unrealized gain at the given market price. Recomputed on demand,
    /// never cached.
    pub fn gain(&self, current_price: f64) -> f64 {
        let per_unit = match self.direction {
            Direction::Buy => current_price - self.price,
            Direction::Sell => self.price - current_price,
        };
        per_unit * self.quantity
    }
}

//! Orders: directions, statuses, order-type tables and the order record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Instrument;

/// Account partition. Each mode has its own instrument universe and order
/// semantics; collections are never merged across modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradingMode {
    Cfd,
    Invest,
    Isa,
}

impl TradingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradingMode::Cfd => "CFD",
            TradingMode::Invest => "INVEST",
            TradingMode::Isa => "ISA",
        }
    }
}

impl fmt::Display for TradingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "buy",
            Direction::Sell => "sell",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Direction::Buy),
            "sell" => Ok(Direction::Sell),
            other => Err(Error::Validation(format!(
                "direction must be \"buy\" or \"sell\", got {:?}",
                other
            ))),
        }
    }
}

/// Order lifecycle. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Placing,
    Placed,
    Filled,
    PartFilled,
    Cancelled,
}

impl OrderStatus {
    fn rank(&self) -> u8 {
        match self {
            OrderStatus::Placing => 0,
            OrderStatus::Placed => 1,
            OrderStatus::Filled | OrderStatus::PartFilled | OrderStatus::Cancelled => 2,
        }
    }
}

/// Invest/ISA order types, as listed by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvestOrderType {
    Market,
    Limit,
    Stop,
    StopLimit,
}

impl InvestOrderType {
    /// Translate the on-screen order-type label. Closed table; an unknown
    /// label is an error, never a default.
    pub fn from_label(label: &str) -> Result<Self> {
        match label {
            "Market" => Ok(InvestOrderType::Market),
            "Limit" => Ok(InvestOrderType::Limit),
            "Stop" => Ok(InvestOrderType::Stop),
            "Stop Limit" => Ok(InvestOrderType::StopLimit),
            other => Err(Error::Lookup(format!(
                "unknown invest order type label {:?}",
                other
            ))),
        }
    }
}

/// CFD order types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CfdOrderType {
    Market,
    LimitStop,
    Oco,
}

impl CfdOrderType {
    pub fn from_label(label: &str) -> Result<Self> {
        match label {
            "Market" => Ok(CfdOrderType::Market),
            "Stop Limit" => Ok(CfdOrderType::LimitStop),
            "OCO" => Ok(CfdOrderType::Oco),
            other => Err(Error::Lookup(format!(
                "unknown CFD order type label {:?}",
                other
            ))),
        }
    }
}

/// Order type across both families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    Invest(InvestOrderType),
    Cfd(CfdOrderType),
}

impl OrderType {
    /// Translate an on-screen label under the given trading mode.
    pub fn from_label(mode: TradingMode, label: &str) -> Result<Self> {
        match mode {
            TradingMode::Invest | TradingMode::Isa => {
                InvestOrderType::from_label(label).map(OrderType::Invest)
            }
            TradingMode::Cfd => CfdOrderType::from_label(label).map(OrderType::Cfd),
        }
    }

    /// Lower-cased key naming the order-control surface for this type.
    pub fn control_key(&self) -> &'static str {
        match self {
            OrderType::Invest(InvestOrderType::Market) | OrderType::Cfd(CfdOrderType::Market) => {
                "market"
            }
            OrderType::Invest(InvestOrderType::Limit) => "limit",
            OrderType::Invest(InvestOrderType::Stop) => "stop",
            OrderType::Invest(InvestOrderType::StopLimit) => "stop_limit",
            OrderType::Cfd(CfdOrderType::LimitStop) => "limit_stop",
            OrderType::Cfd(CfdOrderType::Oco) => "oco",
        }
    }

    pub fn is_market(&self) -> bool {
        matches!(
            self,
            OrderType::Invest(InvestOrderType::Market) | OrderType::Cfd(CfdOrderType::Market)
        )
    }
}

/// Variant-specific order payload. Closed dispatch from the order type;
/// never an open registry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderDetail {
    Plain,
    CfdMarket {
        take_profit: Option<f64>,
        stop_loss: Option<f64>,
    },
    InvestMarket {
        by_value: bool,
    },
}

impl OrderDetail {
    /// The detail variant a given order type instantiates.
    pub fn for_type(order_type: OrderType) -> Self {
        match order_type {
            OrderType::Invest(InvestOrderType::Market) => {
                OrderDetail::InvestMarket { by_value: false }
            }
            OrderType::Cfd(CfdOrderType::Market) => OrderDetail::CfdMarket {
                take_profit: None,
                stop_loss: None,
            },
            _ => OrderDetail::Plain,
        }
    }
}

/// A placed or in-flight order.
///
/// `exchange_id` is assigned once the broker confirms the order; until then
/// the locally derived `api_id` fingerprint correlates it with its
/// broker-side row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub instrument: Instrument,
    pub quantity: f64,
    pub price: f64,
    pub direction: Direction,
    pub order_type: OrderType,
    pub cost: f64,
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    pub exchange_id: Option<String>,
    /// Creation time as displayed by the broker, for rows parsed off the
    /// pending-orders table.
    pub exchange_timestamp: Option<String>,
    pub limit: Option<f64>,
    pub stop: Option<f64>,
    pub detail: OrderDetail,
}

impl Order {
    pub fn new(
        instrument: Instrument,
        quantity: f64,
        price: f64,
        direction: Direction,
        order_type: OrderType,
        cost: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            instrument,
            quantity,
            price,
            direction,
            order_type,
            cost,
            status: OrderStatus::Placing,
            timestamp,
            exchange_id: None,
            exchange_timestamp: None,
            limit: None,
            stop: None,
            detail: OrderDetail::for_type(order_type),
        }
    }

    /// Deterministic fingerprint of (direction, symbol, quantity, price),
    /// stable across re-derivation.
    pub fn api_id(&self) -> String {
        serde_json::json!([
            self.direction.as_str().to_ascii_uppercase(),
            self.instrument.symbol,
            self.quantity,
            self.price,
        ])
        .to_string()
    }

    /// Move the status forward. A regression is a validation error.
    pub fn advance(&mut self, next: OrderStatus) -> Result<()> {
        if next.rank() < self.status.rank() {
            return Err(Error::Validation(format!(
                "order status cannot move from {:?} back to {:?}",
                self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }
}

//! Typed domain records and their lookup tables.

pub mod instrument;
pub mod order;
pub mod position;

pub use instrument::{Instrument, InstrumentBook};
pub use order::{
    CfdOrderType, Direction, InvestOrderType, Order, OrderDetail, OrderStatus, OrderType,
    TradingMode,
};
pub use position::Position;

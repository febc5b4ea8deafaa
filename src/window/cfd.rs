//! CFD order window.

use chrono::Utc;
use tracing::debug;

use crate::driver::{Dom, Selector};
use crate::error::{Error, Result};
use crate::model::{CfdOrderType, Direction, Instrument, Order, OrderDetail, OrderType};
use crate::selectors;
use crate::text::num;
use crate::window::{
    LimitCategory, LimitMode, OrderSink, OrderWindow, Ticket, WindowState,
};

/// Trade ticket for the CFD account: explicit buy/sell direction, prices
/// quoted per direction, single-click confirmation.
pub struct CfdOrderWindow {
    ticket: Ticket,
    order_type: CfdOrderType,
    direction: Option<Direction>,
}

impl CfdOrderWindow {
    pub fn new(
        dom: Dom,
        instrument: Instrument,
        order_type: CfdOrderType,
        orders: OrderSink,
    ) -> Self {
        Self {
            ticket: Ticket::new(dom, instrument, OrderType::Cfd(order_type), orders),
            order_type,
            direction: None,
        }
    }

    pub fn set_direction(&mut self, direction: Direction) -> Result<()> {
        self.ticket.ensure_open()?;
        let button = match direction {
            Direction::Buy => selectors::BUY_BUTTON,
            Direction::Sell => selectors::SELL_BUTTON,
        };
        self.ticket.dom.click_on(&Selector::css(button), None)?;
        self.direction = Some(direction);
        debug!("direction set to {}", direction);
        Ok(())
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Margin requirement for this order. The platform only quotes margin
    /// on the market ticket, so every other order type reads 0. That
    /// asymmetry is the platform's, not a parsing gap.
    pub fn get_margin_info(&mut self) -> Result<f64> {
        self.ticket.ensure_open()?;
        if self.order_type != CfdOrderType::Market {
            return Ok(0.0);
        }
        let control = *self.ticket.control()?;
        let costs = self
            .ticket
            .dom
            .find_one(&Selector::css(selectors::ORDER_COSTS), Some(&control))?;
        let text = self.ticket.dom.read_text(&costs)?;
        Ok(num(&text).unwrap_or(0.0))
    }

    pub fn insufficient_funds(&self) -> bool {
        self.ticket.insufficient_funds
    }
}

impl OrderWindow for CfdOrderWindow {
    fn open(&mut self) -> Result<()> {
        self.ticket.open()
    }

    fn close(&mut self) -> Result<()> {
        self.ticket.close()
    }

    fn state(&self) -> WindowState {
        self.ticket.state
    }

    fn set_quantity(&mut self, quantity: f64) -> Result<()> {
        self.ticket.set_quantity(quantity)
    }

    fn get_quantity(&mut self) -> Result<f64> {
        let quantity = self.ticket.read_quantity_field()?;
        self.ticket.quantity = Some(quantity);
        Ok(quantity)
    }

    fn set_limit(&mut self, category: LimitCategory, mode: LimitMode, value: f64) -> Result<()> {
        self.ticket.set_limit(category, mode, value)
    }

    /// Current price on the side matching the set direction.
    fn get_price(&mut self) -> Result<f64> {
        self.ticket.ensure_open()?;
        let direction = self
            .direction
            .ok_or_else(|| Error::Validation("direction must be set before reading price".into()))?;
        let price_sel = Selector::css(format!(
            "div.buy-sell-control-container div.{}-price",
            direction.as_str()
        ));
        let element = self.ticket.dom.find_one(&price_sel, None)?;
        let text = self.ticket.dom.read_text(&element)?;
        let price = num(&text)
            .ok_or_else(|| Error::Validation(format!("unreadable {} price: {:?}", direction, text)))?;
        self.ticket.price = Some(price);
        Ok(price)
    }

    fn confirm(&mut self) -> Result<Order> {
        self.ticket.ensure_open()?;
        let quantity = self
            .ticket
            .quantity
            .ok_or_else(|| Error::Validation("quantity must be set before confirming".into()))?;
        let direction = self
            .direction
            .ok_or_else(|| Error::Validation("direction must be set before confirming".into()))?;

        // Price can move between set_quantity and confirm; read it fresh.
        let price = self.get_price()?;
        let cost = price * quantity;

        let control = *self.ticket.control()?;
        self.ticket
            .dom
            .click_on(&Selector::css(selectors::CONFIRM_BUTTON), Some(&control))?;
        self.ticket.check_widget()?;

        let mut order = Order::new(
            self.ticket.instrument.clone(),
            quantity,
            price,
            direction,
            OrderType::Cfd(self.order_type),
            cost,
            Utc::now(),
        );
        if let OrderDetail::CfdMarket {
            take_profit,
            stop_loss,
        } = &mut order.detail
        {
            *take_profit = self.ticket.gain_limit.map(|l| l.value);
            *stop_loss = self.ticket.loss_limit.map(|l| l.value);
        }
        self.ticket.commit(order)
    }
}

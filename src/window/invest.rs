//! Invest/ISA order window.
//!
//! Fractional instruments can be sized by currency value instead of share
//! count. When `by_value` is active the raw quantity field holds a currency
//! amount and the effective share quantity is derived from the current
//! price; the broker may fill a slightly different quantity once the order
//! executes. The stored quantity is always a share count.

use chrono::Utc;
use tracing::debug;

use crate::driver::{Dom, Selector};
use crate::error::{Error, Result};
use crate::model::{Direction, Instrument, InvestOrderType, Order, OrderDetail, OrderType};
use crate::selectors;
use crate::text::num;
use crate::window::{
    LimitCategory, LimitMode, OrderSink, OrderWindow, Ticket, WindowState,
};

pub struct InvestOrderWindow {
    ticket: Ticket,
    order_type: InvestOrderType,
    by_value: bool,
}

impl InvestOrderWindow {
    pub fn new(
        dom: Dom,
        instrument: Instrument,
        order_type: InvestOrderType,
        orders: OrderSink,
    ) -> Self {
        Self {
            ticket: Ticket::new(dom, instrument, OrderType::Invest(order_type), orders),
            order_type,
            by_value: false,
        }
    }

    /// Switch the ticket between share-count and currency-value sizing.
    ///
    /// Returns false without touching the page when the toggle is disabled
    /// (fixed-lot instrument).
    pub fn toggle_shares_by_value(&mut self, by_value: bool) -> Result<bool> {
        self.ticket.ensure_open()?;
        self.by_value = by_value;
        let control = *self.ticket.control()?;
        if self
            .ticket
            .dom
            .exists(&Selector::css(selectors::INVEST_BY_DISABLED), Some(&control))
        {
            return Ok(false);
        }
        self.ticket
            .dom
            .click_on(&Selector::css(selectors::INVEST_BY_CONTENT), Some(&control))?;
        let option = if by_value {
            selectors::INVEST_BY_VALUE
        } else {
            selectors::INVEST_BY_QUANTITY
        };
        self.ticket
            .dom
            .click_on(&Selector::css(option), Some(&control))?;
        Ok(true)
    }

    /// Size the order. With `by_value` the raw field receives the currency
    /// amount and the recorded share quantity is `amount / price`, an
    /// approximation that can diverge from the broker's actual fill.
    pub fn set_quantity_by(&mut self, quantity: f64, by_value: bool) -> Result<()> {
        self.toggle_shares_by_value(by_value)?;
        if !by_value {
            return self.ticket.set_quantity(quantity);
        }
        debug!("sizing {} by value: {}", self.ticket.instrument.short_name, quantity);
        self.ticket.fill_quantity_field(quantity)?;
        let price = self.get_price()?;
        self.ticket.quantity = Some(quantity / price);
        Ok(())
    }

    pub fn by_value(&self) -> bool {
        self.by_value
    }

    pub fn insufficient_funds(&self) -> bool {
        self.ticket.insufficient_funds
    }
}

impl OrderWindow for InvestOrderWindow {
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
        self.set_quantity_by(quantity, false)
    }

    /// Effective share quantity. With `by_value` the raw field holds a
    /// currency amount, so the share count is that amount over the current
    /// price.
    fn get_quantity(&mut self) -> Result<f64> {
        let raw = self.ticket.read_quantity_field()?;
        let quantity = if self.by_value {
            raw / self.get_price()?
        } else {
            raw
        };
        self.ticket.quantity = Some(quantity);
        Ok(quantity)
    }

    fn set_limit(&mut self, category: LimitCategory, mode: LimitMode, value: f64) -> Result<()> {
        self.ticket.set_limit(category, mode, value)
    }

    fn get_price(&mut self) -> Result<f64> {
        self.ticket.ensure_open()?;
        let element = self
            .ticket
            .dom
            .find_one(&Selector::css(selectors::INVEST_PRICE), None)?;
        let text = self.ticket.dom.read_text(&element)?;
        let price = num(&text)
            .ok_or_else(|| Error::Validation(format!("unreadable fund price: {:?}", text)))?;
        self.ticket.price = Some(price);
        Ok(price)
    }

    /// Two-step commit: review, then an explicit send, with a widget check
    /// after each step. Invest orders are always buys.
    fn confirm(&mut self) -> Result<Order> {
        self.ticket.ensure_open()?;
        let quantity = self
            .ticket
            .quantity
            .ok_or_else(|| Error::Validation("quantity must be set before confirming".into()))?;

        let price = self.get_price()?;
        let cost = price * quantity;

        let control = *self.ticket.control()?;
        self.ticket
            .dom
            .click_on(&Selector::css(selectors::REVIEW_ORDER_BUTTON), Some(&control))?;
        self.ticket.check_widget()?;

        let send = self
            .ticket
            .dom
            .wait_for(&Selector::css(selectors::SEND_ORDER_BUTTON))
            .ok_or_else(|| Error::Automation("send-order step never appeared".into()))?;
        self.ticket.dom.click(&send)?;
        self.ticket.check_widget()?;

        let mut order = Order::new(
            self.ticket.instrument.clone(),
            quantity,
            price,
            Direction::Buy,
            OrderType::Invest(self.order_type),
            cost,
            Utc::now(),
        );
        if let OrderDetail::InvestMarket { by_value } = &mut order.detail {
            *by_value = self.by_value;
        }
        self.ticket.commit(order)
    }
}

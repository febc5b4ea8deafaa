//! Order-ticket modal windows.
//!
//! A window walks `Initialized → Opening → Open`, then either `Conclused`
//! (order submitted) or `Closed` (aborted). The shared [`Ticket`] drives the
//! surface: it opens the modal, searches the instrument, binds the
//! order-control container for the chosen order type, and decodes any inline
//! validation widget the platform raises.

pub mod cfd;
pub mod invest;

pub use cfd::CfdOrderWindow;
pub use invest::InvestOrderWindow;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::driver::{Dom, ElementRef, Selector};
use crate::error::{Error, Result};
use crate::model::{Instrument, Order, OrderType};
use crate::selectors;
use crate::text::{num, num_in_text};

/// Where confirmed orders land: the session's per-mode order list.
pub type OrderSink = Arc<RwLock<Vec<Order>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Initialized,
    Opening,
    Open,
    /// Terminal success: the order was submitted.
    Conclused,
    /// Terminal abort.
    Closed,
}

impl WindowState {
    pub fn name(&self) -> &'static str {
        match self {
            WindowState::Initialized => "initialized",
            WindowState::Opening => "opening",
            WindowState::Open => "open",
            WindowState::Conclused => "conclused",
            WindowState::Closed => "closed",
        }
    }
}

impl fmt::Display for WindowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitCategory {
    Gain,
    Loss,
    Both,
}

impl FromStr for LimitCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gain" => Ok(LimitCategory::Gain),
            "loss" => Ok(LimitCategory::Loss),
            "both" => Ok(LimitCategory::Both),
            other => Err(Error::Validation(format!(
                "limit category must be gain, loss or both, got {:?}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitMode {
    Unit,
    Value,
}

impl FromStr for LimitMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unit" => Ok(LimitMode::Unit),
            "value" => Ok(LimitMode::Value),
            other => Err(Error::Validation(format!(
                "limit mode must be unit or value, got {:?}",
                other
            ))),
        }
    }
}

/// Last-set stop/gain limit for one category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitSetting {
    pub mode: LimitMode,
    pub value: f64,
}

/// The operations every order window supports.
pub trait OrderWindow {
    fn open(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;
    fn state(&self) -> WindowState;
    fn set_quantity(&mut self, quantity: f64) -> Result<()>;
    fn get_quantity(&mut self) -> Result<f64>;
    fn set_limit(&mut self, category: LimitCategory, mode: LimitMode, value: f64) -> Result<()>;
    fn get_price(&mut self) -> Result<f64>;
    /// Submit the order. On success the built order is appended to the
    /// session's order list and the window reaches `Conclused`.
    fn confirm(&mut self) -> Result<Order>;
}

/// Shared order-ticket machinery behind both window variants.
pub(crate) struct Ticket {
    pub dom: Dom,
    /// The instrument this ticket trades; its short name is the search query.
    pub instrument: Instrument,
    pub order_type: OrderType,
    pub state: WindowState,
    pub quantity: Option<f64>,
    pub price: Option<f64>,
    pub order_control: Option<ElementRef>,
    /// Set when the platform reports insufficient funds; not an error.
    pub insufficient_funds: bool,
    pub gain_limit: Option<LimitSetting>,
    pub loss_limit: Option<LimitSetting>,
    orders: OrderSink,
}

impl Ticket {
    pub fn new(dom: Dom, instrument: Instrument, order_type: OrderType, orders: OrderSink) -> Self {
        Self {
            dom,
            instrument,
            order_type,
            state: WindowState::Initialized,
            quantity: None,
            price: None,
            order_control: None,
            insufficient_funds: false,
            gain_limit: None,
            loss_limit: None,
            orders,
        }
    }

    pub fn ensure_open(&self) -> Result<()> {
        if self.state == WindowState::Open {
            Ok(())
        } else {
            Err(Error::Window(self.state.name()))
        }
    }

    fn ensure_closeable(&self) -> Result<()> {
        match self.state {
            WindowState::Open | WindowState::Opening => Ok(()),
            _ => Err(Error::Window(self.state.name())),
        }
    }

    /// Open the ticket modal, search the instrument and bind the
    /// order-control surface for this order type.
    pub fn open(&mut self) -> Result<()> {
        self.state = WindowState::Opening;

        let add = self.dom.find_one(&Selector::css(selectors::NEW_ORDER), None)?;
        if self.dom.is_displayed(&add)? {
            self.dom.click(&add)?;
        } else {
            self.dom
                .click_on(&Selector::css(selectors::NEW_ORDER_FALLBACK), None)?;
        }
        debug!("opened new order window");

        let search = self.dom.find_one(&Selector::css(selectors::SEARCH_BOX), None)?;
        let query = self.instrument.short_name.clone();
        self.dom.fill(&search, &query)?;

        let results = self
            .dom
            .find_all(&Selector::xpath(selectors::FIRST_RESULT), None)?;
        let first = match results.into_iter().next() {
            Some(el) => el,
            None => {
                self.close()?;
                return Err(Error::ProductNotFound(self.instrument.short_name.clone()));
            }
        };
        self.dom.click(&first)?;

        // The platform sometimes raises an inline widget straight away.
        if self.dom.exists(&Selector::css(selectors::WIDGET_MESSAGE), None) {
            let widget = self
                .dom
                .find_one(&Selector::css(selectors::WIDGET_MESSAGE), None)?;
            let text = self.dom.read_text(&widget)?;
            self.decode(&text)?;
        }

        self.bind_order_control()?;
        self.state = WindowState::Open;
        Ok(())
    }

    /// Activate and hold the control container keyed by the lower-cased
    /// order-type name.
    fn bind_order_control(&mut self) -> Result<()> {
        let key = self.order_type.control_key();
        self.dom.click_on(
            &Selector::xpath(format!("//span[@data-tab='{}-order']", key)),
            None,
        )?;
        let control = self
            .dom
            .find_one(&Selector::css(format!("#{}-order", key)), None)?;
        self.order_control = Some(control);
        Ok(())
    }

    pub fn control(&self) -> Result<&ElementRef> {
        self.order_control
            .as_ref()
            .ok_or(Error::Window("no order control bound"))
    }

    pub fn close(&mut self) -> Result<()> {
        self.ensure_closeable()?;
        self.dom
            .click_on(&Selector::css(selectors::CLOSE_WINDOW), None)?;
        self.state = WindowState::Closed;
        debug!("closed order window for {}", self.instrument.short_name);
        Ok(())
    }

    /// Decode inline validation text. Insufficient funds is flagged, the
    /// quantity bounds raise with the parsed boundary; anything else is
    /// logged and ignored.
    pub fn decode(&mut self, message: &str) -> Result<()> {
        let text = message.trim().to_lowercase();
        if text.contains("you have funds to") {
            self.insufficient_funds = true;
        } else if text.contains("maximum remaining quantity") {
            return Err(Error::MaxQuantity(num_in_text(&text).unwrap_or(0.0)));
        } else if text.contains("minimum") {
            return Err(Error::MinQuantity(num_in_text(&text).unwrap_or(0.0)));
        } else {
            debug!("unrecognized widget message: {:?}", message.trim());
        }
        Ok(())
    }

    /// Fail with `Error::Widget` if a validation widget sits in the order
    /// control after a submit step.
    pub fn check_widget(&mut self) -> Result<()> {
        let control = *self.control()?;
        let widgets = self
            .dom
            .find_all(&Selector::css(selectors::WIDGET_MESSAGE), Some(&control))?;
        if let Some(widget) = widgets.first() {
            let text = self.dom.read_text(widget)?;
            self.decode(&text)?;
            return Err(Error::Widget(text));
        }
        Ok(())
    }

    fn quantity_input(&self) -> Result<ElementRef> {
        let control = *self.control()?;
        self.dom
            .find_one(&Selector::css(selectors::QUANTITY_INPUT), Some(&control))
    }

    /// Write the raw quantity field without recording a share count.
    pub fn fill_quantity_field(&mut self, raw: f64) -> Result<()> {
        self.ensure_open()?;
        let input = self.quantity_input()?;
        self.dom.fill(&input, &format_quantity(raw))?;
        Ok(())
    }

    pub fn set_quantity(&mut self, quantity: f64) -> Result<()> {
        self.fill_quantity_field(quantity)?;
        self.quantity = Some(quantity);
        debug!("quantity set: {} to {}", self.instrument.short_name, quantity);
        Ok(())
    }

    /// Read the raw quantity field back.
    pub fn read_quantity_field(&self) -> Result<f64> {
        self.ensure_open()?;
        let input = self.quantity_input()?;
        let raw = self.dom.read_attribute(&input, "value")?;
        num(&raw).ok_or_else(|| Error::Validation("quantity field is empty".to_string()))
    }

    pub fn set_limit(&mut self, category: LimitCategory, mode: LimitMode, value: f64) -> Result<()> {
        self.ensure_open()?;
        let setting = LimitSetting { mode, value };
        match category {
            LimitCategory::Gain => {
                self.fill_limit_field(LimitCategory::Gain, mode, value)?;
                self.gain_limit = Some(setting);
            }
            LimitCategory::Loss => {
                self.fill_limit_field(LimitCategory::Loss, mode, value)?;
                self.loss_limit = Some(setting);
            }
            LimitCategory::Both => {
                self.fill_limit_field(LimitCategory::Gain, mode, value)?;
                self.fill_limit_field(LimitCategory::Loss, mode, value)?;
                self.gain_limit = Some(setting);
                self.loss_limit = Some(setting);
            }
        }
        debug!("set {:?} limit to {} ({:?})", category, value, mode);
        Ok(())
    }

    fn fill_limit_field(&self, category: LimitCategory, mode: LimitMode, value: f64) -> Result<()> {
        let path = match (category, mode) {
            (LimitCategory::Gain, LimitMode::Unit) => selectors::LIMIT_GAIN_UNIT,
            (LimitCategory::Gain, LimitMode::Value) => selectors::LIMIT_GAIN_VALUE,
            (LimitCategory::Loss, LimitMode::Unit) => selectors::LIMIT_LOSS_UNIT,
            (LimitCategory::Loss, LimitMode::Value) => selectors::LIMIT_LOSS_VALUE,
            (LimitCategory::Both, _) => unreachable!("expanded by caller"),
        };
        let field = self.dom.find_one(&Selector::xpath(path), None)?;
        self.dom.fill(&field, &format_quantity(value))
    }

    /// Record the placed order in the session's list and conclude.
    pub fn commit(&mut self, order: Order) -> Result<Order> {
        info!(
            "{} x {} @ {} PLACED",
            order.quantity, order.instrument.symbol, order.price
        );
        self.orders.write().push(order.clone());
        self.state = WindowState::Conclused;
        Ok(order)
    }
}

/// Render a quantity for an input field: whole numbers without the
/// trailing fraction.
fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

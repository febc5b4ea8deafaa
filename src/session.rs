//! Session facade.
//!
//! A `Session` owns the browser-side state for one logged-in account:
//! which trading mode is active, the per-mode instrument/order/position
//! caches, and the single-surface rule shared by every table and modal.
//! All order windows and table readers are created through it so they see
//! the same caches and the same surface flag.

use std::sync::Arc;

use chrono::{Datelike, Weekday};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::cache::InstrumentCache;
use crate::config::Config;
use crate::driver::{Dom, Driver, Selector};
use crate::error::{Error, Result};
use crate::model::{
    CfdOrderType, Instrument, InstrumentBook, InvestOrderType, Order, Position, TradingMode,
};
use crate::selectors;
use crate::tabs::{PendingOrdersTab, PositionsTab, SearchInstrumentsModal, SurfaceFlag};
use crate::text::num;
use crate::window::{CfdOrderWindow, InvestOrderWindow, OrderSink};

/// Caches for one trading mode. Modes never share state.
#[derive(Default)]
struct ModeBook {
    instruments: Arc<InstrumentBook>,
    orders: OrderSink,
    positions: RwLock<Vec<Position>>,
}

#[derive(Default)]
struct Books {
    cfd: ModeBook,
    invest: ModeBook,
    isa: ModeBook,
}

impl Books {
    fn for_mode(&self, mode: TradingMode) -> &ModeBook {
        match mode {
            TradingMode::Cfd => &self.cfd,
            TradingMode::Invest => &self.invest,
            TradingMode::Isa => &self.isa,
        }
    }
}

pub struct Session {
    dom: Dom,
    config: Config,
    cache: InstrumentCache,
    mode: TradingMode,
    is_live: bool,
    logged_in: bool,
    books: Books,
    surface: SurfaceFlag,
}

impl Session {
    pub fn new(driver: Arc<dyn Driver>, config: Config) -> Self {
        let cache = InstrumentCache::new(config.cache_dir.clone());
        Self {
            dom: Dom::new(driver, config.clone()),
            config,
            cache,
            mode: TradingMode::Invest,
            is_live: false,
            logged_in: false,
            books: Books::default(),
            surface: SurfaceFlag::default(),
        }
    }

    pub fn mode(&self) -> TradingMode {
        self.mode
    }

    pub fn is_live(&self) -> bool {
        self.is_live
    }

    /// Log in and land on the requested account mode.
    ///
    /// Success is the post-login logo appearing within the login deadline;
    /// anything else, including a silently rejected password, reads as a
    /// credentials failure.
    pub fn login(
        &mut self,
        username: &str,
        password: &str,
        mode: TradingMode,
        is_live: bool,
    ) -> Result<()> {
        self.dom.navigate(self.config.urls.login.as_str())?;

        let user_field = self
            .dom
            .find_one(&Selector::name(selectors::LOGIN_USERNAME), None)?;
        self.dom.fill(&user_field, username)?;
        let pass_field = self
            .dom
            .find_one(&Selector::name(selectors::LOGIN_PASSWORD), None)?;
        self.dom.fill(&pass_field, password)?;
        self.dom
            .click_on(&Selector::css(selectors::LOGIN_SUBMIT), None)?;

        if self
            .dom
            .wait_for_within(
                &Selector::css(selectors::LOGO),
                self.config.login_timeout,
            )
            .is_none()
        {
            return Err(Error::Credentials(username.to_string()));
        }
        info!("logged in as {}", username);
        self.logged_in = true;
        self.is_live = is_live;
        self.dismiss_interruptions()?;
        self.go_to_mode(mode, is_live, false)
    }

    /// Switch the account to another mode and environment. With `autoload`
    /// the mode's instrument, order and position caches are refreshed once
    /// the page settles.
    pub fn go_to_mode(&mut self, mode: TradingMode, is_live: bool, autoload: bool) -> Result<()> {
        if !self.logged_in {
            return Err(Error::Validation("not logged in".into()));
        }
        let root = if is_live {
            &self.config.urls.live
        } else {
            &self.config.urls.demo
        };
        self.dom.navigate(root.as_str())?;
        self.dom
            .click_on(&Selector::css(selectors::ACCOUNT_MENU), None)?;
        let item = format!("{}.{}", selectors::ACCOUNT_ITEM, mode_class(mode));
        self.dom.click_on(&Selector::css(item), None)?;

        self.mode = mode;
        self.is_live = is_live;
        // The page was replaced; no surface survives navigation.
        *self.surface.write() = None;
        self.dismiss_interruptions()?;
        info!("switched to {} ({})", mode, if is_live { "live" } else { "demo" });

        if autoload {
            self.load_instruments(false)?;
            self.refresh_orders()?;
            self.refresh_positions()?;
        }
        Ok(())
    }

    /// Close the interstitials the platform likes to raise after landing:
    /// the weekend-trading alert (demo accounts, Friday through Sunday) and
    /// the new-account onboarding popup.
    fn dismiss_interruptions(&self) -> Result<()> {
        let day = chrono::Utc::now().weekday();
        let weekend = matches!(day, Weekday::Fri | Weekday::Sat | Weekday::Sun);
        if weekend
            && !self.is_live
            && self
                .dom
                .exists(&Selector::css(selectors::WEEKEND_ALERT_CLOSE), None)
        {
            self.dom
                .click_on(&Selector::css(selectors::WEEKEND_ALERT_CLOSE), None)?;
            debug!("dismissed weekend trading alert");
        }
        if self
            .dom
            .exists(&Selector::css(selectors::NEW_ACCOUNT_MODAL_CLOSE), None)
        {
            self.dom
                .click_on(&Selector::css(selectors::NEW_ACCOUNT_MODAL_CLOSE), None)?;
            debug!("dismissed new-account popup");
        }
        Ok(())
    }

    /// Read one named metric off the account equity bar. Closed name table;
    /// an unknown metric is a lookup error.
    pub fn account_metric(&self, name: &str) -> Result<f64> {
        let label = match name {
            "free_funds" => "equity-free",
            "blocked_funds" => "equity-blocked",
            "account_value" => "equity-total",
            "live_result" => "equity-ppl",
            "used_margin" => "equity-margin",
            other => {
                return Err(Error::Lookup(format!("unknown account metric {:?}", other)))
            }
        };
        let selector = Selector::css(format!("div#{} {}", label, selectors::EQUITY_ITEM_VALUE));
        let element = self.dom.find_one(&selector, None)?;
        let text = self.dom.read_text(&element)?;
        num(&text).ok_or_else(|| {
            Error::Validation(format!("unreadable {} metric: {:?}", name, text))
        })
    }

    /// Ensure the active mode's instrument universe is loaded: from memory
    /// if already present, else from the on-disk cache, else by scanning the
    /// search modal (which also rewrites the disk cache).
    pub fn load_instruments(&mut self, force_reload: bool) -> Result<usize> {
        let book = self.books.for_mode(self.mode);
        if !force_reload && !book.instruments.is_empty() {
            return Ok(book.instruments.len());
        }
        if !force_reload {
            if let Some(cached) = self.cache.load(self.mode)? {
                book.instruments.load(cached);
                return Ok(book.instruments.len());
            }
        }
        let mut modal = SearchInstrumentsModal::new(self.dom.clone(), self.surface.clone());
        modal.open()?;
        let scanned = modal.load_all()?;
        modal.close()?;
        self.cache.store(self.mode, &scanned)?;
        let book = self.books.for_mode(self.mode);
        book.instruments.load(scanned);
        Ok(book.instruments.len())
    }

    /// Resolve an instrument by short name, full name or symbol.
    pub fn get_instrument(&mut self, query: &str) -> Result<Instrument> {
        self.load_instruments(false)?;
        self.books
            .for_mode(self.mode)
            .instruments
            .lookup(query)
            .ok_or_else(|| Error::ProductNotFound(query.to_string()))
    }

    /// Snapshot of orders placed or loaded this session, for the active mode.
    pub fn orders(&self) -> Vec<Order> {
        self.books.for_mode(self.mode).orders.read().clone()
    }

    /// Snapshot of the last loaded positions for the active mode.
    pub fn positions(&self) -> Vec<Position> {
        self.books.for_mode(self.mode).positions.read().clone()
    }

    /// Reload the pending-orders table into the mode's order list.
    pub fn refresh_orders(&mut self) -> Result<Vec<Order>> {
        let mut tab = self.pending_orders_tab();
        tab.open()?;
        let orders = tab.orders()?;
        tab.close()?;
        *self.books.for_mode(self.mode).orders.write() = orders.clone();
        Ok(orders)
    }

    /// Reload the positions table into the mode's position list.
    pub fn refresh_positions(&mut self) -> Result<Vec<Position>> {
        let mut tab = self.positions_tab();
        tab.open()?;
        let positions = tab.positions()?;
        tab.close()?;
        *self.books.for_mode(self.mode).positions.write() = positions.clone();
        Ok(positions)
    }

    /// Ticket for a CFD order. Only valid while the CFD mode is active.
    pub fn cfd_order_window(
        &mut self,
        query: &str,
        order_type: CfdOrderType,
    ) -> Result<CfdOrderWindow> {
        if self.mode != TradingMode::Cfd {
            return Err(Error::Validation(format!(
                "CFD orders require the CFD mode, current mode is {}",
                self.mode
            )));
        }
        let instrument = self.get_instrument(query)?;
        let orders = self.books.for_mode(self.mode).orders.clone();
        Ok(CfdOrderWindow::new(
            self.dom.clone(),
            instrument,
            order_type,
            orders,
        ))
    }

    /// Ticket for an Invest/ISA order. Only valid in a share-dealing mode.
    pub fn invest_order_window(
        &mut self,
        query: &str,
        order_type: InvestOrderType,
    ) -> Result<InvestOrderWindow> {
        if self.mode == TradingMode::Cfd {
            return Err(Error::Validation(
                "share-dealing orders require the Invest or ISA mode".into(),
            ));
        }
        let instrument = self.get_instrument(query)?;
        let orders = self.books.for_mode(self.mode).orders.clone();
        Ok(InvestOrderWindow::new(
            self.dom.clone(),
            instrument,
            order_type,
            orders,
        ))
    }

    pub fn pending_orders_tab(&self) -> PendingOrdersTab {
        let book = self.books.for_mode(self.mode);
        PendingOrdersTab::new(
            self.dom.clone(),
            self.mode,
            book.instruments.clone(),
            self.surface.clone(),
        )
    }

    pub fn positions_tab(&self) -> PositionsTab {
        let book = self.books.for_mode(self.mode);
        PositionsTab::new(
            self.dom.clone(),
            self.mode,
            book.instruments.clone(),
            self.surface.clone(),
        )
    }

    pub fn search_modal(&self) -> SearchInstrumentsModal {
        SearchInstrumentsModal::new(self.dom.clone(), self.surface.clone())
    }
}

fn mode_class(mode: TradingMode) -> &'static str {
    match mode {
        TradingMode::Cfd => "cfd",
        TradingMode::Invest => "equity",
        TradingMode::Isa => "isa",
    }
}

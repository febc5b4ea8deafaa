//! Modal-backed table surfaces.
//!
//! Orders, positions and instrument search each live behind one on-screen
//! tab or modal. Only one surface may be open at a time: every `open`
//! closes whatever else is on screen before activating its own target, and
//! polls until the target container appears.

pub mod orders;
pub mod positions;
pub mod search;

pub use orders::PendingOrdersTab;
pub use positions::PositionsTab;
pub use search::SearchInstrumentsModal;

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::driver::{Dom, ElementRef, Selector};
use crate::error::{Error, Result};
use crate::selectors;

/// The surfaces competing for the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Orders,
    Positions,
    Search,
}

impl SurfaceKind {
    pub fn name(&self) -> &'static str {
        match self {
            SurfaceKind::Orders => "orders",
            SurfaceKind::Positions => "positions",
            SurfaceKind::Search => "search",
        }
    }

    /// The control that dismisses this surface once it is on screen.
    fn deactivate_selector(&self) -> Selector {
        match self {
            SurfaceKind::Orders => Selector::css(selectors::ORDERS_TAB),
            SurfaceKind::Positions => Selector::css(selectors::POSITIONS_TAB),
            SurfaceKind::Search => Selector::css(selectors::SEARCH_BACK_BUTTON),
        }
    }
}

/// Session-wide record of which surface currently holds the screen.
pub type SurfaceFlag = Arc<RwLock<Option<SurfaceKind>>>;

/// Open/closed bookkeeping shared by all surfaces.
pub(crate) struct SurfaceCore {
    pub dom: Dom,
    kind: SurfaceKind,
    activate: Selector,
    container_sel: Selector,
    is_open: bool,
    flag: SurfaceFlag,
}

impl SurfaceCore {
    pub fn new(
        dom: Dom,
        kind: SurfaceKind,
        activate: Selector,
        container_sel: Selector,
        flag: SurfaceFlag,
    ) -> Self {
        Self {
            dom,
            kind,
            activate,
            container_sel,
            is_open: false,
            flag,
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Close whatever else holds the screen, activate this surface and wait
    /// for its container.
    pub fn open(&mut self) -> Result<()> {
        if self.is_open {
            return Ok(());
        }
        self.close_any_other()?;
        self.dom.click_on(&self.activate, None)?;
        if self.dom.wait_for(&self.container_sel).is_none() {
            return Err(Error::Automation(format!(
                "{} surface never appeared",
                self.kind.name()
            )));
        }
        self.is_open = true;
        *self.flag.write() = Some(self.kind);
        debug!("{} surface opened", self.kind.name());
        Ok(())
    }

    /// Dismiss the surface if it is on screen (toggle semantics) and drop
    /// cached references.
    pub fn close(&mut self) -> Result<()> {
        if self.is_open && self.dom.exists(&self.container_sel, None) {
            self.dom.click_on(&self.kind.deactivate_selector(), None)?;
        }
        self.is_open = false;
        let mut flag = self.flag.write();
        if *flag == Some(self.kind) {
            *flag = None;
        }
        debug!("{} surface closed", self.kind.name());
        Ok(())
    }

    /// The live container element; the surface must be open.
    pub fn container(&self) -> Result<ElementRef> {
        if !self.is_open {
            return Err(Error::Window("closed"));
        }
        self.dom.find_one(&self.container_sel, None)
    }

    /// Mutual exclusion: dismiss any other open surface and any stray modal
    /// before taking the screen.
    fn close_any_other(&mut self) -> Result<()> {
        let other = *self.flag.read();
        if let Some(kind) = other.filter(|k| *k != self.kind) {
            self.dom.click_on(&kind.deactivate_selector(), None)?;
            *self.flag.write() = None;
            debug!("{} surface closed to open {}", kind.name(), self.kind.name());
        }
        if self.dom.exists(&Selector::css(selectors::CLOSE_WINDOW), None) {
            self.dom
                .click_on(&Selector::css(selectors::CLOSE_WINDOW), None)?;
        }
        Ok(())
    }
}

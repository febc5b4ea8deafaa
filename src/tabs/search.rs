//! Instrument search modal.
//!
//! The full instrument universe for the active mode is behind a lazily
//! loaded, scrollable result list. Loading it means scrolling the list to
//! exhaustion first, then decoding every row.

use tracing::info;

use crate::driver::{Dom, ElementRef, Selector};
use crate::error::{Error, Result};
use crate::model::Instrument;
use crate::selectors;
use crate::tabs::{SurfaceCore, SurfaceFlag, SurfaceKind};

pub struct SearchInstrumentsModal {
    core: SurfaceCore,
}

impl SearchInstrumentsModal {
    pub fn new(dom: Dom, flag: SurfaceFlag) -> Self {
        Self {
            core: SurfaceCore::new(
                dom,
                SurfaceKind::Search,
                Selector::css(selectors::SEARCH_OPEN_BUTTON),
                Selector::css(selectors::SEARCH_MODAL),
                flag,
            ),
        }
    }

    pub fn open(&mut self) -> Result<()> {
        self.core.open()
    }

    pub fn close(&mut self) -> Result<()> {
        self.core.close()
    }

    pub fn is_open(&self) -> bool {
        self.core.is_open()
    }

    /// Scroll the result list to exhaustion and decode every instrument.
    /// All-or-nothing, like the table surfaces.
    pub fn load_all(&mut self) -> Result<Vec<Instrument>> {
        let container = self.core.container()?;
        self.core
            .dom
            .scroll_to_bottom(&Selector::css(selectors::SEARCH_SCROLL_AREA))?;
        let rows = self.core.dom.find_all(
            &Selector::css(selectors::SEARCH_RESULT_ROW),
            Some(&container),
        )?;
        let mut instruments = Vec::with_capacity(rows.len());
        for row in &rows {
            match self.decode_row(row) {
                Ok(instrument) => instruments.push(instrument),
                Err(err) => return Err(Error::parsing("Instrument", err)),
            }
        }
        info!("scanned {} instruments", instruments.len());
        Ok(instruments)
    }

    fn decode_row(&self, row: &ElementRef) -> Result<Instrument> {
        let dom = &self.core.dom;
        let ticker = dom.find_one(&Selector::css(selectors::INSTRUMENT_TICKER), Some(row))?;
        let ticker_text = dom.read_text(&ticker)?;
        // The ticker cell reads like "Apple (AAPL)"; the display name is
        // everything before the parenthesised symbol.
        let short_name = ticker_text
            .split('(')
            .next()
            .unwrap_or("")
            .trim()
            .to_string();
        if short_name.is_empty() {
            return Err(Error::Validation(format!(
                "instrument row has no name: {:?}",
                ticker_text
            )));
        }

        let symbol = if dom.exists(
            &Selector::css(selectors::INSTRUMENT_TICKER_SYMBOL),
            Some(row),
        ) {
            let span = dom.find_one(
                &Selector::css(selectors::INSTRUMENT_TICKER_SYMBOL),
                Some(row),
            )?;
            let text = dom.read_text(&span)?;
            let stripped = text.trim().trim_matches(|c| c == '(' || c == ')');
            if stripped.is_empty() {
                short_name.clone()
            } else {
                stripped.to_string()
            }
        } else {
            short_name.clone()
        };

        let name = if dom.exists(&Selector::css(selectors::INSTRUMENT_FULL_NAME), Some(row)) {
            let cell = dom.find_one(&Selector::css(selectors::INSTRUMENT_FULL_NAME), Some(row))?;
            dom.read_text(&cell)?.trim().to_string()
        } else {
            short_name.clone()
        };

        let exchange = if dom.exists(&Selector::css(selectors::INSTRUMENT_MARKET), Some(row)) {
            let cell = dom.find_one(&Selector::css(selectors::INSTRUMENT_MARKET), Some(row))?;
            let text = dom.read_text(&cell)?.trim().to_string();
            (!text.is_empty()).then_some(text)
        } else {
            None
        };

        let fractional = dom.exists(
            &Selector::css(selectors::FRACTIONAL_INDICATOR),
            Some(row),
        );

        Ok(Instrument {
            name,
            short_name,
            symbol,
            exchange,
            fractional,
        })
    }
}

//! Open-positions table.

use std::sync::Arc;

use tracing::info;

use crate::driver::{Dom, ElementRef, Selector};
use crate::error::{Error, Result};
use crate::model::{Direction, Instrument, InstrumentBook, Position, TradingMode};
use crate::selectors;
use crate::tabs::{SurfaceCore, SurfaceFlag, SurfaceKind};
use crate::text::num;

pub struct PositionsTab {
    core: SurfaceCore,
    mode: TradingMode,
    instruments: Arc<InstrumentBook>,
}

impl PositionsTab {
    pub fn new(
        dom: Dom,
        mode: TradingMode,
        instruments: Arc<InstrumentBook>,
        flag: SurfaceFlag,
    ) -> Self {
        Self {
            core: SurfaceCore::new(
                dom,
                SurfaceKind::Positions,
                Selector::css(selectors::POSITIONS_TAB),
                Selector::css(selectors::POSITIONS_TABLE),
                flag,
            ),
            mode,
            instruments,
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

    /// Load every open position, all-or-nothing.
    pub fn positions(&mut self) -> Result<Vec<Position>> {
        let container = self.core.container()?;
        let rows = self
            .core
            .dom
            .find_all(&Selector::css(selectors::TABLE_ROWS), Some(&container))?;
        let mut positions = Vec::with_capacity(rows.len());
        for row in &rows {
            match self.decode_row(row) {
                Ok(position) => positions.push(position),
                Err(err) => return Err(Error::parsing("Position", err)),
            }
        }
        info!("loaded {} open positions", positions.len());
        Ok(positions)
    }

    fn cell_text(&self, row: &ElementRef, css: &str) -> Result<String> {
        let cell = self.core.dom.find_one(&Selector::css(css), Some(row))?;
        self.core.dom.read_text(&cell)
    }

    fn required_num(&self, row: &ElementRef, css: &str) -> Result<f64> {
        let text = self.cell_text(row, css)?;
        num(&text).ok_or_else(|| Error::Validation(format!("malformed number in {}: {:?}", css, text)))
    }

    fn decode_row(&self, row: &ElementRef) -> Result<Position> {
        let short_name = self.cell_text(row, "td.name")?;
        let instrument = self
            .instruments
            .lookup(&short_name)
            .unwrap_or_else(|| Instrument::stub(&short_name));

        // Share-dealing accounts only hold long positions; the table omits
        // the direction column there.
        let direction = if self.mode == TradingMode::Cfd {
            self.cell_text(row, "td.direction")?.parse()?
        } else {
            Direction::Buy
        };

        let quantity = self.required_num(row, "td.quantity")?;
        let price = self.required_num(row, "td.averagePrice")?;

        let mut position = Position::new(instrument, quantity, direction, price);
        let exchange_id = self.cell_text(row, "td.humanId")?;
        if !exchange_id.is_empty() {
            position.exchange_id = Some(exchange_id);
        }
        position.timestamp = Some(self.cell_text(row, "td.created")?);
        if self.mode == TradingMode::Cfd
            && self.core.dom.exists(&Selector::css("td.margin"), Some(row))
        {
            position.margin = num(&self.cell_text(row, "td.margin")?);
        }
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::driver::fake::{FakeDriver, FakeElement};

    fn add_row(driver: &FakeDriver, key: &str, cells: &[(&str, &str)]) {
        driver.add(key, FakeElement::default());
        for (css, text) in cells {
            driver.add(&format!("{} {}", key, css), FakeElement::default().text(text));
        }
    }

    fn scripted_driver() -> FakeDriver {
        let driver = FakeDriver::new();
        driver.add(selectors::POSITIONS_TAB, FakeElement::default());
        driver.add(selectors::POSITIONS_TABLE, FakeElement::default());
        driver
    }

    fn tab_with(driver: &FakeDriver, mode: TradingMode) -> PositionsTab {
        let dom = Dom::new(Arc::new(driver.clone()), Config::fast());
        PositionsTab::new(
            dom,
            mode,
            Arc::new(InstrumentBook::new()),
            SurfaceFlag::default(),
        )
    }

    #[test]
    fn test_cfd_row_carries_direction_and_margin() {
        let driver = scripted_driver();
        add_row(
            &driver,
            "row1",
            &[
                ("td.name", "Gold"),
                ("td.humanId", "POS-3"),
                ("td.direction", "Sell"),
                ("td.quantity", "2"),
                ("td.averagePrice", "$1800.00"),
                ("td.created", "2026-08-20 09:00"),
                ("td.margin", "$72.00"),
            ],
        );
        driver.add_in(selectors::POSITIONS_TABLE, selectors::TABLE_ROWS, &["row1"]);

        let mut tab = tab_with(&driver, TradingMode::Cfd);
        tab.open().unwrap();
        let position = tab.positions().unwrap().remove(0);
        assert_eq!(position.direction, Direction::Sell);
        assert_eq!(position.margin, Some(72.0));
        assert_eq!(position.exchange_id.as_deref(), Some("POS-3"));
    }

    #[test]
    fn test_invest_rows_are_always_long() {
        let driver = scripted_driver();
        add_row(
            &driver,
            "row1",
            &[
                ("td.name", "Apple"),
                ("td.humanId", "POS-1"),
                ("td.quantity", "5"),
                ("td.averagePrice", "$100.00"),
                ("td.created", "2026-08-20 09:01"),
            ],
        );
        driver.add_in(selectors::POSITIONS_TABLE, selectors::TABLE_ROWS, &["row1"]);

        let mut tab = tab_with(&driver, TradingMode::Invest);
        tab.open().unwrap();
        let position = tab.positions().unwrap().remove(0);
        assert_eq!(position.direction, Direction::Buy);
        assert_eq!(position.quantity, 5.0);
        assert_eq!(position.margin, None);
    }

    #[test]
    fn test_bad_price_fails_the_whole_load() {
        let driver = scripted_driver();
        add_row(
            &driver,
            "row1",
            &[
                ("td.name", "Apple"),
                ("td.humanId", "POS-1"),
                ("td.quantity", "5"),
                ("td.averagePrice", "$100.00"),
                ("td.created", "2026-08-20 09:02"),
            ],
        );
        add_row(
            &driver,
            "row2",
            &[
                ("td.name", "Tesla"),
                ("td.humanId", "POS-2"),
                ("td.quantity", "1"),
                ("td.averagePrice", "n/a"),
                ("td.created", "2026-08-20 09:03"),
            ],
        );
        driver.add_in(
            selectors::POSITIONS_TABLE,
            selectors::TABLE_ROWS,
            &["row1", "row2"],
        );

        let mut tab = tab_with(&driver, TradingMode::Invest);
        tab.open().unwrap();
        let err = tab.positions().unwrap_err();
        assert!(matches!(err, Error::Parsing { entity: "Position", .. }));
    }
}

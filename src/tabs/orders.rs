//! Pending-orders table.

use std::sync::Arc;

use tracing::info;

use crate::driver::{Dom, ElementRef, Selector};
use crate::error::{Error, Result};
use crate::model::{
    Direction, Instrument, InstrumentBook, InvestOrderType, Order, OrderDetail, OrderStatus,
    OrderType, TradingMode,
};
use crate::selectors;
use crate::tabs::{SurfaceCore, SurfaceFlag, SurfaceKind};
use crate::text::num;

pub struct PendingOrdersTab {
    core: SurfaceCore,
    mode: TradingMode,
    instruments: Arc<InstrumentBook>,
}

impl PendingOrdersTab {
    pub fn new(
        dom: Dom,
        mode: TradingMode,
        instruments: Arc<InstrumentBook>,
        flag: SurfaceFlag,
    ) -> Self {
        Self {
            core: SurfaceCore::new(
                dom,
                SurfaceKind::Orders,
                Selector::css(selectors::ORDERS_TAB),
                Selector::css(selectors::ORDERS_TABLE),
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

    /// Load every pending order. All-or-nothing: a single undecodable row
    /// fails the whole load, so callers never see a silently partial list.
    pub fn orders(&mut self) -> Result<Vec<Order>> {
        let container = self.core.container()?;
        let rows = self
            .core
            .dom
            .find_all(&Selector::css(selectors::TABLE_ROWS), Some(&container))?;
        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            match self.decode_row(row) {
                Ok(order) => orders.push(order),
                Err(err) => return Err(Error::parsing("Order", err)),
            }
        }
        info!("loaded {} pending orders", orders.len());
        Ok(orders)
    }

    fn cell_text(&self, row: &ElementRef, css: &str) -> Result<String> {
        let cell = self.core.dom.find_one(&Selector::css(css), Some(row))?;
        self.core.dom.read_text(&cell)
    }

    fn required_num(&self, row: &ElementRef, css: &str) -> Result<f64> {
        let text = self.cell_text(row, css)?;
        num(&text).ok_or_else(|| Error::Validation(format!("malformed number in {}: {:?}", css, text)))
    }

    fn optional_num(&self, row: &ElementRef, css: &str) -> Result<Option<f64>> {
        Ok(num(&self.cell_text(row, css)?))
    }

    fn decode_row(&self, row: &ElementRef) -> Result<Order> {
        let short_name = self.cell_text(row, "td.name")?;
        let instrument = self
            .instruments
            .lookup(&short_name)
            .unwrap_or_else(|| Instrument::stub(&short_name));

        let exchange_id = self.cell_text(row, "td.humanId")?;
        let direction: Direction = self.cell_text(row, "td.direction")?.parse()?;
        let order_type = OrderType::from_label(self.mode, &self.cell_text(row, "td.type")?)?;
        let cost = self.optional_num(row, "td.value")?;
        // By-value rows leave the quantity cell blank; the share count is
        // re-derived from the value cell below. Only a row with neither is
        // undecodable.
        let quantity = match (self.optional_num(row, "td.quantity")?, cost) {
            (Some(quantity), _) => quantity,
            (None, Some(_)) => 0.0,
            (None, None) => {
                return Err(Error::Validation(
                    "row has neither a quantity nor a value".into(),
                ))
            }
        };
        let price = self.required_num(row, "td.currentPrice")?;
        let created = self.cell_text(row, "td.created")?;

        // Stop-limit rows carry both boundary prices inline; other rows
        // expose a single target price interpreted by order type.
        let (mut limit, mut stop) = (None, None);
        if self.core.dom.exists(
            &Selector::css(selectors::STOP_LIMIT_LIMIT_PRICE),
            Some(row),
        ) {
            limit = self.optional_num(row, selectors::STOP_LIMIT_LIMIT_PRICE)?;
            if self
                .core
                .dom
                .exists(&Selector::css(selectors::STOP_LIMIT_STOP_PRICE), Some(row))
            {
                stop = self.optional_num(row, selectors::STOP_LIMIT_STOP_PRICE)?;
            }
        } else if self
            .core
            .dom
            .exists(&Selector::css("td.targetPrice"), Some(row))
        {
            let target = self.optional_num(row, "td.targetPrice")?;
            if order_type == OrderType::Invest(InvestOrderType::Limit) {
                limit = target;
            } else {
                stop = target;
            }
        }

        let mut order = Order::new(
            instrument,
            quantity,
            price,
            direction,
            order_type,
            cost.unwrap_or(0.0),
            chrono::Utc::now(),
        );
        // A row on this table is by definition already placed.
        order.advance(OrderStatus::Placed)?;
        if !exchange_id.is_empty() {
            order.exchange_id = Some(exchange_id);
        }
        order.exchange_timestamp = Some(created);

        // A populated value cell means a by-value market order; the share
        // quantity is the value at the current price.
        if let Some(cost) = cost {
            if let OrderDetail::InvestMarket { by_value } = &mut order.detail {
                *by_value = true;
            }
            order.quantity = cost / order.price;
        }
        if let Some(limit) = limit {
            order.limit = Some(limit);
            order.cost = order.quantity * limit;
        }
        if let Some(stop) = stop {
            order.stop = Some(stop);
        }
        Ok(order)
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
        driver.add(selectors::ORDERS_TAB, FakeElement::default());
        driver.add(selectors::ORDERS_TABLE, FakeElement::default());
        driver
    }

    fn tab_with(driver: &FakeDriver, mode: TradingMode) -> PendingOrdersTab {
        let dom = Dom::new(Arc::new(driver.clone()), Config::fast());
        PendingOrdersTab::new(
            dom,
            mode,
            Arc::new(InstrumentBook::new()),
            SurfaceFlag::default(),
        )
    }

    #[test]
    fn test_decodes_limit_row() {
        let driver = scripted_driver();
        add_row(
            &driver,
            "row1",
            &[
                ("td.name", "Apple"),
                ("td.humanId", "EX-1001"),
                ("td.direction", "Buy"),
                ("td.type", "Limit"),
                ("td.quantity", "5"),
                ("td.value", ""),
                ("td.currentPrice", "$100.00"),
                ("td.created", "2026-08-21 10:30"),
                ("td.targetPrice", "$95.00"),
            ],
        );
        driver.add_in(selectors::ORDERS_TABLE, selectors::TABLE_ROWS, &["row1"]);

        let mut tab = tab_with(&driver, TradingMode::Invest);
        tab.open().unwrap();
        let orders = tab.orders().unwrap();
        assert_eq!(orders.len(), 1);
        let order = &orders[0];
        assert_eq!(order.status, OrderStatus::Placed);
        assert_eq!(order.exchange_id.as_deref(), Some("EX-1001"));
        assert_eq!(order.limit, Some(95.0));
        assert_eq!(order.stop, None);
        // Cost is recomputed from the limit price.
        assert_eq!(order.cost, 5.0 * 95.0);
    }

    #[test]
    fn test_populated_value_cell_means_by_value_market_order() {
        let driver = scripted_driver();
        add_row(
            &driver,
            "row1",
            &[
                ("td.name", "Apple"),
                ("td.humanId", "EX-7"),
                ("td.direction", "Buy"),
                ("td.type", "Market"),
                // By-value rows show no share count at all.
                ("td.quantity", ""),
                ("td.value", "$200.00"),
                ("td.currentPrice", "$50.00"),
                ("td.created", "2026-08-21 10:31"),
            ],
        );
        driver.add_in(selectors::ORDERS_TABLE, selectors::TABLE_ROWS, &["row1"]);

        let mut tab = tab_with(&driver, TradingMode::Invest);
        tab.open().unwrap();
        let order = tab.orders().unwrap().remove(0);
        assert_eq!(order.detail, OrderDetail::InvestMarket { by_value: true });
        assert_eq!(order.quantity, 4.0);
    }

    #[test]
    fn test_row_without_quantity_or_value_fails_load() {
        let driver = scripted_driver();
        add_row(
            &driver,
            "row1",
            &[
                ("td.name", "Apple"),
                ("td.humanId", "EX-8"),
                ("td.direction", "Buy"),
                ("td.type", "Market"),
                ("td.quantity", ""),
                ("td.value", ""),
                ("td.currentPrice", "$50.00"),
                ("td.created", "2026-08-21 10:36"),
            ],
        );
        driver.add_in(selectors::ORDERS_TABLE, selectors::TABLE_ROWS, &["row1"]);

        let mut tab = tab_with(&driver, TradingMode::Invest);
        tab.open().unwrap();
        let err = tab.orders().unwrap_err();
        assert!(matches!(err, Error::Parsing { entity: "Order", .. }));
    }

    #[test]
    fn test_one_bad_row_fails_the_whole_load() {
        let driver = scripted_driver();
        add_row(
            &driver,
            "row1",
            &[
                ("td.name", "Apple"),
                ("td.humanId", "EX-1"),
                ("td.direction", "Buy"),
                ("td.type", "Market"),
                ("td.quantity", "5"),
                ("td.value", ""),
                ("td.currentPrice", "$10.00"),
                ("td.created", "2026-08-21 10:32"),
            ],
        );
        // Second row has no quantity cell at all.
        add_row(
            &driver,
            "row2",
            &[
                ("td.name", "Tesla"),
                ("td.humanId", "EX-2"),
                ("td.direction", "Buy"),
                ("td.type", "Market"),
                ("td.value", ""),
                ("td.currentPrice", "$20.00"),
                ("td.created", "2026-08-21 10:33"),
            ],
        );
        driver.add_in(
            selectors::ORDERS_TABLE,
            selectors::TABLE_ROWS,
            &["row1", "row2"],
        );

        let mut tab = tab_with(&driver, TradingMode::Invest);
        tab.open().unwrap();
        let err = tab.orders().unwrap_err();
        assert!(matches!(err, Error::Parsing { entity: "Order", .. }));
    }

    #[test]
    fn test_unknown_order_type_label_fails_load() {
        let driver = scripted_driver();
        add_row(
            &driver,
            "row1",
            &[
                ("td.name", "Apple"),
                ("td.humanId", "EX-1"),
                ("td.direction", "Buy"),
                ("td.type", "Iceberg"),
                ("td.quantity", "5"),
                ("td.value", ""),
                ("td.currentPrice", "$10.00"),
                ("td.created", "2026-08-21 10:34"),
            ],
        );
        driver.add_in(selectors::ORDERS_TABLE, selectors::TABLE_ROWS, &["row1"]);

        let mut tab = tab_with(&driver, TradingMode::Invest);
        tab.open().unwrap();
        let err = tab.orders().unwrap_err();
        assert!(matches!(err, Error::Parsing { entity: "Order", .. }));
        assert!(err.to_string().contains("Iceberg"));
    }

    #[test]
    fn test_cfd_mode_uses_cfd_type_table() {
        let driver = scripted_driver();
        add_row(
            &driver,
            "row1",
            &[
                ("td.name", "Gold"),
                ("td.humanId", "EX-9"),
                ("td.direction", "Sell"),
                ("td.type", "OCO"),
                ("td.quantity", "2"),
                ("td.value", ""),
                ("td.currentPrice", "$1800.00"),
                ("td.created", "2026-08-21 10:35"),
            ],
        );
        driver.add_in(selectors::ORDERS_TABLE, selectors::TABLE_ROWS, &["row1"]);

        let mut tab = tab_with(&driver, TradingMode::Cfd);
        tab.open().unwrap();
        let order = tab.orders().unwrap().remove(0);
        assert_eq!(
            order.order_type,
            OrderType::Cfd(crate::model::CfdOrderType::Oco)
        );
        assert_eq!(order.direction, Direction::Sell);
    }
}

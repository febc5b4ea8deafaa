//! Fixed selector contracts for the trading interface.
//!
//! These paths are external contracts with the broker's markup; they change
//! only when the platform ships a new frontend, never from this side.

// Login
pub const LOGIN_USERNAME: &str = "login[username]";
pub const LOGIN_PASSWORD: &str = "login[password]";
pub const LOGIN_SUBMIT: &str = "input.button-login";
pub const LOGO: &str = "div.nav_logo";
pub const WEEKEND_ALERT_CLOSE: &str = "span.weekend-trading-close";
pub const NEW_ACCOUNT_MODAL_CLOSE: &str = "div.eq-onboarding-popup div.close-icon";

// Account menu
pub const ACCOUNT_MENU: &str = "div.account-menu-button";
pub const ACCOUNT_ITEM: &str = "div.account-types-item";

// Order window
pub const NEW_ORDER: &str = "span.open-dialog-icon.svg-icon-holder";
pub const NEW_ORDER_FALLBACK: &str = "span.dataTable-no-data-action";
pub const SEARCH_BOX: &str = "div.searchbox input";
pub const FIRST_RESULT: &str =
    "//*[@id=\"list-results-instruments\"]/div/div[3]/div/div/div[1]";
pub const WIDGET_MESSAGE: &str = "div.widget_message";
pub const QUANTITY_INPUT: &str = "div.quantity-slider-input-wrapper input";
pub const BUY_BUTTON: &str = "div.buy-sell-control-container div.buy-button";
pub const SELL_BUTTON: &str = "div.buy-sell-control-container div.sell-button";
pub const CONFIRM_BUTTON: &str = "div.confirm-button";
pub const REVIEW_ORDER_BUTTON: &str = "div.review-order-button";
pub const SEND_ORDER_BUTTON: &str = "div.send-order-button";
pub const ORDER_COSTS: &str = "div.order-costs";
pub const CLOSE_WINDOW: &str = "div.window div.close-icon";

// Limit (stop/gain) inputs, keyed by category and mode
pub const LIMIT_GAIN_UNIT: &str =
    "//*[@id=\"smartorder\"]/div[1]/div[3]/div/div[3]/div[1]/div[5]/input";
pub const LIMIT_GAIN_VALUE: &str =
    "//*[@id=\"smartorder\"]/div[1]/div[3]/div/div[3]/div[1]/div[6]/input";
pub const LIMIT_LOSS_UNIT: &str =
    "//*[@id=\"smartorder\"]/div[1]/div[3]/div/div[3]/div[3]/div[5]/input";
pub const LIMIT_LOSS_VALUE: &str =
    "//*[@id=\"smartorder\"]/div[1]/div[3]/div/div[3]/div[3]/div[6]/input";

// Invest by-value toggle
pub const INVEST_BY_DISABLED: &str = "div.invest-by-container.disabled";
pub const INVEST_BY_CONTENT: &str = "div.invest-by-content";
pub const INVEST_BY_VALUE: &str = "div.item-invest-by-items-value";
pub const INVEST_BY_QUANTITY: &str = "div.item-invest-by-items-quantity";
pub const INVEST_PRICE: &str = "#invest-order div.fund-ammount-wrapper";

// Tables and tabs
pub const ORDERS_TAB: &str = "span.tab-item.taborders";
pub const ORDERS_TABLE: &str = "#ordersTable";
pub const POSITIONS_TAB: &str = "span.tab-item.tabpositions";
pub const POSITIONS_TABLE: &str = "#positionsTable";
pub const TABLE_ROWS: &str = "tbody tr";
pub const STOP_LIMIT_LIMIT_PRICE: &str = "span.stop-limit-order-data-limit-price";
pub const STOP_LIMIT_STOP_PRICE: &str = "span.stop-limit-order-data-stop-price";

// Instrument search modal
pub const SEARCH_OPEN_BUTTON: &str = "#navigation-search-button";
pub const SEARCH_MODAL: &str = "div.search";
pub const SEARCH_SCROLL_AREA: &str = "div.search-results div.scrollable-area-body";
pub const SEARCH_RESULT_ROW: &str = "div.search-results-instrument";
pub const SEARCH_BACK_BUTTON: &str = "div.back-button";
pub const INSTRUMENT_TICKER: &str = "div.ticker";
pub const INSTRUMENT_TICKER_SYMBOL: &str = "div.ticker span";
pub const INSTRUMENT_FULL_NAME: &str = "div.full-name";
pub const INSTRUMENT_MARKET: &str = "div.market-name";
pub const FRACTIONAL_INDICATOR: &str = "svg.fractions-indicator";

// Account equity bar
pub const EQUITY_ITEM_VALUE: &str = "span.equity-item-value";

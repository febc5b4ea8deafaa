//! Browser-automation client for the Trading212 web platform.
//!
//! There is no public trading API behind this broker; everything works by
//! driving the web frontend: logging in, opening order tickets, reading the
//! order/position tables and scanning the instrument search modal. The
//! [`session::Session`] facade is the entry point; it hands out order
//! windows and table readers that share its per-mode caches.
//!
//! All element access funnels through [`driver::Dom`], which applies one
//! bounded retry policy so a momentarily missing element never aborts an
//! operation outright. Anything driving a real browser implements the
//! [`driver::Driver`] trait.

pub mod cache;
pub mod config;
pub mod driver;
pub mod error;
pub mod model;
pub mod selectors;
pub mod session;
pub mod tabs;
pub mod text;
pub mod window;

pub use config::Config;
pub use error::{Error, Result};
pub use session::Session;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging for binaries embedding this crate.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webtrader=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

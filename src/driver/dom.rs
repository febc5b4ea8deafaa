//! Retry-wrapped element access.
//!
//! `Dom` is the only way the rest of the crate touches the page. Lookups,
//! clicks and reads all run through the bounded-retry policy; waiting is
//! busy-polling against a wall-clock deadline.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::Config;
use crate::driver::retry::with_retry;
use crate::driver::{Driver, ElementRef, Selector};
use crate::error::{Error, Result};

#[derive(Clone)]
pub struct Dom {
    driver: Arc<dyn Driver>,
    config: Config,
}

impl Dom {
    pub fn new(driver: Arc<dyn Driver>, config: Config) -> Self {
        Self { driver, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn navigate(&self, url: &str) -> Result<()> {
        debug!("visiting {}", url);
        with_retry(&self.config.retry, "navigate", || self.driver.navigate(url))
    }

    /// All elements matching the selector.
    pub fn find_all(&self, selector: &Selector, scope: Option<&ElementRef>) -> Result<Vec<ElementRef>> {
        with_retry(&self.config.retry, "find", || {
            self.driver.find(selector, scope)
        })
    }

    /// First element matching the selector; retried until one exists.
    pub fn find_one(&self, selector: &Selector, scope: Option<&ElementRef>) -> Result<ElementRef> {
        with_retry(&self.config.retry, "find_one", || {
            let found = self.driver.find(selector, scope)?;
            found
                .into_iter()
                .next()
                .ok_or_else(|| Error::Automation(format!("no element matches {}", selector)))
        })
    }

    /// Whether at least one element matches, without burning the retry
    /// budget on absence: a single lookup, errors treated as "not there".
    pub fn exists(&self, selector: &Selector, scope: Option<&ElementRef>) -> bool {
        self.driver
            .find(selector, scope)
            .map(|found| !found.is_empty())
            .unwrap_or(false)
    }

    pub fn click(&self, element: &ElementRef) -> Result<()> {
        with_retry(&self.config.retry, "click", || self.driver.click(element))
    }

    /// Find and click in one retried unit, so a stale handle is re-resolved.
    pub fn click_on(&self, selector: &Selector, scope: Option<&ElementRef>) -> Result<()> {
        with_retry(&self.config.retry, "click_on", || {
            let element = self
                .driver
                .find(selector, scope)?
                .into_iter()
                .next()
                .ok_or_else(|| Error::Automation(format!("no element matches {}", selector)))?;
            self.driver.click(&element)
        })
    }

    /// Clear the input and type fresh text.
    pub fn fill(&self, element: &ElementRef, text: &str) -> Result<()> {
        with_retry(&self.config.retry, "fill", || {
            self.driver.clear(element)?;
            self.driver.type_text(element, text)
        })
    }

    pub fn read_text(&self, element: &ElementRef) -> Result<String> {
        with_retry(&self.config.retry, "read_text", || {
            self.driver.read_text(element)
        })
    }

    pub fn read_attribute(&self, element: &ElementRef, name: &str) -> Result<String> {
        with_retry(&self.config.retry, "read_attribute", || {
            self.driver.read_attribute(element, name)
        })
    }

    pub fn is_displayed(&self, element: &ElementRef) -> Result<bool> {
        with_retry(&self.config.retry, "is_displayed", || {
            self.driver.is_displayed(element)
        })
    }

    /// Poll until the selector matches, up to the element deadline.
    /// Returns the element, or `None` if it never appeared.
    pub fn wait_for(&self, selector: &Selector) -> Option<ElementRef> {
        self.wait_for_within(selector, self.config.element_timeout)
    }

    /// Poll until the selector matches, up to `deadline`.
    pub fn wait_for_within(&self, selector: &Selector, deadline: Duration) -> Option<ElementRef> {
        let cutoff = Instant::now() + deadline;
        loop {
            if let Ok(found) = self.driver.find(selector, None) {
                if let Some(element) = found.into_iter().next() {
                    return Some(element);
                }
            }
            if Instant::now() >= cutoff {
                debug!("{} never appeared within {:?}", selector, deadline);
                return None;
            }
            thread::sleep(self.config.poll_interval);
        }
    }

    /// Scroll an element to its bottom, repeating while its scroll height
    /// keeps growing (lazily-loaded lists extend as they scroll).
    pub fn scroll_to_bottom(&self, selector: &Selector) -> Result<()> {
        let element = self.find_one(selector, None)?;
        let mut previous = 0u64;
        loop {
            let height: u64 = self
                .read_attribute(&element, "scrollHeight")?
                .parse()
                .unwrap_or(0);
            if height <= previous {
                return Ok(());
            }
            with_retry(&self.config.retry, "scroll", || {
                self.driver.scroll_to(&element, height)
            })?;
            previous = height;
        }
    }
}

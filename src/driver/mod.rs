//! Browser-automation seam.
//!
//! The core never talks to a browser directly: it consumes a [`Driver`]
//! capability through the retry-wrapped [`Dom`] adapter. Selectors and
//! element handles are opaque to the core; the driver owns their meaning.

pub mod dom;
pub mod retry;

#[cfg(test)]
pub(crate) mod fake;

pub use dom::Dom;

use crate::error::Result;
use std::fmt;

/// How to look an element up.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    Css(String),
    Xpath(String),
    Name(String),
}

impl Selector {
    pub fn css(query: impl Into<String>) -> Self {
        Selector::Css(query.into())
    }

    pub fn xpath(query: impl Into<String>) -> Self {
        Selector::Xpath(query.into())
    }

    pub fn name(query: impl Into<String>) -> Self {
        Selector::Name(query.into())
    }

    pub fn query(&self) -> &str {
        match self {
            Selector::Css(q) | Selector::Xpath(q) | Selector::Name(q) => q,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(q) => write!(f, "css:{}", q),
            Selector::Xpath(q) => write!(f, "xpath:{}", q),
            Selector::Name(q) => write!(f, "name:{}", q),
        }
    }
}

/// Opaque handle to an on-screen element, minted by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef(pub u64);

/// The consumed browser capability. Synchronous and blocking; every call is
/// a remote interaction that may transiently fail.
pub trait Driver {
    fn navigate(&self, url: &str) -> Result<()>;

    /// All elements matching the selector, optionally under a scope element.
    fn find(&self, selector: &Selector, scope: Option<&ElementRef>) -> Result<Vec<ElementRef>>;

    fn click(&self, element: &ElementRef) -> Result<()>;

    fn type_text(&self, element: &ElementRef, text: &str) -> Result<()>;

    fn clear(&self, element: &ElementRef) -> Result<()>;

    fn read_text(&self, element: &ElementRef) -> Result<String>;

    fn read_attribute(&self, element: &ElementRef, name: &str) -> Result<String>;

    fn is_displayed(&self, element: &ElementRef) -> Result<bool>;

    /// Scroll the element's viewport to the given vertical offset.
    fn scroll_to(&self, element: &ElementRef, offset: u64) -> Result<()>;
}

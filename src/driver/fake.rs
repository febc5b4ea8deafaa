//! Scripted in-memory driver for tests.
//!
//! Elements are registered under string keys (usually their selector query)
//! and looked up by query; scoped lookups resolve `"{scope_key} {query}"`
//! composite keys first. Every interaction is recorded so tests can assert
//! on call order.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::driver::{Driver, ElementRef, Selector};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Navigate(String),
    Click(String),
    Type(String, String),
    Clear(String),
    Scroll(String, u64),
}

#[derive(Debug, Clone)]
pub struct FakeElement {
    pub text: String,
    pub value: String,
    pub attrs: HashMap<String, String>,
    pub displayed: bool,
}

impl Default for FakeElement {
    fn default() -> Self {
        Self {
            text: String::new(),
            value: String::new(),
            attrs: HashMap::new(),
            displayed: true,
        }
    }
}

impl FakeElement {
    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }
}

#[derive(Default)]
struct Inner {
    elements: HashMap<String, FakeElement>,
    /// Extra (scope, query) -> keys matches beyond the key-is-query default.
    matches: HashMap<(String, String), Vec<String>>,
    ids: HashMap<u64, String>,
    keys: HashMap<String, u64>,
    next_id: u64,
    calls: Vec<Call>,
    pending_growth: HashMap<String, Vec<String>>,
}

impl Inner {
    fn id_for(&mut self, key: &str) -> u64 {
        if let Some(id) = self.keys.get(key) {
            return *id;
        }
        self.next_id += 1;
        self.keys.insert(key.to_string(), self.next_id);
        self.ids.insert(self.next_id, key.to_string());
        self.next_id
    }

    fn key_of(&self, element: &ElementRef) -> Result<String> {
        self.ids
            .get(&element.0)
            .cloned()
            .ok_or_else(|| Error::Automation(format!("stale element handle {}", element.0)))
    }

    fn live(&self, element: &ElementRef) -> Result<String> {
        let key = self.key_of(element)?;
        if !self.elements.contains_key(&key) {
            return Err(Error::Automation(format!("element {} detached", key)));
        }
        Ok(key)
    }
}

#[derive(Clone, Default)]
pub struct FakeDriver {
    inner: Arc<Mutex<Inner>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element under `key`; root lookups for `key` resolve it.
    pub fn add(&self, key: &str, element: FakeElement) {
        self.inner.lock().elements.insert(key.to_string(), element);
    }

    /// Make a query under `scope_key` resolve to the given element keys.
    pub fn add_in(&self, scope_key: &str, query: &str, keys: &[&str]) {
        self.inner.lock().matches.insert(
            (scope_key.to_string(), query.to_string()),
            keys.iter().map(|k| k.to_string()).collect(),
        );
    }

    pub fn remove(&self, key: &str) {
        self.inner.lock().elements.remove(key);
    }

    /// Queue a scrollHeight growth step applied after the next scroll.
    pub fn grow_on_scroll(&self, key: &str, next_height: &str) {
        self.inner
            .lock()
            .pending_growth
            .entry(key.to_string())
            .or_default()
            .push(next_height.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().calls.clone()
    }

    /// Keys of clicked elements, in click order.
    pub fn clicks(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Click(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn value_of(&self, key: &str) -> String {
        self.inner
            .lock()
            .elements
            .get(key)
            .map(|el| el.value.clone())
            .unwrap_or_default()
    }

    pub fn scroll_offsets(&self, key: &str) -> Vec<u64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Scroll(k, offset) if k == key => Some(offset),
                _ => None,
            })
            .collect()
    }
}

impl Driver for FakeDriver {
    fn navigate(&self, url: &str) -> Result<()> {
        self.inner.lock().calls.push(Call::Navigate(url.to_string()));
        Ok(())
    }

    fn find(&self, selector: &Selector, scope: Option<&ElementRef>) -> Result<Vec<ElementRef>> {
        let mut inner = self.inner.lock();
        let query = selector.query().to_string();
        let scope_key = match scope {
            Some(el) => inner.key_of(el)?,
            None => String::new(),
        };

        let mut keys: Vec<String> = Vec::new();
        if let Some(found) = inner.matches.get(&(scope_key.clone(), query.clone())) {
            keys = found.clone();
        } else if !scope_key.is_empty() {
            let composite = format!("{} {}", scope_key, query);
            if inner.elements.contains_key(&composite) {
                keys.push(composite);
            } else if inner.elements.contains_key(&query) {
                // Scope-insensitive fallback for elements tests registered
                // at the root.
                keys.push(query.clone());
            }
        } else if inner.elements.contains_key(&query) {
            keys.push(query.clone());
        }

        keys.retain(|k| inner.elements.contains_key(k));
        Ok(keys
            .into_iter()
            .map(|k| ElementRef(inner.id_for(&k)))
            .collect())
    }

    fn click(&self, element: &ElementRef) -> Result<()> {
        let mut inner = self.inner.lock();
        let key = inner.live(element)?;
        inner.calls.push(Call::Click(key));
        Ok(())
    }

    fn type_text(&self, element: &ElementRef, text: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        let key = inner.live(element)?;
        inner.calls.push(Call::Type(key.clone(), text.to_string()));
        if let Some(el) = inner.elements.get_mut(&key) {
            el.value.push_str(text);
        }
        Ok(())
    }

    fn clear(&self, element: &ElementRef) -> Result<()> {
        let mut inner = self.inner.lock();
        let key = inner.live(element)?;
        inner.calls.push(Call::Clear(key.clone()));
        if let Some(el) = inner.elements.get_mut(&key) {
            el.value.clear();
        }
        Ok(())
    }

    fn read_text(&self, element: &ElementRef) -> Result<String> {
        let inner = self.inner.lock();
        let key = inner.live(element)?;
        Ok(inner.elements[&key].text.clone())
    }

    fn read_attribute(&self, element: &ElementRef, name: &str) -> Result<String> {
        let inner = self.inner.lock();
        let key = inner.live(element)?;
        let el = &inner.elements[&key];
        if name == "value" {
            return Ok(el.value.clone());
        }
        Ok(el.attrs.get(name).cloned().unwrap_or_default())
    }

    fn is_displayed(&self, element: &ElementRef) -> Result<bool> {
        let inner = self.inner.lock();
        let key = inner.live(element)?;
        Ok(inner.elements[&key].displayed)
    }

    fn scroll_to(&self, element: &ElementRef, offset: u64) -> Result<()> {
        let mut inner = self.inner.lock();
        let key = inner.live(element)?;
        inner.calls.push(Call::Scroll(key.clone(), offset));
        if let Some(next) = inner
            .pending_growth
            .get_mut(&key)
            .and_then(|queue| (!queue.is_empty()).then(|| queue.remove(0)))
        {
            if let Some(el) = inner.elements.get_mut(&key) {
                el.attrs.insert("scrollHeight".to_string(), next);
            }
        }
        Ok(())
    }
}

//! Instruments and the per-mode instrument index.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// A tradeable instrument. Immutable once created; the symbol is the stable
/// identity key, short name and full name are alternate lookup keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    pub short_name: String,
    pub symbol: String,
    pub exchange: Option<String>,
    pub fractional: bool,
}

impl Instrument {
    /// Minimal instrument built from a short name alone, for table rows
    /// whose instrument is not in the cache.
    pub fn stub(short_name: &str) -> Self {
        Self {
            name: short_name.to_string(),
            short_name: short_name.to_string(),
            symbol: short_name.to_string(),
            exchange: None,
            fractional: false,
        }
    }
}

/// Cached instrument universe for one trading mode, keyed by symbol.
#[derive(Default)]
pub struct InstrumentBook {
    by_symbol: DashMap<String, Instrument>,
}

impl InstrumentBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    /// Replace the cached universe with a freshly loaded list.
    pub fn load(&self, instruments: Vec<Instrument>) {
        self.by_symbol.clear();
        for instrument in instruments {
            self.by_symbol
                .insert(instrument.symbol.clone(), instrument);
        }
        tracing::info!("loaded {} instruments into cache", self.by_symbol.len());
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<Instrument> {
        self.by_symbol.get(symbol).map(|entry| entry.clone())
    }

    pub fn by_short_name(&self, short_name: &str) -> Option<Instrument> {
        self.scan(|i| i.short_name.eq_ignore_ascii_case(short_name))
    }

    pub fn by_name(&self, name: &str) -> Option<Instrument> {
        self.scan(|i| i.name.eq_ignore_ascii_case(name))
    }

    /// Resolve by short name, full name or symbol, in that order.
    pub fn lookup(&self, query: &str) -> Option<Instrument> {
        self.by_short_name(query)
            .or_else(|| self.by_name(query))
            .or_else(|| self.by_symbol(query))
    }

    fn scan(&self, pred: impl Fn(&Instrument) -> bool) -> Option<Instrument> {
        self.by_symbol
            .iter()
            .find(|entry| pred(entry.value()))
            .map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apple() -> Instrument {
        Instrument {
            name: "Apple Inc.".to_string(),
            short_name: "Apple".to_string(),
            symbol: "AAPL".to_string(),
            exchange: Some("NASDAQ".to_string()),
            fractional: true,
        }
    }

    #[test]
    fn test_lookup_by_any_identifier() {
        let book = InstrumentBook::new();
        book.load(vec![apple()]);
        assert_eq!(book.lookup("Apple").unwrap().symbol, "AAPL");
        assert_eq!(book.lookup("Apple Inc.").unwrap().symbol, "AAPL");
        assert_eq!(book.lookup("AAPL").unwrap().symbol, "AAPL");
        assert!(book.lookup("Tesla").is_none());
    }

    #[test]
    fn test_load_replaces_universe() {
        let book = InstrumentBook::new();
        book.load(vec![apple()]);
        book.load(vec![Instrument::stub("Tesla")]);
        assert_eq!(book.len(), 1);
        assert!(book.by_symbol("AAPL").is_none());
    }
}

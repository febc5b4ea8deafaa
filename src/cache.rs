//! On-disk instrument cache.
//!
//! Scanning the full instrument universe off the search modal is slow, so
//! each mode's scan result is persisted as a small CSV file and reloaded on
//! the next session. One file per trading mode; modes never share a cache.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{Instrument, TradingMode};

const HEADER: &str = "name,short_name,symbol,exchange,fractional";

pub struct InstrumentCache {
    dir: PathBuf,
}

impl InstrumentCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, mode: TradingMode) -> PathBuf {
        self.dir
            .join(format!("{}_instruments.csv", mode.as_str().to_ascii_lowercase()))
    }

    /// Load the cached universe for a mode. `None` means no cache file yet;
    /// a present but undecodable file is an error, not an empty universe.
    pub fn load(&self, mode: TradingMode) -> Result<Option<Vec<Instrument>>> {
        let path = self.path_for(mode);
        if !path.exists() {
            debug!("no instrument cache at {}", path.display());
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        let mut lines = contents.lines();
        if lines.next() != Some(HEADER) {
            return Err(Error::parsing(
                "Instrument",
                format!("unrecognized cache header in {}", path.display()),
            ));
        }
        let mut instruments = Vec::new();
        for (idx, line) in lines.enumerate() {
            if line.is_empty() {
                continue;
            }
            let instrument = decode_line(line)
                .map_err(|e| Error::parsing("Instrument", format!("line {}: {}", idx + 2, e)))?;
            instruments.push(instrument);
        }
        debug!(
            "loaded {} {} instruments from {}",
            instruments.len(),
            mode,
            path.display()
        );
        Ok(Some(instruments))
    }

    pub fn store(&self, mode: TradingMode, instruments: &[Instrument]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut out = String::with_capacity(64 * (instruments.len() + 1));
        out.push_str(HEADER);
        out.push('\n');
        for instrument in instruments {
            let fields = [
                instrument.name.as_str(),
                instrument.short_name.as_str(),
                instrument.symbol.as_str(),
                instrument.exchange.as_deref().unwrap_or(""),
                if instrument.fractional { "true" } else { "false" },
            ];
            let row: Vec<String> = fields.iter().map(|f| escape(f)).collect();
            out.push_str(&row.join(","));
            out.push('\n');
        }
        let path = self.path_for(mode);
        fs::write(&path, out)?;
        info!(
            "cached {} {} instruments to {}",
            instruments.len(),
            mode,
            path.display()
        );
        Ok(())
    }
}

fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn decode_line(line: &str) -> Result<Instrument> {
    let fields = split_line(line)?;
    if fields.len() != 5 {
        return Err(Error::Validation(format!(
            "expected 5 fields, found {}",
            fields.len()
        )));
    }
    let fractional = match fields[4].as_str() {
        "true" => true,
        "false" => false,
        other => {
            return Err(Error::Validation(format!(
                "fractional flag must be true/false, got {:?}",
                other
            )))
        }
    };
    Ok(Instrument {
        name: fields[0].clone(),
        short_name: fields[1].clone(),
        symbol: fields[2].clone(),
        exchange: (!fields[3].is_empty()).then(|| fields[3].clone()),
        fractional,
    })
}

fn split_line(line: &str) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    quoted = false;
                }
            }
            '"' if current.is_empty() => quoted = true,
            ',' if !quoted => {
                fields.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }
    if quoted {
        return Err(Error::Validation("unterminated quoted field".into()));
    }
    fields.push(current);
    Ok(fields)
}

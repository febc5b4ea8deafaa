//! Display-text number parsing.
//!
//! Prices and quantities come off the page with currency signs, thousands
//! separators and arbitrary whitespace mixed in. The contract: strip
//! everything except digits, sign and decimal point, then parse; a string
//! with nothing numeric left yields `None`, never an error.

/// Parse a displayed price/quantity string into a float.
pub fn num(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-' || *c == '+')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    match cleaned.parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::debug!("number not found in {:?}", text);
            None
        }
    }
}

/// Extract the first number embedded in free-form message text.
///
/// Used for widget messages like "minimum remaining quantity is 10", where
/// several separate digit runs may occur and `num` would concatenate them.
pub fn num_in_text(text: &str) -> Option<f64> {
    let mut current = String::new();
    for c in text.chars() {
        if c.is_ascii_digit() || (c == '.' && !current.is_empty()) {
            current.push(c);
        } else if !current.is_empty() {
            break;
        }
    }
    if current.is_empty() {
        return None;
    }
    current.trim_end_matches('.').parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_currency_and_separators() {
        assert_eq!(num("$1,234.56"), Some(1234.56));
        assert_eq!(num("€ 12.5"), Some(12.5));
        assert_eq!(num("-3.2 GBP"), Some(-3.2));
    }

    #[test]
    fn test_empty_after_cleaning_is_none() {
        assert_eq!(num(""), None);
        assert_eq!(num("n/a"), None);
        assert_eq!(num("—"), None);
    }

    #[test]
    fn test_plain_integer() {
        assert_eq!(num("10"), Some(10.0));
    }

    #[test]
    fn test_num_in_text_finds_first_number() {
        assert_eq!(num_in_text("minimum remaining quantity is 10"), Some(10.0));
        assert_eq!(num_in_text("max 2500.5 of 9000 shares"), Some(2500.5));
        assert_eq!(num_in_text("limit is 10."), Some(10.0));
        assert_eq!(num_in_text("no digits here"), None);
    }
}

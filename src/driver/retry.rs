//! Bounded retry around remote interactions.
//!
//! The interface is flaky by nature: elements detach mid-read, clicks land
//! on a repainting node. Every element-access call runs through here; a
//! persistent failure surfaces as a single `Error::Automation` after the
//! attempt budget is spent. Domain-level failures are never routed through
//! this path.

use std::thread;

use tracing::debug;

use crate::config::RetryPolicy;
use crate::error::{Error, Result};

/// Run `op` up to `policy.attempts` times, sleeping `policy.backoff`
/// between failures.
pub fn with_retry<T>(
    policy: &RetryPolicy,
    what: &str,
    mut op: impl FnMut() -> Result<T>,
) -> Result<T> {
    let mut remaining = policy.attempts.max(1);
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) => {
                remaining -= 1;
                debug!("{} failed ({}) - attempts left: {}", what, err, remaining);
                if remaining == 0 {
                    return Err(Error::Automation(format!(
                        "{} failed after {} attempts: {}",
                        what,
                        policy.attempts.max(1),
                        err
                    )));
                }
                thread::sleep(policy.backoff);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Duration;

    fn fast_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts,
            backoff: Duration::ZERO,
        }
    }

    #[test]
    fn test_succeeds_first_try() {
        let calls = Cell::new(0);
        let result = with_retry(&fast_policy(3), "op", || {
            calls.set(calls.get() + 1);
            Ok(42)
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_recovers_after_transient_failure() {
        let calls = Cell::new(0);
        let result = with_retry(&fast_policy(3), "op", || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(Error::Automation("flaky".into()))
            } else {
                Ok("done")
            }
        });
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_exhaustion_surfaces_single_error() {
        let calls = Cell::new(0);
        let result: Result<()> = with_retry(&fast_policy(4), "lookup", || {
            calls.set(calls.get() + 1);
            Err(Error::Automation("gone".into()))
        });
        assert_eq!(calls.get(), 4);
        let err = result.unwrap_err();
        assert!(matches!(err, Error::Automation(_)));
        assert!(err.to_string().contains("4 attempts"));
    }
}

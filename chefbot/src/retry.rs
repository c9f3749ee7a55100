//! Bounded retry combinator.
//!
//! `attempt` replaces retry-via-exception-catch loops with an explicit
//! combinator decoupled from the failure reason: the closure is given the
//! 1-based attempt number and the last error is returned once the budget is
//! spent.

use std::future::Future;

use crate::error::{ChefBotError, Result};

pub async fn attempt<T, F, Fut>(max_attempts: u32, mut f: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = None;
    for attempt_no in 1..=max_attempts {
        match f(attempt_no).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::warn!(attempt = attempt_no, max_attempts, error = %e, "attempt failed");
                last_error = Some(e);
            }
        }
    }
    Err(last_error
        .unwrap_or_else(|| ChefBotError::Provider("retry budget of zero attempts".to_string())))
}

//! Exponential backoff with optional jitter.
//!
//! Delays double per attempt and are capped at `max_ms`. Jitter is added
//! before the cap, so the sequence never decreases.

use rand::Rng;
use std::time::Duration;

/// Calculate the exponential backoff delay for `attempt` (1-based).
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    Duration::from_millis(raw_delay_ms(attempt, base_ms).min(max_ms))
}

/// Like [`calculate_backoff`], plus up to 10% random jitter below the cap.
pub fn calculate_backoff_with_jitter(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let delay_ms = raw_delay_ms(attempt, base_ms);

    let jitter_range = delay_ms / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(delay_ms.saturating_add(jitter).min(max_ms))
}

fn raw_delay_ms(attempt: u32, base_ms: u64) -> u64 {
    if attempt == 0 {
        return 0;
    }
    let exponential_base = 2u64.saturating_pow(attempt - 1);
    base_ms.saturating_mul(exponential_base)
}

//! Retry policy for the CDN deletion outbox.
//!
//! A failed CDN delete is retried with exponential backoff until
//! [`MAX_CDN_ATTEMPTS`] is reached, after which the row is marked failed and
//! left for an operator. The blob stays orphaned on the CDN meanwhile, which
//! is acceptable: the database is already consistent.

use std::time::Duration;

/// Attempts (inline + background) before a deletion is given up on.
pub const MAX_CDN_ATTEMPTS: i32 = 8;

/// Delay before the first retry.
pub const BASE_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Upper bound for any single retry delay.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(3600);

/// How long a claimed row is hidden from other workers while being processed.
pub const CLAIM_LEASE: Duration = Duration::from_secs(300);

/// Delay before the next attempt, given how many attempts have already failed
/// (including the one that just failed).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use vinyl_core::outbox::retry_delay;
/// assert_eq!(retry_delay(1), Duration::from_secs(30));
/// assert_eq!(retry_delay(3), Duration::from_secs(120));
/// ```
pub fn retry_delay(failed_attempts: i32) -> Duration {
    let exponent = failed_attempts.saturating_sub(1).clamp(0, 16) as u32;
    BASE_RETRY_DELAY
        .saturating_mul(2u32.saturating_pow(exponent))
        .min(MAX_RETRY_DELAY)
}

/// Whether a deletion with `failed_attempts` failures should be abandoned.
pub fn is_exhausted(failed_attempts: i32) -> bool {
    failed_attempts >= MAX_CDN_ATTEMPTS
}

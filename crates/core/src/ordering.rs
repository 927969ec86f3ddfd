//! Display-order rules for the images of a single record.
//!
//! Orders are 1-based. `0` is the "no images yet" sentinel used when
//! computing the next order, so the first image of a record is always `1`.
//! Deleting an image leaves a gap; consumers sort ascending and never assume
//! the sequence is contiguous.
//!
//! Everything here is pure. The repository layer calls these helpers while
//! holding the record's row lock, inside the transaction that applies the
//! result.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::types::DbId;

/// Order given to the first image of a record, and to the first position of
/// a reorder request.
pub const FIRST_DISPLAY_ORDER: i32 = 1;

/// Maximum order of a record that has no images.
pub const EMPTY_MAX_ORDER: i32 = 0;

/// Maximum number of images accepted by a single append call.
pub const MAX_IMAGES_PER_BATCH: usize = 20;

// ---------------------------------------------------------------------------
// Append
// ---------------------------------------------------------------------------

/// Reject empty or oversized append batches.
pub fn validate_batch_size(count: usize) -> Result<(), CoreError> {
    if count == 0 {
        return Err(CoreError::Validation(
            "At least one image is required".into(),
        ));
    }
    if count > MAX_IMAGES_PER_BATCH {
        return Err(CoreError::Validation(format!(
            "At most {MAX_IMAGES_PER_BATCH} images can be added at once (got {count})"
        )));
    }
    Ok(())
}

/// Orders for `count` appended images, given the record's current maximum.
///
/// The result is strictly increasing and starts at `current_max + 1`
/// (`1` when the record has no images), preserving input order.
///
/// # Examples
///
/// ```
/// use vinyl_core::ordering::append_orders;
/// assert_eq!(append_orders(None, 2).unwrap(), vec![1, 2]);
/// assert_eq!(append_orders(Some(7), 3).unwrap(), vec![8, 9, 10]);
/// ```
pub fn append_orders(current_max: Option<i32>, count: usize) -> Result<Vec<i32>, CoreError> {
    let base = current_max.unwrap_or(EMPTY_MAX_ORDER).max(EMPTY_MAX_ORDER);
    let count = i32::try_from(count)
        .map_err(|_| CoreError::Validation("Too many images in one batch".into()))?;

    (1..=count)
        .map(|offset| {
            base.checked_add(offset).ok_or_else(|| {
                CoreError::Validation("Display order exceeds the supported range".into())
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Reorder
// ---------------------------------------------------------------------------

/// Validate a reorder request against the record's current image ids.
///
/// The requested list must be a permutation of `current`: no duplicates, no
/// ids owned by another record (or nonexistent), and no omissions.
pub fn validate_reorder(current: &[DbId], requested: &[DbId]) -> Result<(), CoreError> {
    let owned: HashSet<DbId> = current.iter().copied().collect();
    let mut seen: HashSet<DbId> = HashSet::with_capacity(requested.len());

    for id in requested {
        if !seen.insert(*id) {
            return Err(CoreError::Validation(format!(
                "Image {id} appears more than once in the reorder request"
            )));
        }
        if !owned.contains(id) {
            return Err(CoreError::Validation(format!(
                "Image {id} does not belong to this record"
            )));
        }
    }

    let mut missing: Vec<DbId> = owned.difference(&seen).copied().collect();
    if !missing.is_empty() {
        missing.sort_unstable();
        return Err(CoreError::Validation(format!(
            "Reorder must list every image of the record; missing: {missing:?}"
        )));
    }

    Ok(())
}

/// Pair each id with its new order: its 1-based position in `requested`.
pub fn sequence(requested: &[DbId]) -> Vec<(DbId, i32)> {
    requested
        .iter()
        .zip(FIRST_DISPLAY_ORDER..)
        .map(|(id, order)| (*id, order))
        .collect()
}

/// Turn client-supplied `(id, display_order)` pairs into an ordered id list.
///
/// The client values only express relative position; they must be positive
/// and distinct. The caller re-sequences the result with [`sequence`].
pub fn ids_by_requested_order(pairs: &[(DbId, i32)]) -> Result<Vec<DbId>, CoreError> {
    let mut orders: HashSet<i32> = HashSet::with_capacity(pairs.len());
    for (id, order) in pairs {
        if *order < FIRST_DISPLAY_ORDER {
            return Err(CoreError::Validation(format!(
                "display_order for image {id} must be a positive integer"
            )));
        }
        if !orders.insert(*order) {
            return Err(CoreError::Validation(format!(
                "display_order {order} is used more than once"
            )));
        }
    }

    let mut sorted = pairs.to_vec();
    sorted.sort_by_key(|(_, order)| *order);
    Ok(sorted.into_iter().map(|(id, _)| id).collect())
}

// ---------------------------------------------------------------------------
// Invariant helpers
// ---------------------------------------------------------------------------

/// `true` when no order value appears twice.
pub fn has_distinct_orders<I>(orders: I) -> bool
where
    I: IntoIterator<Item = i32>,
{
    let mut seen = HashSet::new();
    orders.into_iter().all(|order| seen.insert(order))
}

/// The primary image is the one with the minimum order.
pub fn primary_image_id(images: &[(DbId, i32)]) -> Option<DbId> {
    images
        .iter()
        .min_by_key(|(_, order)| *order)
        .map(|(id, _)| *id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Domain layer for the vinyl catalogue.
//!
//! Holds the shared id/timestamp types, the error taxonomy, and the pure
//! rules (image ordering, field validation, search helpers) that the
//! repository and HTTP layers build on. Nothing in here touches I/O.

pub mod error;
pub mod ordering;
pub mod outbox;
pub mod roles;
pub mod search;
pub mod types;
pub mod validation;

//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` request DTOs, strictly typed (`deny_unknown_fields`)

pub mod cdn_deletion;
pub mod user;
pub mod vinyl_image;
pub mod vinyl_record;

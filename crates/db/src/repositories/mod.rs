//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Multi-statement writes open their
//! own transaction.

pub mod cdn_deletion_repo;
pub mod user_repo;
pub mod vinyl_image_repo;
pub mod vinyl_record_repo;

pub use cdn_deletion_repo::CdnDeletionRepo;
pub use user_repo::UserRepo;
pub use vinyl_image_repo::VinylImageRepo;
pub use vinyl_record_repo::VinylRecordRepo;

pub mod auth;
pub mod uploads;
pub mod vinyl_image;
pub mod vinyl_record;

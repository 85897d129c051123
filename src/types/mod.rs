//! Request and response types for the SegView API.

mod photo;
mod response;

pub use photo::{validate_pictures, PhotoUpload, Picture};
pub use response::{ApiResponse, Certification};

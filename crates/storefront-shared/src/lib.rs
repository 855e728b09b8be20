//! # Storefront Shared
//!
//! Wire types shared between the server and the site's UI layer.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};

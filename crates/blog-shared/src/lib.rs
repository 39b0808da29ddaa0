//! # Blog Shared
//!
//! Wire types shared between the server and its clients.
//! Kept free of server-side dependencies so a frontend can compile it too.

pub mod dto;
pub mod feed;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};

//! # Blog Core
//!
//! The domain layer of the blog.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, ports, the search/pagination rules and the [`BlogService`] that
//! orchestrates them for the HTTP layer.

pub mod content;
pub mod domain;
pub mod error;
pub mod forms;
pub mod i18n;
pub mod pagination;
pub mod ports;
pub mod related;
pub mod search;
pub mod service;
pub mod similarity;

pub use error::DomainError;
pub use service::{BlogService, BlogSettings};

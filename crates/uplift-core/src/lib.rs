//! Core types and trait definitions for the Uplift SMS broadcast service.
//!
//! This crate is deliberately free of HTTP and AWS dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod analytics;
pub mod catalog;
pub mod dispatch;
pub mod error;
pub mod ist;
pub mod manage;
pub mod memory;
pub mod notify;
pub mod phone;
pub mod store;
pub mod subscriber;

pub use catalog::{Catalog, FALLBACK_CATEGORY};
pub use error::{Error, Result};
pub use phone::PhoneNumber;
pub use subscriber::Subscriber;

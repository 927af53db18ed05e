//! Business rules of the portal: accounts, the document request workflow
//! and announcements.

pub mod catalog;
mod errors;
pub mod models;
pub mod service;
pub mod stats;
pub mod tracking;

pub use errors::DomainError;

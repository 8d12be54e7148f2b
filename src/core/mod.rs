//! Business logic. Each `*Logic` type groups the operations of one area and
//! works on an [`context::AppContext`].

pub mod auth;
pub mod catalog;
pub mod clients;
pub mod context;
pub mod dashboard;
pub mod deletion;
pub mod documents;
pub mod fields;
pub mod log;
pub mod templates;
pub mod users;

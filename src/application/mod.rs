//! Application services layer.

pub mod admin;
pub mod catalog;
pub mod conflict;
pub mod error;
pub mod names;
pub mod pagination;
pub mod repos;

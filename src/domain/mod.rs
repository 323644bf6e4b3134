//! Domain records and invariants shared by every layer.

pub mod entities;
pub mod names;

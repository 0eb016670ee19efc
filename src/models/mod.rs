//! Wire and storage models.

pub mod contact;
pub mod content;

//! Shelf application library
//!
//! The book catalogue modules served by the `shelf` binary: the JSON API over
//! the key-value store and the HTML frontend that calls it.

pub mod modules;
pub mod utils;

pub use modules::{books, views};

//! Generation service clients for CareerLens.
//!
//! All clients implement the `careerlens_core::Generator` trait.

pub mod dify;

pub use dify::DifyClient;

//! Core types, trait seams and pure algorithms for Economy Explorer.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! World Bank client and the SQLite backend implement the traits defined here;
//! the API layer drives them through [`pipeline`] and [`view`].

// Trait methods spell out `+ Send` futures; implementors may use `async fn`.
#![allow(async_fn_in_trait)]

pub mod aggregate;
pub mod continent;
pub mod error;
pub mod indicator;
pub mod normalize;
pub mod pipeline;
pub mod raw;
pub mod source;
pub mod store;
pub mod summary;
pub mod view;

pub use error::{Error, Result};

#[cfg(test)]
mod testing;

//! Core types and trait definitions for the listou supply-list platform.
//!
//! Deliberately free of HTTP and database dependencies; every other crate
//! in the workspace depends on this one.

// Native `async fn` in traits is fine here; the advisory lint about `Send`
// bounds on the returned futures does not apply to our RPITIT signatures.
#![allow(async_fn_in_trait)]

pub mod cart;
pub mod catalog;
pub mod cep;
pub mod error;
pub mod item;
pub mod link;
pub mod store;
pub mod suggest;
pub mod track;

pub use error::{Error, Result};

//! Core types, access policy and enrollment service for the coursehub portal.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::PortalStore`]; the web layer drives
//! [`service::Service`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod course;
pub mod enrollment;
pub mod error;
pub mod policy;
pub mod resource;
pub mod service;
pub mod session;
pub mod store;
pub mod user;

pub use error::{Error, ErrorKind, Result};

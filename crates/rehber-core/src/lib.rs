//! Core types and trait definitions for the rehber contact directory.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod contact;
pub mod patch;
pub mod store;

pub use contact::{Contact, ContactSource, Group, NewContact, NewGroup, NewTag, Tag};
pub use patch::{ContactPatch, FieldUpdate, GroupPatch, TagPatch};
pub use store::{ContactQuery, DirectoryStore};

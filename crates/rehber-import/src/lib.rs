//! Batch import for the rehber directory: CSV in, insert-or-merge decisions
//! out, committed through any [`rehber_core::store::DirectoryStore`].
//!
//! The pipeline is deliberately sequential: each row is resolved against the
//! store state left by the previous row, so duplicate phone numbers within
//! one file collapse into a single contact, and re-importing a file is
//! idempotent.

mod resolve;
mod run;

pub use resolve::{Resolution, resolve};
pub use run::{ImportError, ImportSummary, RowRejection, import_csv};

#[cfg(test)]
mod tests;

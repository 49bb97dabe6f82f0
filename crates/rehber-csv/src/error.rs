//! Error types for the rehber-csv codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("csv input contains no header row")]
  MissingHeader,

  #[error("unterminated quoted field starting on line {line}")]
  UnclosedQuote { line: usize },

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

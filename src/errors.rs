// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error types for the summary engine.
//!
//! Storage errors are flattened into strings so the engine does not depend on
//! which backend implements [`crate::ledger::LedgerStore`].

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),

    #[error("Document {0} not found")]
    DocumentNotFound(i64),

    #[error("Ledger store failed: {0}")]
    Store(String),

    #[error("Summary figure '{0}' is out of range")]
    Overflow(&'static str),

    #[error("Worker pool failed: {0}")]
    Pool(String),

    #[error("{failed} of {total} summaries failed to recalculate, first failure: {first}")]
    Recalculation {
        failed: usize,
        total: usize,
        first: Box<Error>,
    },
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Store(err.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Error::Pool(err.to_string())
    }
}

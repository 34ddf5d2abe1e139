// Copyright 2026 The jsongit Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The error taxonomy surfaced by the public API.

use thiserror::Error;

/// Errors raised by the object-store adapter boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{object_type} {hex} not found")]
    ObjectNotFound { object_type: &'static str, hex: String },
    #[error("i/o error accessing the object store")]
    Io(#[from] std::io::Error),
    #[error("could not serialize object for storage")]
    Serialize(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("{0}")]
    Other(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised by the public `Repository`/`Document` API.
#[derive(Debug, Error)]
pub enum Error {
    /// A value could not be encoded, or bytes could not be decoded, as JSON.
    #[error("value could not be encoded or decoded as JSON")]
    NotJson(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A logical key was not a string.
    ///
    /// Unreachable through the typed `&str`-keyed API exposed by
    /// [`crate::Repository`]; kept in the taxonomy for parity with any
    /// future dynamically-typed entry point.
    #[error("key must be a string")]
    BadKey,

    /// No reference exists for the given key.
    #[error("no such key: {0:?}")]
    NotFound(String),

    /// A document handle was merged against a handle from a different
    /// repository.
    #[error("cannot merge documents from different repositories")]
    DifferentRepo,

    /// A caller-supplied argument was invalid for the operation attempted.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation was attempted against a document whose current value is
    /// not of the kind the operation requires (e.g. indexing into a string).
    #[error("operation not supported for this value's kind")]
    TypeMismatch,

    /// The underlying object store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, Error>;

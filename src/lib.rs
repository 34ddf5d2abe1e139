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

//! A versioned key-value store for JSON documents, backed by a
//! content-addressed object graph of blobs, trees, commits and references —
//! the same object model a distributed revision-control system uses for
//! files.
//!
//! Each logical key names an independent lineage of commits. Beyond plain
//! storage, this crate computes structural diffs between JSON documents,
//! detects conflicts between two diffs sharing an ancestor, and performs a
//! three-way merge that fast-forwards, auto-merges non-conflicting changes,
//! or reports a conflict for manual resolution.
//!
//! ```
//! use jsongit::{Codec, CommitOptions, GetBy, Identity, Repository, SimpleStore};
//! use serde_json::json;
//!
//! # fn main() -> jsongit::Result<()> {
//! let dir = tempfile::tempdir().unwrap();
//! let store = SimpleStore::init(dir.path())?;
//! let repo = Repository::new(store, Codec::json(), Identity::from_env());
//!
//! repo.commit("profile", &json!({"name": "ada"}), CommitOptions::default())?;
//! let doc = repo.get(GetBy::Key("profile"), false)?;
//! assert_eq!(doc.value(), &json!({"name": "ada"}));
//! # Ok(())
//! # }
//! ```

mod codec;
mod conflict;
mod content_hash;
mod diff;
mod document;
mod error;
mod hex_util;
mod object_id;
mod repo;
mod signature;
mod simple_store;
mod store;
mod value;

pub use codec::Codec;
pub use conflict::Conflict;
pub use conflict::detect as detect_conflict;
pub use diff::Diff;
pub use diff::apply as apply_diff;
pub use diff::diff as diff_values;
pub use document::Document;
pub use error::Error;
pub use error::Result;
pub use error::StoreError;
pub use error::StoreResult;
pub use object_id::BlobId;
pub use object_id::CommitId;
pub use object_id::ObjectId;
pub use object_id::TreeId;
pub use repo::Commit;
pub use repo::CommitOptions;
pub use repo::GetBy;
pub use repo::MergeResult;
pub use repo::Repository;
pub use signature::Identity;
pub use signature::MillisSinceEpoch;
pub use signature::Signature;
pub use signature::Timestamp;
pub use simple_store::SimpleStore;
pub use store::ObjectStore;
pub use store::WalkOrder;
pub use value::Value;
pub use value::ValueKey;
pub use value::ValueKind;

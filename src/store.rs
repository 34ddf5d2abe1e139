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

//! The object-store adapter contract: a thin, synchronous interface
//! over a content-addressed store of blobs, trees, commits and references.
//! This crate consumes these primitives; it does not implement a general
//! object database. [`SimpleStore`] is a default, disk-backed
//! implementation provided so the crate is usable standalone.

pub use crate::error::StoreError;
pub use crate::error::StoreResult;
use crate::object_id::CommitId;
use crate::object_id::TreeId;
use crate::signature::Signature;

/// The fixed name of a tree's single entry.
pub const DATA_ENTRY_NAME: &str = "data";
/// The fixed file mode recorded for the `data` entry.
pub const DATA_ENTRY_MODE: &str = "100644";

/// An immutable commit: a tree, its parents, signatures, a message.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Commit {
    pub tree_id: TreeId,
    pub parents: Vec<CommitId>,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}

impl Commit {
    /// A root commit has no parents; a linear commit has one; a merge
    /// commit has (at least) two.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

/// How [`ObjectStore::walk`] orders the commits it yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOrder {
    /// Parents are yielded after children; sibling order is deterministic
    /// but otherwise unspecified. This is the default.
    Topological,
    /// Commits are yielded from newest to oldest by committer timestamp.
    Time,
}

impl Default for WalkOrder {
    fn default() -> Self {
        Self::Topological
    }
}

/// The contract the repository manager relies on. All methods are
/// synchronous: a concrete adapter that needs to block on I/O does so only
/// inside its own primitive calls, consistent with this crate's
/// single-threaded, cooperative concurrency model.
pub trait ObjectStore {
    /// Writes `bytes` as a blob and returns its id. Writing identical bytes
    /// twice yields identical ids.
    fn write_blob(&self, bytes: &[u8]) -> StoreResult<crate::object_id::BlobId>;

    /// Reads back the bytes of a previously written blob.
    fn read_blob(&self, id: &crate::object_id::BlobId) -> StoreResult<Vec<u8>>;

    /// Writes a tree with exactly one entry, `(entry_name, blob_id)` at
    /// `mode`, and returns its id.
    fn write_tree_single(
        &self,
        entry_name: &str,
        blob_id: &crate::object_id::BlobId,
        mode: &str,
    ) -> StoreResult<TreeId>;

    /// Returns the blob id stored in a tree's `data` entry.
    fn tree_data_blob(&self, tree_id: &TreeId) -> StoreResult<crate::object_id::BlobId>;

    /// Atomically writes a commit object and updates `ref_name` to point at
    /// it, returning the new commit's id.
    fn create_commit(
        &self,
        ref_name: &str,
        tree_id: &TreeId,
        parents: &[CommitId],
        author: &Signature,
        committer: &Signature,
        message: &str,
    ) -> StoreResult<CommitId>;

    /// Reads back a previously written commit.
    fn read_commit(&self, id: &CommitId) -> StoreResult<Commit>;

    /// The tree id of a commit, without reading the whole commit.
    fn tree_of(&self, id: &CommitId) -> StoreResult<TreeId> {
        Ok(self.read_commit(id)?.tree_id)
    }

    /// Looks up the commit a reference currently points at.
    ///
    /// Fails with [`StoreError::ObjectNotFound`] when the reference does
    /// not exist.
    fn lookup_reference(&self, name: &str) -> StoreResult<CommitId>;

    /// Creates (or overwrites) a reference to point at `commit_id`.
    fn create_reference(&self, name: &str, commit_id: &CommitId) -> StoreResult<()>;

    /// Deletes a reference. A no-op if it does not exist.
    fn delete_reference(&self, name: &str) -> StoreResult<()>;

    /// Updates `name` to `new` only if it currently points at `expected`
    /// (or does not exist, when `expected` is `None`), returning whether
    /// the swap took place.
    ///
    /// The default implementation performs an unconditional update and
    /// always returns `true`; backends that can provide a real compare-and-
    /// swap primitive should override this to give the repository manager
    /// stronger concurrency guarantees.
    fn compare_and_swap_reference(
        &self,
        name: &str,
        _expected: Option<&CommitId>,
        new: &CommitId,
    ) -> StoreResult<bool> {
        self.create_reference(name, new)?;
        Ok(true)
    }

    /// Walks commits reachable from `start`, in `order`.
    fn walk(
        &self,
        start: &CommitId,
        order: WalkOrder,
    ) -> StoreResult<Box<dyn Iterator<Item = StoreResult<CommitId>>>>;

    /// Releases all persistent state held by this store.
    fn destroy(&self) -> StoreResult<()>;
}

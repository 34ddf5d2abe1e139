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

//! The repository manager: the public façade composing the object
//! store, the diff engine and the conflict detector into `commit`, `get`,
//! `fast_forward`, `log` and `merge`.

use std::sync::Arc;

use crate::codec::Codec;
use crate::conflict::Conflict;
use crate::conflict::detect;
use crate::diff::apply;
use crate::diff::diff;
use crate::document::Document;
use crate::error::Error;
use crate::error::Result;
use crate::error::StoreResult;
use crate::object_id::CommitId;
use crate::object_id::ObjectId as _;
use crate::object_id::TreeId;
use crate::signature::Identity;
use crate::signature::Signature;
use crate::store::Commit as StoreCommit;
use crate::store::DATA_ENTRY_MODE;
use crate::store::DATA_ENTRY_NAME;
use crate::store::ObjectStore;
use crate::store::WalkOrder;
use crate::value::Value;

/// A commit as handed back to callers: the fields an [`ObjectStore`] persists,
/// plus the id they hash to (the store itself never stores a commit's own id
/// alongside it, since the id is a pure function of the other fields).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub id: CommitId,
    pub tree_id: TreeId,
    pub parents: Vec<CommitId>,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}

impl Commit {
    fn from_store(id: CommitId, commit: StoreCommit) -> Self {
        Self {
            id,
            tree_id: commit.tree_id,
            parents: commit.parents,
            author: commit.author,
            committer: commit.committer,
            message: commit.message,
        }
    }

    pub fn hex(&self) -> String {
        self.id.hex()
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Selects how [`Repository::get`] locates the commit to load. The original
/// API accepted `key` and `commit` as two optional parameters with an
/// "exactly one" runtime constraint; an enum makes that constraint a type
/// invariant instead, so there is no `InvalidArgument` case to raise here.
pub enum GetBy<'a> {
    Key(&'a str),
    Commit(&'a CommitId),
}

/// Optional parameters to [`Repository::commit`]. All fields default to the
/// behavior described on that method.
#[derive(Debug, Clone, Default)]
pub struct CommitOptions {
    pub message: Option<String>,
    pub author: Option<Signature>,
    pub committer: Option<Signature>,
    pub parents: Option<Vec<CommitId>>,
    pub autocommit: bool,
}

/// The outcome of [`Repository::merge`].
#[derive(Debug, Clone)]
pub struct MergeResult {
    pub successful: bool,
    pub source_commit: Commit,
    pub dest_commit: Commit,
    pub message: String,
    pub conflict: Option<Conflict>,
}

struct RepositoryInner<S> {
    store: S,
    codec: Codec,
    identity: Identity,
}

/// The public façade over an [`ObjectStore`]. Cheap to clone: cloning shares
/// the same store handle, codec and identity via an `Arc`, so many
/// [`Document`] handles can each hold their own `Repository` without
/// duplicating any of that state.
pub struct Repository<S> {
    inner: Arc<RepositoryInner<S>>,
}

impl<S> Clone for Repository<S> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<S> std::fmt::Debug for Repository<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository").finish_non_exhaustive()
    }
}

impl<S: ObjectStore + 'static> Repository<S> {
    pub fn new(store: S, codec: Codec, identity: Identity) -> Self {
        Self { inner: Arc::new(RepositoryInner { store, codec, identity }) }
    }

    fn ref_name(key: &str) -> String {
        format!("refs/{key}/HEAD")
    }

    /// True iff two `Repository` values share the same underlying store
    /// handle, i.e. are clones of one another rather than two independently
    /// constructed repositories that merely happen to point at the same
    /// backing storage.
    pub(crate) fn same_store(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn read_value_at(&self, tree_id: &TreeId) -> Result<Value> {
        let blob_id = self.inner.store.tree_data_blob(tree_id)?;
        let bytes = self.inner.store.read_blob(&blob_id)?;
        self.inner.codec.decode(&bytes)
    }

    fn raw_commit(
        &self,
        key: &str,
        value: &Value,
        message: &str,
        parents: &[CommitId],
        author: &Signature,
        committer: &Signature,
    ) -> Result<CommitId> {
        let bytes = self.inner.codec.encode(value)?;
        let blob_id = self.inner.store.write_blob(&bytes)?;
        let tree_id = self.inner.store.write_tree_single(DATA_ENTRY_NAME, &blob_id, DATA_ENTRY_MODE)?;
        let ref_name = Self::ref_name(key);
        let commit_id = self.inner.store.create_commit(&ref_name, &tree_id, parents, author, committer, message)?;
        Ok(commit_id)
    }

    /// True iff a reference exists for `key`.
    pub fn has(&self, key: &str) -> Result<bool> {
        match self.inner.store.lookup_reference(&Self::ref_name(key)) {
            Ok(_) => Ok(true),
            Err(crate::store::StoreError::ObjectNotFound { object_type: "Reference", .. }) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// The commit currently pointed to by `key`'s reference.
    pub fn head(&self, key: &str) -> Result<Commit> {
        let id = self
            .inner
            .store
            .lookup_reference(&Self::ref_name(key))
            .map_err(|err| match err {
                crate::store::StoreError::ObjectNotFound { object_type: "Reference", .. } => {
                    Error::NotFound(key.to_string())
                }
                other => other.into(),
            })?;
        let commit = self.inner.store.read_commit(&id)?;
        Ok(Commit::from_store(id, commit))
    }

    /// Loads the document at a key's head, or at an explicit commit.
    pub fn get(&self, by: GetBy<'_>, autocommit: bool) -> Result<Document<S>> {
        let (key, commit) = match by {
            GetBy::Key(key) => (Some(key.to_string()), self.head(key)?),
            GetBy::Commit(commit_id) => {
                let store_commit = self.inner.store.read_commit(commit_id)?;
                (None, Commit::from_store(commit_id.clone(), store_commit))
            }
        };
        let value = self.read_value_at(&commit.tree_id)?;
        Ok(Document::new(self.clone(), key, commit, value, autocommit))
    }

    /// Commits `value` under `key`, maintaining parent linkage to the
    /// key's previous head (if any), and returns a handle on the result.
    ///
    /// When `options.parents` is omitted, the new commit's sole parent is
    /// the key's current head, or the commit is a root if the key has no
    /// prior value. When `options.message` is omitted, it is `"first
    /// commit"` for a key's first value and empty otherwise. Missing
    /// signatures default to this repository's identity.
    pub fn commit(&self, key: &str, value: &Value, options: CommitOptions) -> Result<Document<S>> {
        let existed = self.has(key)?;
        let message = options
            .message
            .unwrap_or_else(|| if existed { String::new() } else { "first commit".to_string() });
        let parents = match options.parents {
            Some(parents) => parents,
            None if existed => vec![self.head(key)?.id],
            None => Vec::new(),
        };
        let author = options.author.unwrap_or_else(|| self.inner.identity.signature());
        let committer = options.committer.unwrap_or_else(|| author.clone());
        let commit_id = self.raw_commit(key, value, &message, &parents, &author, &committer)?;
        tracing::debug!(%key, commit = %commit_id, "committed");
        self.get(GetBy::Key(key), options.autocommit)
    }

    /// Re-points `dest_key`'s reference at `source_key`'s head, destructively
    /// abandoning any intervening `dest_key` commits not reachable from
    /// `source_key`. Writes no new commit. `source_key` and `dest_key` must
    /// differ.
    pub fn fast_forward(&self, source_key: &str, dest_key: &str, autocommit: bool) -> Result<Document<S>> {
        if source_key == dest_key {
            return Err(Error::InvalidArgument("source and dest keys must differ".to_string()));
        }
        let source_head = self.head(source_key)?;
        let dest_ref = Self::ref_name(dest_key);
        self.inner.store.delete_reference(&dest_ref)?;
        self.inner.store.create_reference(&dest_ref, &source_head.id)?;
        tracing::debug!(source = %source_key, dest = %dest_key, commit = %source_head.id, "fast-forwarded");
        self.get(GetBy::Key(dest_key), autocommit)
    }

    /// Walks the commits reachable from `key`'s head, in `order`.
    pub fn log(&self, key: &str, order: WalkOrder) -> Result<Box<dyn Iterator<Item = Result<Commit>>>> {
        let head = self.head(key)?;
        self.log_from(&head.id, order)
    }

    /// Walks the commits reachable from an explicit commit id, in `order`.
    /// Used by [`Document::log`](crate::document::Document::log) to walk
    /// from a handle's own (possibly stale) head, the way the original's
    /// `Object.log` wraps `Repository.log` around `self.head` rather than
    /// re-resolving the key.
    pub(crate) fn log_from(&self, commit_id: &CommitId, order: WalkOrder) -> Result<Box<dyn Iterator<Item = Result<Commit>>>> {
        let repo = self.clone();
        let ids = self.inner.store.walk(commit_id, order)?;
        Ok(Box::new(ids.map(move |id| {
            let id = id?;
            let commit = repo.inner.store.read_commit(&id)?;
            Ok(Commit::from_store(id, commit))
        })))
    }

    fn ancestor_ids(&self, head: &CommitId) -> Result<Vec<CommitId>> {
        self.inner
            .store
            .walk(head, WalkOrder::Topological)?
            .collect::<StoreResult<Vec<_>>>()
            .map_err(Error::from)
    }

    /// Merges `source_key` into `dest_key`: fast-forwarding when possible,
    /// auto-merging non-conflicting structural changes otherwise, or
    /// reporting a conflict for manual resolution. See [`MergeResult`].
    pub fn merge(
        &self,
        source_key: &str,
        dest_key: &str,
        author: Option<Signature>,
        committer: Option<Signature>,
    ) -> Result<MergeResult> {
        let source_head = self.head(source_key)?;
        let dest_head = self.head(dest_key)?;

        if source_head.id == dest_head.id {
            return Ok(MergeResult {
                successful: true,
                source_commit: source_head,
                dest_commit: dest_head,
                message: "Same commit".to_string(),
                conflict: None,
            });
        }

        let source_ids = self.ancestor_ids(&source_head.id)?;
        if source_ids.contains(&dest_head.id) {
            self.fast_forward(source_key, dest_key, false)?;
            return Ok(MergeResult {
                successful: true,
                source_commit: source_head,
                dest_commit: dest_head,
                message: "Fast forward".to_string(),
                conflict: None,
            });
        }

        let dest_ids = self.ancestor_ids(&dest_head.id)?;
        let source_id_set: std::collections::HashSet<&CommitId> = source_ids.iter().collect();
        let Some(ancestor_id) = dest_ids.into_iter().find(|id| source_id_set.contains(id)) else {
            return Ok(MergeResult {
                successful: false,
                source_commit: source_head,
                dest_commit: dest_head,
                message: "No shared parent".to_string(),
                conflict: None,
            });
        };

        let ancestor_commit = self.inner.store.read_commit(&ancestor_id)?;
        let ancestor_value = self.read_value_at(&ancestor_commit.tree_id)?;
        let source_value = self.read_value_at(&source_head.tree_id)?;
        let dest_value = self.read_value_at(&dest_head.tree_id)?;

        let source_diff = diff(&ancestor_value, &source_value);
        let dest_diff = diff(&ancestor_value, &dest_value);

        let conflict = detect(&source_diff, &dest_diff);
        if !conflict.is_empty() {
            return Ok(MergeResult {
                successful: false,
                source_commit: source_head,
                dest_commit: dest_head,
                message: "Merge conflict".to_string(),
                conflict: Some(conflict),
            });
        }

        let merged = apply(&dest_diff, &apply(&source_diff, &ancestor_value));
        let message = format!("Auto-merge from {}", ancestor_id.hex());
        let author = author.unwrap_or_else(|| self.inner.identity.signature());
        let committer = committer.unwrap_or_else(|| author.clone());
        let parents = vec![source_head.id.clone(), dest_head.id.clone()];
        let new_commit_id = self.raw_commit(dest_key, &merged, &message, &parents, &author, &committer)?;
        tracing::info!(%source_key, %dest_key, commit = %new_commit_id, "merged");

        Ok(MergeResult {
            successful: true,
            source_commit: source_head,
            dest_commit: dest_head,
            message,
            conflict: None,
        })
    }

    /// Releases all persistent state held by the backing store.
    pub fn destroy(self) -> Result<()> {
        self.inner.store.destroy().map_err(Error::from)
    }
}

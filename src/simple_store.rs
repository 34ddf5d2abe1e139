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

//! A default, disk-backed, content-addressed [`ObjectStore`] implementation.
//! Blobs, trees and commits are hashed with BLAKE2b-512 and persisted as
//! individual files under `blobs/`, `trees/`, `commits/` and `refs/`.
//! Commits and trees are encoded with `serde_json`, which is already a core
//! dependency of this crate.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::content_hash::blake2b_hash;
use crate::object_id::BlobId;
use crate::object_id::CommitId;
use crate::object_id::ObjectId;
use crate::object_id::TreeId;
use crate::signature::Signature;
use crate::store::Commit;
use crate::store::ObjectStore;
use crate::store::StoreError;
use crate::store::StoreResult;
use crate::store::WalkOrder;

#[derive(serde::Serialize, serde::Deserialize)]
struct TreeRecord {
    entries: Vec<TreeEntryRecord>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct TreeEntryRecord {
    name: String,
    blob_id: BlobId,
    mode: String,
}

#[derive(Debug)]
pub struct SimpleStore {
    path: PathBuf,
}

impl SimpleStore {
    /// Initializes a new store rooted at `path`, creating the directory
    /// layout it needs. `path` itself must already exist.
    pub fn init(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        for sub in ["blobs", "trees", "commits", "refs"] {
            fs::create_dir_all(path.join(sub))?;
        }
        Ok(Self { path })
    }

    fn blob_path(&self, id: &BlobId) -> PathBuf {
        self.path.join("blobs").join(id.hex())
    }

    fn tree_path(&self, id: &TreeId) -> PathBuf {
        self.path.join("trees").join(id.hex())
    }

    fn commit_path(&self, id: &CommitId) -> PathBuf {
        self.path.join("commits").join(id.hex())
    }

    fn ref_path(&self, name: &str) -> PathBuf {
        // `name` already carries the full `refs/<key>/HEAD` shape (see
        // `Repository::ref_name`), so this joins directly onto the store
        // root rather than re-nesting under another `refs/` component.
        self.path.join(name)
    }

    fn persist_content_addressed(&self, dir: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut temp = NamedTempFile::new_in(&self.path)?;
        use std::io::Write as _;
        temp.write_all(bytes)?;
        temp.as_file().sync_data()?;
        temp.persist(dir).map_err(|err| err.error)?;
        Ok(())
    }

    fn not_found(object_type: &'static str, id: &impl ObjectId) -> StoreError {
        StoreError::ObjectNotFound {
            object_type,
            hex: id.hex(),
        }
    }

    fn read_reference_file(&self, path: &Path) -> StoreResult<Option<CommitId>> {
        match fs::read_to_string(path) {
            Ok(hex) => Ok(Some(CommitId::from_hex(hex.trim()).ok_or_else(|| {
                StoreError::Other(format!("corrupt reference file {}", path.display()))
            })?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

impl ObjectStore for SimpleStore {
    fn write_blob(&self, bytes: &[u8]) -> StoreResult<BlobId> {
        let id = BlobId::new(blake2b_hash(bytes));
        self.persist_content_addressed(&self.blob_path(&id), bytes)?;
        Ok(id)
    }

    fn read_blob(&self, id: &BlobId) -> StoreResult<Vec<u8>> {
        fs::read(self.blob_path(id)).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                Self::not_found("BlobId", id)
            } else {
                err.into()
            }
        })
    }

    fn write_tree_single(&self, entry_name: &str, blob_id: &BlobId, mode: &str) -> StoreResult<TreeId> {
        let record = TreeRecord {
            entries: vec![TreeEntryRecord {
                name: entry_name.to_string(),
                blob_id: blob_id.clone(),
                mode: mode.to_string(),
            }],
        };
        let bytes = serde_json::to_vec(&record)
            .map_err(|err| StoreError::Serialize(Box::new(err)))?;
        let id = TreeId::new(blake2b_hash(&bytes));
        self.persist_content_addressed(&self.tree_path(&id), &bytes)?;
        Ok(id)
    }

    fn tree_data_blob(&self, tree_id: &TreeId) -> StoreResult<BlobId> {
        let bytes = fs::read(self.tree_path(tree_id)).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                Self::not_found("TreeId", tree_id)
            } else {
                err.into()
            }
        })?;
        let record: TreeRecord =
            serde_json::from_slice(&bytes).map_err(|err| StoreError::Serialize(Box::new(err)))?;
        record
            .entries
            .into_iter()
            .find(|entry| entry.name == crate::store::DATA_ENTRY_NAME)
            .map(|entry| entry.blob_id)
            .ok_or_else(|| StoreError::Other(format!("tree {} has no data entry", tree_id.hex())))
    }

    fn create_commit(
        &self,
        ref_name: &str,
        tree_id: &TreeId,
        parents: &[CommitId],
        author: &Signature,
        committer: &Signature,
        message: &str,
    ) -> StoreResult<CommitId> {
        let commit = Commit {
            tree_id: tree_id.clone(),
            parents: parents.to_vec(),
            author: author.clone(),
            committer: committer.clone(),
            message: message.to_string(),
        };
        let bytes =
            serde_json::to_vec(&commit).map_err(|err| StoreError::Serialize(Box::new(err)))?;
        let id = CommitId::new(blake2b_hash(&bytes));
        self.persist_content_addressed(&self.commit_path(&id), &bytes)?;
        self.create_reference(ref_name, &id)?;
        Ok(id)
    }

    fn read_commit(&self, id: &CommitId) -> StoreResult<Commit> {
        let bytes = fs::read(self.commit_path(id)).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                Self::not_found("CommitId", id)
            } else {
                err.into()
            }
        })?;
        serde_json::from_slice(&bytes).map_err(|err| StoreError::Serialize(Box::new(err)))
    }

    fn lookup_reference(&self, name: &str) -> StoreResult<CommitId> {
        self.read_reference_file(&self.ref_path(name))?
            .ok_or_else(|| StoreError::ObjectNotFound {
                object_type: "Reference",
                hex: name.to_string(),
            })
    }

    fn create_reference(&self, name: &str, commit_id: &CommitId) -> StoreResult<()> {
        let path = self.ref_path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.persist_content_addressed(&path, commit_id.hex().as_bytes())?;
        tracing::trace!(%name, commit = %commit_id, "reference updated");
        Ok(())
    }

    fn delete_reference(&self, name: &str) -> StoreResult<()> {
        match fs::remove_file(self.ref_path(name)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn compare_and_swap_reference(
        &self,
        name: &str,
        expected: Option<&CommitId>,
        new: &CommitId,
    ) -> StoreResult<bool> {
        // Not a true atomic compare-and-swap across processes; a read
        // followed by a write on a local filesystem. Sufficient for the
        // single-threaded cooperative concurrency model this crate targets.
        let current = self.read_reference_file(&self.ref_path(name))?;
        if current.as_ref() != expected {
            return Ok(false);
        }
        self.create_reference(name, new)?;
        Ok(true)
    }

    fn walk(
        &self,
        start: &CommitId,
        order: WalkOrder,
    ) -> StoreResult<Box<dyn Iterator<Item = StoreResult<CommitId>>>> {
        let mut visited = std::collections::HashSet::new();
        let mut preorder = Vec::new();
        let mut stack = vec![start.clone()];
        while let Some(id) = stack.pop() {
            if !visited.insert(id.clone()) {
                continue;
            }
            let commit = self.read_commit(&id)?;
            preorder.push((id, commit));
            // Push in reverse so the first parent is processed next, for a
            // deterministic sibling order.
            stack.extend(commit_parents_reversed(&preorder.last().unwrap().1));
        }

        match order {
            WalkOrder::Topological => {
                Ok(Box::new(preorder.into_iter().map(|(id, _)| Ok(id))))
            }
            WalkOrder::Time => {
                let mut by_time = preorder;
                by_time.sort_by(|(id_a, a), (id_b, b)| {
                    b.committer
                        .timestamp
                        .timestamp
                        .0
                        .cmp(&a.committer.timestamp.timestamp.0)
                        .then_with(|| id_a.hex().cmp(&id_b.hex()))
                });
                Ok(Box::new(by_time.into_iter().map(|(id, _)| Ok(id))))
            }
        }
    }

    fn destroy(&self) -> StoreResult<()> {
        fs::remove_dir_all(&self.path)?;
        Ok(())
    }
}

fn commit_parents_reversed(commit: &Commit) -> Vec<CommitId> {
    commit.parents.iter().cloned().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::signature::Identity;

    fn new_store() -> (tempfile::TempDir, SimpleStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SimpleStore::init(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn writing_identical_bytes_is_idempotent() {
        let (_dir, store) = new_store();
        let a = store.write_blob(b"hello").unwrap();
        let b = store.write_blob(b"hello").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn commit_round_trip_and_ref_update() {
        let (_dir, store) = new_store();
        let blob = store.write_blob(br#"{"a":1}"#).unwrap();
        let tree = store
            .write_tree_single(crate::store::DATA_ENTRY_NAME, &blob, crate::store::DATA_ENTRY_MODE)
            .unwrap();
        let sig = Identity::new("a", "a@example.com").signature();
        let commit_id = store
            .create_commit("refs/k/HEAD", &tree, &[], &sig, &sig, "first commit")
            .unwrap();
        assert_eq!(store.lookup_reference("refs/k/HEAD").unwrap(), commit_id);
        let commit = store.read_commit(&commit_id).unwrap();
        assert!(commit.is_root());
        assert_eq!(commit.message, "first commit");
        assert_eq!(store.tree_data_blob(&commit.tree_id).unwrap(), blob);
    }

    #[test]
    fn lookup_missing_reference_fails() {
        let (_dir, store) = new_store();
        assert_matches!(
            store.lookup_reference("refs/nope/HEAD"),
            Err(StoreError::ObjectNotFound { .. })
        );
    }

    #[test]
    fn walk_visits_each_commit_once_in_topological_order() {
        let (_dir, store) = new_store();
        let blob = store.write_blob(b"1").unwrap();
        let tree = store.write_tree_single("data", &blob, "100644").unwrap();
        let sig = Identity::new("a", "a@example.com").signature();
        let c1 = store
            .create_commit("refs/k/HEAD", &tree, &[], &sig, &sig, "c1")
            .unwrap();
        let c2 = store
            .create_commit("refs/k/HEAD", &tree, &[c1.clone()], &sig, &sig, "c2")
            .unwrap();
        let ids: Vec<_> = store
            .walk(&c2, WalkOrder::Topological)
            .unwrap()
            .collect::<StoreResult<_>>()
            .unwrap();
        assert_eq!(ids, vec![c2, c1]);
    }
}

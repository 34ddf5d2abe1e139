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

//! The document handle: a live, in-memory projection of a key's value
//! at a specific commit, with mutation, optional autocommit, and history
//! navigation.
//!
//! Mutating accessors dispatch on the underlying value's kind (object or
//! array), raising [`Error::TypeMismatch`] on a mismatch rather than
//! reflecting on the value the way the original dynamically-typed handle
//! did. There is deliberately no handle-kind enum here: each accessor
//! performs its own kind check inline.

use crate::error::Error;
use crate::error::Result;
use crate::repo::Commit;
use crate::repo::CommitOptions;
use crate::repo::GetBy;
use crate::repo::MergeResult;
use crate::repo::Repository;
use crate::store::ObjectStore;
use crate::store::WalkOrder;
use crate::value::Value;

/// A live view of one key's document. Created by [`Repository::get`] or
/// [`Repository::commit`]; holds its own decoded value and dirty flag,
/// independent of any other handle on the same key.
pub struct Document<S> {
    repo: Repository<S>,
    key: Option<String>,
    head: Commit,
    value: Value,
    dirty: bool,
    autocommit: bool,
}

impl<S> std::fmt::Debug for Document<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("key", &self.key)
            .field("head", &self.head.id)
            .field("value", &self.value)
            .field("dirty", &self.dirty)
            .field("autocommit", &self.autocommit)
            .finish()
    }
}

impl<S: ObjectStore + 'static> Clone for Document<S> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            key: self.key.clone(),
            head: self.head.clone(),
            value: self.value.clone(),
            dirty: self.dirty,
            autocommit: self.autocommit,
        }
    }
}

impl<S: ObjectStore + 'static> Document<S> {
    pub(crate) fn new(repo: Repository<S>, key: Option<String>, head: Commit, value: Value, autocommit: bool) -> Self {
        Self { repo, key, head, value, dirty: false, autocommit }
    }

    pub fn repo(&self) -> &Repository<S> {
        &self.repo
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn head(&self) -> &Commit {
        &self.head
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn dirty(&self) -> bool {
        self.dirty
    }

    pub fn autocommit(&self) -> bool {
        self.autocommit
    }

    pub fn set_autocommit(&mut self, autocommit: bool) {
        self.autocommit = autocommit;
    }

    /// Runs after a mutation returns successfully: sets `dirty`, then
    /// issues a commit immediately if autocommit is enabled (which in turn
    /// clears `dirty`). If the mutation itself failed, this is never
    /// reached, so `dirty` is left exactly as it was.
    fn finish_mutation(&mut self) -> Result<()> {
        self.dirty = true;
        if self.autocommit {
            self.commit()?;
        }
        Ok(())
    }

    fn key_or_invalid_argument(&self, what: &str) -> Result<&str> {
        self.key
            .as_deref()
            .ok_or_else(|| Error::InvalidArgument(format!("document has no associated key to {what}")))
    }

    /// Commits the handle's current value under its key, using default
    /// commit options (no explicit message/author/parents). Clears the
    /// dirty flag. The handle's `head` is not advanced by this call; call
    /// [`Document::refresh`] to observe the new commit.
    pub fn commit(&mut self) -> Result<()> {
        let key = self.key_or_invalid_argument("commit to")?.to_string();
        self.repo.commit(&key, &self.value, CommitOptions::default())?;
        self.dirty = false;
        Ok(())
    }

    /// Reloads `value` and `head` from the key's current reference state
    /// and clears the dirty flag.
    pub fn refresh(&mut self) -> Result<()> {
        let key = self.key_or_invalid_argument("refresh from")?.to_string();
        let fresh = self.repo.get(GetBy::Key(&key), self.autocommit)?;
        self.head = fresh.head;
        self.value = fresh.value;
        self.dirty = false;
        Ok(())
    }

    /// Walks the commits reachable from this handle's own `head`, in
    /// `order`. This is anchored at the handle's head as of its last
    /// `get`/`commit`/`refresh`, which may be behind the key's current head
    /// in the repository if another commit landed since — mirroring the
    /// original `Object.log`, which wraps `Repository.log` around the
    /// handle's own `head` rather than re-resolving the key.
    pub fn log(&self, order: WalkOrder) -> Result<Box<dyn Iterator<Item = Result<Commit>>>> {
        self.repo.log_from(&self.head.id, order)
    }

    /// Merges `other`'s key into this handle's key (`other` is the merge
    /// source, `self` the destination), refreshing this handle on success.
    /// Fails with [`Error::DifferentRepo`] if the two handles do not share
    /// a repository.
    pub fn merge(&mut self, other: &Document<S>) -> Result<MergeResult> {
        if !self.repo.same_store(&other.repo) {
            return Err(Error::DifferentRepo);
        }
        let dest_key = self.key_or_invalid_argument("merge into")?.to_string();
        let source_key = other.key_or_invalid_argument("merge from")?.to_string();
        let result = self.repo.merge(&source_key, &dest_key, None, None)?;
        if result.successful {
            self.refresh()?;
        }
        Ok(result)
    }

    pub fn get_field(&self, field: &str) -> Result<Option<&Value>> {
        match &self.value {
            Value::Object(map) => Ok(map.get(field)),
            _ => Err(Error::TypeMismatch),
        }
    }

    pub fn contains_key(&self, field: &str) -> Result<bool> {
        match &self.value {
            Value::Object(map) => Ok(map.contains_key(field)),
            _ => Err(Error::TypeMismatch),
        }
    }

    pub fn set_field(&mut self, field: impl Into<String>, value: Value) -> Result<()> {
        match &mut self.value {
            Value::Object(map) => {
                map.insert(field.into(), value);
            }
            _ => return Err(Error::TypeMismatch),
        }
        self.finish_mutation()
    }

    pub fn remove_field(&mut self, field: &str) -> Result<Option<Value>> {
        let removed = match &mut self.value {
            Value::Object(map) => map.remove(field),
            _ => return Err(Error::TypeMismatch),
        };
        self.finish_mutation()?;
        Ok(removed)
    }

    pub fn get_index(&self, index: usize) -> Result<Option<&Value>> {
        match &self.value {
            Value::Array(items) => Ok(items.get(index)),
            _ => Err(Error::TypeMismatch),
        }
    }

    pub fn set_index(&mut self, index: usize, value: Value) -> Result<()> {
        match &mut self.value {
            Value::Array(items) => {
                let slot = items
                    .get_mut(index)
                    .ok_or_else(|| Error::InvalidArgument(format!("index {index} out of bounds")))?;
                *slot = value;
            }
            _ => return Err(Error::TypeMismatch),
        }
        self.finish_mutation()
    }

    pub fn remove_index(&mut self, index: usize) -> Result<Value> {
        let removed = match &mut self.value {
            Value::Array(items) => {
                if index >= items.len() {
                    return Err(Error::InvalidArgument(format!("index {index} out of bounds")));
                }
                items.remove(index)
            }
            _ => return Err(Error::TypeMismatch),
        };
        self.finish_mutation()?;
        Ok(removed)
    }

    pub fn insert_index(&mut self, index: usize, value: Value) -> Result<()> {
        match &mut self.value {
            Value::Array(items) => {
                if index > items.len() {
                    return Err(Error::InvalidArgument(format!("index {index} out of bounds")));
                }
                items.insert(index, value);
            }
            _ => return Err(Error::TypeMismatch),
        }
        self.finish_mutation()
    }

    /// Appends `value` to the end of an array value.
    pub fn push(&mut self, value: Value) -> Result<()> {
        let index = match &self.value {
            Value::Array(items) => items.len(),
            _ => return Err(Error::TypeMismatch),
        };
        self.insert_index(index, value)
    }

    /// The length of an object (field count), array (element count), or
    /// string (character count).
    pub fn len(&self) -> Result<usize> {
        match &self.value {
            Value::Object(map) => Ok(map.len()),
            Value::Array(items) => Ok(items.len()),
            Value::String(s) => Ok(s.chars().count()),
            _ => Err(Error::TypeMismatch),
        }
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|len| len == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::codec::Codec;
    use crate::repo::CommitOptions;
    use crate::signature::Identity;
    use crate::simple_store::SimpleStore;
    use serde_json::json;

    fn new_repo() -> (tempfile::TempDir, Repository<SimpleStore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = SimpleStore::init(dir.path()).unwrap();
        let identity = Identity::new("tester", "tester@example.com");
        (dir, Repository::new(store, Codec::json(), identity))
    }

    #[test]
    fn fresh_document_is_not_dirty() {
        let (_dir, repo) = new_repo();
        let doc = repo.commit("k", &json!({"a": 1}), CommitOptions::default()).unwrap();
        assert!(!doc.dirty());
    }

    #[test]
    fn mutation_sets_dirty_flag() {
        let (_dir, repo) = new_repo();
        let mut doc = repo.commit("k", &json!({"a": 1}), CommitOptions::default()).unwrap();
        doc.set_field("b", json!(2)).unwrap();
        assert!(doc.dirty());
        assert_eq!(doc.value(), &json!({"a": 1, "b": 2}));
    }

    #[test]
    fn commit_clears_dirty_flag() {
        let (_dir, repo) = new_repo();
        let mut doc = repo.commit("k", &json!({"a": 1}), CommitOptions::default()).unwrap();
        doc.set_field("b", json!(2)).unwrap();
        doc.commit().unwrap();
        assert!(!doc.dirty());
        let reloaded = repo.get(GetBy::Key("k"), false).unwrap();
        assert_eq!(reloaded.value(), &json!({"a": 1, "b": 2}));
    }

    #[test]
    fn type_mismatched_mutation_does_not_dirty_and_leaves_value_untouched() {
        let (_dir, repo) = new_repo();
        let mut doc = repo.commit("k", &json!({"a": 1}), CommitOptions::default()).unwrap();
        let result = doc.push(json!(1));
        assert_matches!(result, Err(Error::TypeMismatch));
        assert!(!doc.dirty());
        assert_eq!(doc.value(), &json!({"a": 1}));
    }

    #[test]
    fn autocommit_commits_immediately_and_clears_dirty() {
        let (_dir, repo) = new_repo();
        let mut doc = repo.commit("k", &json!({"a": 1}), CommitOptions::default()).unwrap();
        doc.set_autocommit(true);
        doc.set_field("b", json!(2)).unwrap();
        assert!(!doc.dirty());
        let commits: Vec<_> = repo
            .log("k", crate::store::WalkOrder::Topological)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(commits.len(), 2);
    }

    #[test]
    fn log_walks_from_the_handles_own_head() {
        let (_dir, repo) = new_repo();
        let doc = repo.commit("k", &json!({"a": 1}), CommitOptions::default()).unwrap();
        repo.commit("k", &json!({"a": 2}), CommitOptions::default()).unwrap();

        // `doc` was captured at the first commit, so its own log (anchored
        // at its own, now-stale, head) sees only that one commit even
        // though the key has since moved on.
        let from_doc: Vec<_> = doc.log(crate::store::WalkOrder::Topological).unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(from_doc.len(), 1);
        assert_eq!(from_doc[0].message, "first commit");

        let from_key: Vec<_> = repo
            .log("k", crate::store::WalkOrder::Topological)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(from_key.len(), 2);
    }

    #[test]
    fn array_push_and_remove() {
        let (_dir, repo) = new_repo();
        let mut doc = repo.commit("k", &json!([1, 2]), CommitOptions::default()).unwrap();
        doc.push(json!(3)).unwrap();
        assert_eq!(doc.value(), &json!([1, 2, 3]));
        let removed = doc.remove_index(0).unwrap();
        assert_eq!(removed, json!(1));
        assert_eq!(doc.value(), &json!([2, 3]));
    }

    #[test]
    fn merge_rejects_cross_repository_handles() {
        let (_dir_a, repo_a) = new_repo();
        let (_dir_b, repo_b) = new_repo();
        repo_a.commit("k", &json!({"a": 1}), CommitOptions::default()).unwrap();
        repo_b.commit("k", &json!({"a": 1}), CommitOptions::default()).unwrap();
        let mut dest = repo_a.get(GetBy::Key("k"), false).unwrap();
        let source = repo_b.get(GetBy::Key("k"), false).unwrap();
        assert_matches!(dest.merge(&source), Err(Error::DifferentRepo));
    }

    #[test]
    fn refresh_reloads_value_and_clears_dirty() {
        let (_dir, repo) = new_repo();
        let mut doc = repo.commit("k", &json!({"a": 1}), CommitOptions::default()).unwrap();
        repo.commit("k", &json!({"a": 9}), CommitOptions::default()).unwrap();
        doc.refresh().unwrap();
        assert_eq!(doc.value(), &json!({"a": 9}));
        assert!(!doc.dirty());
    }
}

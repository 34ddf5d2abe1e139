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

//! End-to-end scenarios against a disk-backed repository.

use assert_matches::assert_matches;
use jsongit::Codec;
use jsongit::CommitOptions;
use jsongit::Error;
use jsongit::GetBy;
use jsongit::Identity;
use jsongit::Repository;
use jsongit::SimpleStore;
use jsongit::WalkOrder;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

fn new_repo() -> (TempDir, Repository<SimpleStore>) {
    let dir = tempfile::tempdir().unwrap();
    let store = SimpleStore::init(dir.path()).unwrap();
    let identity = Identity::new("test suite", "suite@example.com");
    (dir, Repository::new(store, Codec::json(), identity))
}

#[test]
fn empty_repository_reports_absence_consistently() {
    let (_dir, repo) = new_repo();
    assert!(!repo.has("k").unwrap());
    assert_matches!(repo.head("k"), Err(Error::NotFound(key)) if key == "k");
    assert_matches!(repo.get(GetBy::Key("k"), false), Err(Error::NotFound(_)));
}

#[test]
fn first_commit_round_trips_and_logs_once() {
    let (_dir, repo) = new_repo();
    let doc = repo.commit("k", &json!({"a": 1}), CommitOptions::default()).unwrap();
    assert_eq!(doc.value(), &json!({"a": 1}));

    let reloaded = repo.get(GetBy::Key("k"), false).unwrap();
    assert_eq!(reloaded.value(), &json!({"a": 1}));

    let log: Vec<_> = repo.log("k", WalkOrder::Topological).unwrap().collect::<jsongit::Result<_>>().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].message, "first commit");
    assert!(log[0].is_root());
}

#[test]
fn linear_update_appends_a_second_commit() {
    let (_dir, repo) = new_repo();
    repo.commit("k", &json!({"a": 1}), CommitOptions::default()).unwrap();
    let second = repo.commit("k", &json!({"a": 1, "b": 2}), CommitOptions::default()).unwrap();
    assert_eq!(second.value(), &json!({"a": 1, "b": 2}));

    let diff = jsongit::diff_values(&json!({"a": 1}), &json!({"a": 1, "b": 2}));
    match diff {
        jsongit::Diff::Structural { appends, .. } => {
            assert_eq!(appends.len(), 1);
        }
        other => panic!("expected a structural diff, got {other:?}"),
    }

    let log: Vec<_> = repo.log("k", WalkOrder::Topological).unwrap().collect::<jsongit::Result<_>>().unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].message, "");
    assert_eq!(log[1].message, "first commit");
}

#[test]
fn fast_forward_merge_repoints_dest_without_a_new_commit() {
    let (_dir, repo) = new_repo();
    repo.commit("source", &json!({"a": 1}), CommitOptions::default()).unwrap();
    let base = repo.head("source").unwrap();
    repo.fast_forward("source", "dest", false).unwrap();
    repo.commit(
        "source",
        &json!({"a": 1, "b": 2}),
        CommitOptions { parents: Some(vec![base.id]), ..Default::default() },
    )
    .unwrap();

    let dest_before_len =
        repo.log("dest", WalkOrder::Topological).unwrap().collect::<jsongit::Result<Vec<_>>>().unwrap().len();

    let result = repo.merge("source", "dest", None, None).unwrap();
    assert!(result.successful);
    assert_eq!(result.message, "Fast forward");
    assert_eq!(repo.head("dest").unwrap().id, repo.head("source").unwrap().id);

    let dest_after_len =
        repo.log("dest", WalkOrder::Topological).unwrap().collect::<jsongit::Result<Vec<_>>>().unwrap().len();
    assert_eq!(dest_after_len, dest_before_len + 1, "fast-forward advances the ref but writes no new object");
}

#[test]
fn three_way_auto_merge_combines_disjoint_additions() {
    let (_dir, repo) = new_repo();
    repo.commit("k", &json!({"a": 1}), CommitOptions::default()).unwrap();
    let ancestor = repo.head("k").unwrap();
    repo.fast_forward("k", "source", false).unwrap();
    repo.fast_forward("k", "dest", false).unwrap();

    repo.commit(
        "source",
        &json!({"a": 1, "b": 2}),
        CommitOptions { parents: Some(vec![ancestor.id.clone()]), ..Default::default() },
    )
    .unwrap();
    repo.commit(
        "dest",
        &json!({"a": 1, "c": 3}),
        CommitOptions { parents: Some(vec![ancestor.id]), ..Default::default() },
    )
    .unwrap();

    let source_head = repo.head("source").unwrap();
    let dest_head_before = repo.head("dest").unwrap();

    let result = repo.merge("source", "dest", None, None).unwrap();
    assert!(result.successful);

    let merged = repo.get(GetBy::Key("dest"), false).unwrap();
    assert_eq!(merged.value(), &json!({"a": 1, "b": 2, "c": 3}));
    assert_eq!(merged.head().parents, vec![source_head.id, dest_head_before.id]);
}

#[test]
fn conflicting_merge_reports_failure_and_changes_nothing() {
    let (_dir, repo) = new_repo();
    repo.commit("k", &json!({"a": 1}), CommitOptions::default()).unwrap();
    let ancestor = repo.head("k").unwrap();
    repo.fast_forward("k", "source", false).unwrap();
    repo.fast_forward("k", "dest", false).unwrap();

    repo.commit(
        "source",
        &json!({"a": 2}),
        CommitOptions { parents: Some(vec![ancestor.id.clone()]), ..Default::default() },
    )
    .unwrap();
    repo.commit(
        "dest",
        &json!({"a": 3}),
        CommitOptions { parents: Some(vec![ancestor.id]), ..Default::default() },
    )
    .unwrap();
    let dest_before = repo.head("dest").unwrap();

    let result = repo.merge("source", "dest", None, None).unwrap();
    assert!(!result.successful);
    assert_eq!(result.message, "Merge conflict");
    let conflict = result.conflict.expect("a conflict must be reported");
    match conflict {
        jsongit::Conflict::Structural { updates, .. } => {
            let key = jsongit::ValueKey::Field("a".to_string());
            assert_eq!(updates.get(&key), Some(&(Some(json!(2)), Some(json!(3)))));
        }
        other => panic!("expected a structural conflict, got {other:?}"),
    }
    assert_eq!(repo.head("dest").unwrap().id, dest_before.id);
}

#[test]
fn merge_of_equal_heads_is_a_no_op() {
    let (_dir, repo) = new_repo();
    repo.commit("k", &json!({"a": 1}), CommitOptions::default()).unwrap();
    repo.fast_forward("k", "other", false).unwrap();

    let before = repo.log("k", WalkOrder::Topological).unwrap().collect::<jsongit::Result<Vec<_>>>().unwrap().len();
    let result = repo.merge("k", "other", None, None).unwrap();
    assert!(result.successful);
    assert_eq!(result.message, "Same commit");
    let after = repo.log("k", WalkOrder::Topological).unwrap().collect::<jsongit::Result<Vec<_>>>().unwrap().len();
    assert_eq!(before, after);
}

#[test]
fn merge_without_a_shared_parent_fails_cleanly() {
    let (_dir, repo) = new_repo();
    repo.commit("a", &json!({"x": 1}), CommitOptions::default()).unwrap();
    repo.commit("b", &json!({"y": 2}), CommitOptions::default()).unwrap();

    let result = repo.merge("a", "b", None, None).unwrap();
    assert!(!result.successful);
    assert_eq!(result.message, "No shared parent");
}

#[test]
fn destroy_releases_the_backing_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_path_buf();
    let store = SimpleStore::init(&path).unwrap();
    let repo = Repository::new(store, Codec::json(), Identity::from_env());
    repo.commit("k", &json!({"a": 1}), CommitOptions::default()).unwrap();
    repo.destroy().unwrap();
    assert!(!path.exists());
}

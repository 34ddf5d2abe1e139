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

//! The structural diff engine: computing a typed, recursive
//! description of how one JSON value differs from another, and applying
//! such a description to a base value to reconstruct the derived value.
//!
//! This is not a `patch(1)`-style line diff. It is purely structural: it
//! knows about object fields and array positions, not text.

use indexmap::IndexMap;
use serde_json::Map;
use serde_json::Value;

use crate::value::ValueKey;
use crate::value::ValueKind;
use crate::value::kind_of;

/// A structural description of the change from one JSON value to another.
#[derive(Debug, Clone, PartialEq)]
pub enum Diff {
    /// The new value is `v`, unconditionally, regardless of the base it is
    /// applied to. Used when the compared values have differing top-level
    /// types, or either is a scalar.
    Replace(Value),
    /// Both values are containers (object or array) of the same kind.
    /// Any of the three maps may be empty; a diff with all three empty is
    /// the identity diff.
    Structural {
        removals: IndexMap<ValueKey, Value>,
        updates: IndexMap<ValueKey, Diff>,
        appends: IndexMap<ValueKey, Value>,
    },
}

impl Diff {
    /// The identity diff: applying it to any value returns that value
    /// unchanged.
    pub fn identity() -> Self {
        Self::Structural {
            removals: IndexMap::new(),
            updates: IndexMap::new(),
            appends: IndexMap::new(),
        }
    }

    /// Whether this diff represents no change at all. A `Replace` is never
    /// considered identity, even `Replace(v)` where `v` equals the base —
    /// callers only ever see `Replace` when `diff` already determined the
    /// types differed or a scalar was involved, and [`diff`] only produces
    /// `Structural` with empty maps for genuinely equal values.
    pub fn is_identity(&self) -> bool {
        matches!(
            self,
            Self::Structural { removals, updates, appends }
                if removals.is_empty() && updates.is_empty() && appends.is_empty()
        )
    }
}

/// Computes the structural diff from `a` to `b`.
pub fn diff(a: &Value, b: &Value) -> Diff {
    if a == b {
        return Diff::identity();
    }
    if kind_of(a) != kind_of(b) || matches!(kind_of(a), ValueKind::Null | ValueKind::Bool | ValueKind::Number | ValueKind::String) {
        return Diff::Replace(b.clone());
    }
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => diff_object(a, b),
        (Value::Array(a), Value::Array(b)) => diff_array(a, b),
        _ => unreachable!("kind_of(a) == kind_of(b) and neither is scalar"),
    }
}

fn diff_object(a: &Map<String, Value>, b: &Map<String, Value>) -> Diff {
    let mut removals = IndexMap::new();
    let mut updates = IndexMap::new();
    let mut appends = IndexMap::new();

    for (key, value) in a {
        if !b.contains_key(key) {
            removals.insert(ValueKey::Field(key.clone()), value.clone());
        }
    }
    for (key, value) in b {
        if !a.contains_key(key) {
            appends.insert(ValueKey::Field(key.clone()), value.clone());
        }
    }
    for (key, a_value) in a {
        if let Some(b_value) = b.get(key) {
            if a_value != b_value {
                updates.insert(ValueKey::Field(key.clone()), diff(a_value, b_value));
            }
        }
    }

    Diff::Structural { removals, updates, appends }
}

fn diff_array(a: &[Value], b: &[Value]) -> Diff {
    let mut removals = IndexMap::new();
    let mut updates = IndexMap::new();
    let mut appends = IndexMap::new();

    for index in b.len()..a.len() {
        removals.insert(ValueKey::Index(index), a[index].clone());
    }
    for index in a.len()..b.len() {
        appends.insert(ValueKey::Index(index), b[index].clone());
    }
    for index in 0..a.len().min(b.len()) {
        if a[index] != b[index] {
            updates.insert(ValueKey::Index(index), diff(&a[index], &b[index]));
        }
    }

    Diff::Structural { removals, updates, appends }
}

/// Applies `diff` to `base`, reconstructing the value `diff` was computed
/// towards. Never fails: an index or field named by `diff` that is absent
/// from `base` (which can only happen when applying a diff to a value it
/// was not computed against, e.g. during a three-way merge — see the
/// conflict detector's documentation) is skipped for removals/updates, and
/// clamped to the end of the array for array appends, rather than
/// panicking.
pub fn apply(diff: &Diff, base: &Value) -> Value {
    let (removals, updates, appends) = match diff {
        Diff::Replace(v) => return v.clone(),
        Diff::Structural { removals, updates, appends } => (removals, updates, appends),
    };

    match base {
        Value::Object(map) => apply_object(removals, updates, appends, map),
        Value::Array(items) => apply_array(removals, updates, appends, items),
        other => other.clone(),
    }
}

fn apply_object(
    removals: &IndexMap<ValueKey, Value>,
    updates: &IndexMap<ValueKey, Diff>,
    appends: &IndexMap<ValueKey, Value>,
    base: &Map<String, Value>,
) -> Value {
    let mut result = base.clone();
    for key in removals.keys() {
        if let Some(field) = key.as_field() {
            result.remove(field);
        }
    }
    for (key, sub) in updates {
        if let Some(field) = key.as_field() {
            if let Some(current) = base.get(field) {
                result.insert(field.to_string(), apply(sub, current));
            }
        }
    }
    for (key, value) in appends {
        if let Some(field) = key.as_field() {
            result.insert(field.to_string(), value.clone());
        }
    }
    Value::Object(result)
}

fn apply_array(
    removals: &IndexMap<ValueKey, Value>,
    updates: &IndexMap<ValueKey, Diff>,
    appends: &IndexMap<ValueKey, Value>,
    base: &[Value],
) -> Value {
    let mut result = base.to_vec();

    for (key, sub) in updates {
        if let Some(index) = key.as_index() {
            if let Some(current) = base.get(index) {
                if let Some(slot) = result.get_mut(index) {
                    *slot = apply(sub, current);
                }
            }
        }
    }

    let mut removal_indices: Vec<usize> = removals.keys().filter_map(ValueKey::as_index).collect();
    removal_indices.sort_unstable_by(|a, b| b.cmp(a));
    for index in removal_indices {
        if index < result.len() {
            result.remove(index);
        }
    }

    let mut append_entries: Vec<(usize, &Value)> = appends
        .iter()
        .filter_map(|(key, value)| key.as_index().map(|index| (index, value)))
        .collect();
    append_entries.sort_by_key(|(index, _)| *index);
    for (index, value) in append_entries {
        let index = index.min(result.len());
        result.insert(index, value.clone());
    }

    Value::Array(result)
}

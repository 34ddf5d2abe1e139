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

//! The conflict detector: given two diffs computed against a common
//! ancestor, classifies overlapping edits.
//!
//! Deliberately conservative: a collision on the same key under `updates`
//! on both sides is reported whole even when the nested diffs would
//! themselves be compatible (the detector never recurses into nested
//! `updates`). This mirrors the conservative behavior of the original
//! key-value store this crate supersedes, and is preserved rather than
//! "fixed".

use indexmap::IndexMap;
use itertools::iproduct;

use crate::diff::Diff;
use crate::value::Value;
use crate::value::ValueKey;

/// One of the three edit kinds a [`Diff::Structural`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Verb {
    Removal,
    Update,
    Append,
}

const VERBS: [Verb; 3] = [Verb::Removal, Verb::Update, Verb::Append];

/// A structural summary of overlapping, incompatible edits from two diffs
/// sharing an ancestor. Each entry pairs the left side's effect with the
/// right side's effect; `None` on one side means that side did not touch
/// the key under that verb (the "null sentinel" pattern below).
#[derive(Debug, Clone, PartialEq)]
pub enum Conflict {
    /// A replacement conflict. `None` on a side means that side never
    /// performed a wholesale replacement at all — it made a non-identity
    /// structural edit instead, so there is no single value to report for
    /// it (the null sentinel, as in `Structural`'s sub-maps).
    Replace { left: Option<Value>, right: Option<Value> },
    Structural {
        removals: IndexMap<ValueKey, (Option<Value>, Option<Value>)>,
        updates: IndexMap<ValueKey, (Option<Value>, Option<Value>)>,
        appends: IndexMap<ValueKey, (Option<Value>, Option<Value>)>,
    },
}

impl Conflict {
    fn empty_structural() -> Self {
        Self::Structural {
            removals: IndexMap::new(),
            updates: IndexMap::new(),
            appends: IndexMap::new(),
        }
    }

    /// A conflict is empty iff all its sub-maps are empty and it is not a
    /// `Replace` conflict (a `Replace` conflict is never constructed unless
    /// the two replacements genuinely differ, so it is never empty).
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Replace { .. } => false,
            Self::Structural { removals, updates, appends } => {
                removals.is_empty() && updates.is_empty() && appends.is_empty()
            }
        }
    }
}

/// Detects conflicts between `left` and `right`, two diffs computed against
/// the same ancestor value.
pub fn detect(left: &Diff, right: &Diff) -> Conflict {
    match (left, right) {
        (Diff::Replace(l), Diff::Replace(r)) => {
            if l == r {
                Conflict::empty_structural()
            } else {
                Conflict::Replace { left: Some(l.clone()), right: Some(r.clone()) }
            }
        }
        (Diff::Replace(l), right @ Diff::Structural { .. }) => {
            if right.is_identity() {
                Conflict::empty_structural()
            } else {
                Conflict::Replace { left: Some(l.clone()), right: None }
            }
        }
        (left @ Diff::Structural { .. }, Diff::Replace(r)) => {
            if left.is_identity() {
                Conflict::empty_structural()
            } else {
                Conflict::Replace { left: None, right: Some(r.clone()) }
            }
        }
        (Diff::Structural { .. }, Diff::Structural { .. }) => detect_structural(left, right),
    }
}

fn detect_structural(left: &Diff, right: &Diff) -> Conflict {
    let Diff::Structural { removals: l_rem, updates: l_upd, appends: l_app } = left else {
        unreachable!()
    };
    let Diff::Structural { removals: r_rem, updates: r_upd, appends: r_app } = right else {
        unreachable!()
    };

    let mut removals = IndexMap::new();
    let mut updates = IndexMap::new();
    let mut appends = IndexMap::new();

    for (&verb_l, &verb_r) in iproduct!(&VERBS, &VERBS) {
        let keys_l: Vec<&ValueKey> = match verb_l {
            Verb::Removal => l_rem.keys().collect(),
            Verb::Update => l_upd.keys().collect(),
            Verb::Append => l_app.keys().collect(),
        };
        for key in keys_l {
            let present_r = match verb_r {
                Verb::Removal => r_rem.contains_key(key),
                Verb::Update => r_upd.contains_key(key),
                Verb::Append => r_app.contains_key(key),
            };
            if !present_r {
                continue;
            }
            let left_value = value_at(left_verb_maps(l_rem, l_upd, l_app), verb_l, key);
            let right_value = value_at(left_verb_maps(r_rem, r_upd, r_app), verb_r, key);
            if verb_l == verb_r {
                if left_value != right_value {
                    insert_conflict(&mut removals, &mut updates, &mut appends, verb_l, key.clone(), Some(left_value), Some(right_value));
                }
            } else {
                insert_conflict(&mut removals, &mut updates, &mut appends, verb_l, key.clone(), Some(left_value), None);
                insert_conflict(&mut removals, &mut updates, &mut appends, verb_r, key.clone(), None, Some(right_value));
            }
        }
    }

    Conflict::Structural { removals, updates, appends }
}

/// The three sub-maps of a `Structural` diff, with `updates` represented
/// by its recursive `Diff` values rendered to a comparable/displayable
/// `Value` snapshot where needed. We keep `removals`/`appends` as `Value`
/// and `updates` as `Diff`; this helper unifies access for the generic
/// double loop above by converting an `updates` entry to the value a
/// `Replace`-style comparison would use (the diff itself, compared
/// structurally via `PartialEq` on `Diff`, with a `Value` rendering for
/// conflict reporting producing the diff's nested `Replace` value when
/// available, else a best-effort JSON object describing the nested change).
struct VerbMaps<'a> {
    removals: &'a IndexMap<ValueKey, Value>,
    updates: &'a IndexMap<ValueKey, Diff>,
    appends: &'a IndexMap<ValueKey, Value>,
}

fn left_verb_maps<'a>(
    removals: &'a IndexMap<ValueKey, Value>,
    updates: &'a IndexMap<ValueKey, Diff>,
    appends: &'a IndexMap<ValueKey, Value>,
) -> VerbMaps<'a> {
    VerbMaps { removals, updates, appends }
}

fn value_at(maps: VerbMaps<'_>, verb: Verb, key: &ValueKey) -> Value {
    match verb {
        Verb::Removal => maps.removals.get(key).cloned().unwrap_or(Value::Null),
        Verb::Append => maps.appends.get(key).cloned().unwrap_or(Value::Null),
        Verb::Update => maps
            .updates
            .get(key)
            .map(diff_as_conflict_value)
            .unwrap_or(Value::Null),
    }
}

/// Renders a nested `Diff` as the `Value` recorded in a conflict entry.
/// `Replace(v)` renders as `v` itself, so a conflicting field update is
/// recorded as `updates["a"] == (2, 3)` — the replacement values, not the
/// diff that produced them. A non-replace structural sub-diff has no
/// single representative value; it is rendered as a JSON object carrying
/// its three sub-maps so no information is lost.
fn diff_as_conflict_value(diff: &Diff) -> Value {
    match diff {
        Diff::Replace(v) => v.clone(),
        Diff::Structural { removals, updates, appends } => serde_json::json!({
            "removals": removals.iter().map(|(k, v)| (k.to_string(), v.clone())).collect::<serde_json::Map<_, _>>(),
            "updates": updates.iter().map(|(k, v)| (k.to_string(), diff_as_conflict_value(v))).collect::<serde_json::Map<_, _>>(),
            "appends": appends.iter().map(|(k, v)| (k.to_string(), v.clone())).collect::<serde_json::Map<_, _>>(),
        }),
    }
}

#[allow(clippy::too_many_arguments)]
fn insert_conflict(
    removals: &mut IndexMap<ValueKey, (Option<Value>, Option<Value>)>,
    updates: &mut IndexMap<ValueKey, (Option<Value>, Option<Value>)>,
    appends: &mut IndexMap<ValueKey, (Option<Value>, Option<Value>)>,
    verb: Verb,
    key: ValueKey,
    left: Option<Value>,
    right: Option<Value>,
) {
    let target = match verb {
        Verb::Removal => &mut *removals,
        Verb::Update => &mut *updates,
        Verb::Append => &mut *appends,
    };
    target
        .entry(key)
        .and_modify(|(l, r)| {
            if left.is_some() {
                *l = left.clone();
            }
            if right.is_some() {
                *r = right.clone();
            }
        })
        .or_insert((left, right));
}

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

//! The blob encoding: how a JSON value is turned into the bytes a
//! blob stores, and back.

use crate::error::Error;
use crate::value::Value;

/// A pair of pure functions converting between a [`Value`] and the bytes
/// persisted in a blob. The default, [`Codec::json`], is the only codec
/// this crate ships; it is a struct of function pointers rather than a
/// trait object so a [`crate::Repository`] can hold one by value without
/// an extra allocation or `dyn` indirection.
#[derive(Clone, Copy)]
pub struct Codec {
    encode: fn(&Value) -> Result<Vec<u8>, Error>,
    decode: fn(&[u8]) -> Result<Value, Error>,
}

impl Codec {
    /// Encodes as canonical, compact JSON.
    pub fn json() -> Self {
        Self {
            encode: |value| serde_json::to_vec(value).map_err(|err| Error::NotJson(Box::new(err))),
            decode: |bytes| serde_json::from_slice(bytes).map_err(|err| Error::NotJson(Box::new(err))),
        }
    }

    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, Error> {
        (self.encode)(value)
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<Value, Error> {
        (self.decode)(bytes)
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::json()
    }
}

impl std::fmt::Debug for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codec").finish_non_exhaustive()
    }
}

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

//! BLAKE2b-512 content hashing, used to derive object ids from the bytes
//! persisted for a blob, tree or commit.

use blake2::Blake2b512;
use blake2::Digest as _;

/// Hashes `bytes` with BLAKE2b-512 and returns the raw digest.
pub fn blake2b_hash(bytes: &[u8]) -> Vec<u8> {
    let mut hasher = Blake2b512::new();
    hasher.update(bytes);
    hasher.finalize().to_vec()
}

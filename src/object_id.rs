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

//! Content-addressed identifiers for blobs, trees and commits.

use crate::hex_util;

/// A content hash identifying an object in the store.
pub trait ObjectId {
    fn object_type(&self) -> &'static str;
    fn as_bytes(&self) -> &[u8];
    fn hex(&self) -> String;
}

// Defines a newtype wrapping the bytes of a content hash, along with the
// common `ObjectId` boilerplate.
macro_rules! id_type {
    ($(#[$attr:meta])* $vis:vis $name:ident) => {
        $(#[$attr])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis struct $name(Vec<u8>);

        impl $name {
            pub fn new(bytes: Vec<u8>) -> Self {
                Self(bytes)
            }

            pub fn from_hex(hex: impl AsRef<[u8]>) -> Option<Self> {
                hex_util::decode_hex(hex).map(Self)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.hex()).finish()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.hex())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                self.hex().serialize(serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let hex = String::deserialize(deserializer)?;
                Self::from_hex(&hex).ok_or_else(|| serde::de::Error::custom("invalid hex id"))
            }
        }

        impl ObjectId for $name {
            fn object_type(&self) -> &'static str {
                stringify!($name)
            }

            fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            fn hex(&self) -> String {
                hex_util::encode_hex(&self.0)
            }
        }
    };
}

id_type!(
    /// Identifies a blob: the bytes of a single encoded JSON document.
    pub BlobId
);
id_type!(
    /// Identifies a tree: a single `data` entry pointing at a blob.
    pub TreeId
);
id_type!(
    /// Identifies a commit.
    pub CommitId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let id = CommitId::new(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(id.hex(), "deadbeef");
        assert_eq!(CommitId::from_hex("deadbeef").unwrap(), id);
    }

    #[test]
    fn debug_and_display_use_hex() {
        let id = BlobId::new(vec![0x01]);
        assert_eq!(format!("{id}"), "01");
        assert_eq!(format!("{id:?}"), "BlobId(\"01\")");
    }
}

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

//! Author/committer identity and commit timestamps.

use serde::Deserialize;
use serde::Serialize;

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MillisSinceEpoch(pub i64);

/// A point in time with its UTC offset, the way a commit records it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub timestamp: MillisSinceEpoch,
    /// Offset from UTC, in minutes.
    pub tz_offset: i32,
}

impl Timestamp {
    pub fn now() -> Self {
        let now = chrono::Local::now();
        Self {
            timestamp: MillisSinceEpoch(now.timestamp_millis()),
            tz_offset: now.offset().local_minus_utc() / 60,
        }
    }
}

/// A commit's author or committer, recorded at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub timestamp: Timestamp,
}

/// The process-wide author/committer identity, resolved once when a
/// [`crate::Repository`] is constructed and used whenever a caller does not
/// supply an explicit author or committer. This mirrors the original
/// implementation's read of the host revision-control environment's global
/// configuration at repository-construction time, without depending on any
/// particular host VCS: callers either supply an `Identity` directly or use
/// [`Identity::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Resolves an identity from `JSONGIT_AUTHOR_NAME`/`JSONGIT_AUTHOR_EMAIL`,
    /// falling back to a fixed placeholder identity when unset.
    pub fn from_env() -> Self {
        let name = std::env::var("JSONGIT_AUTHOR_NAME").unwrap_or_else(|_| "jsongit".to_string());
        let email = std::env::var("JSONGIT_AUTHOR_EMAIL")
            .unwrap_or_else(|_| "jsongit@localhost".to_string());
        Self { name, email }
    }

    pub fn signature(&self) -> Signature {
        Signature {
            name: self.name.clone(),
            email: self.email.clone(),
            timestamp: Timestamp::now(),
        }
    }
}

// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Log record.

use jiff::Zoned;

use crate::Level;

/// A single log entry.
///
/// A record is built per accepted log call, carried to a background worker, formatted and
/// written, then dropped. It is never persisted as an object.
#[derive(Clone, Debug)]
pub struct Record {
    // the observed time
    time: Zoned,

    level: Level,

    // the payload
    message: String,
    error: Option<String>,
}

impl Record {
    /// Create a new record observed at `time`.
    pub fn new(
        level: Level,
        message: impl Into<String>,
        error: Option<String>,
        time: Zoned,
    ) -> Self {
        Self {
            time,
            level,
            message: message.into(),
            error,
        }
    }

    /// The observed time.
    pub fn time(&self) -> &Zoned {
        &self.time
    }

    /// The severity of the record.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The message body.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The rendered error attached to the record, if any and not empty.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref().filter(|err| !err.is_empty())
    }
}

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

//! Background dispatch of log records.
//!
//! Accepted records are handed to a fixed pool of worker threads, so a log call never waits on
//! file or console I/O. Each worker owns its own queue and records are assigned round-robin.
//! With a single worker (the default) records reach the file in call order; with more workers,
//! records taken by different workers may be reordered.

mod dispatcher;
mod worker;

pub(crate) use self::dispatcher::Dispatcher;

use crate::record::Record;

/// Overflow policy of the background queues.
///
/// When a bounded queue is full, an incoming record is handled according to the specified
/// policy. Unbounded queues never overflow.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub(crate) enum Overflow {
    /// Blocks the caller until the queue is not full.
    #[default]
    Block,
    /// Drops the incoming record.
    DropIncoming,
}

pub(crate) enum Task {
    Log(Box<Record>),
    Flush(oneshot::Sender<()>),
}

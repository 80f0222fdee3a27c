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

//! Traps for errors raised while writing log entries in the background.
//!
//! Log calls return before their entry is written, so a failed write cannot be reported to the
//! caller. Instead, the worker hands the error to the [`Trap`] configured on the logger. No retry
//! is attempted; the entry is lost.

use std::fmt;

use crate::Error;

mod default;

pub use self::default::DefaultTrap;

/// A trap for errors that cannot be returned to the caller.
pub trait Trap: fmt::Debug + Send + Sync + 'static {
    /// Handle an error raised by a background write or flush.
    fn trap(&self, err: &Error);
}

impl<T: Trap> From<T> for Box<dyn Trap> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

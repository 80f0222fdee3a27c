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

use jiff::Zoned;
#[cfg(test)]
use std::sync::Mutex;

#[derive(Debug)]
pub(crate) enum Clock {
    DefaultClock,
    #[cfg(test)]
    ManualClock(ManualClock),
}

impl Clock {
    pub(crate) fn now(&self) -> Zoned {
        match self {
            Clock::DefaultClock => Zoned::now(),
            #[cfg(test)]
            Clock::ManualClock(clock) => clock.now(),
        }
    }

    #[cfg(test)]
    pub(crate) fn set_now(&self, now: Zoned) {
        if let Clock::ManualClock(clock) = self {
            clock.set_now(now);
        }
    }
}

/// The time could be reset.
///
/// Shared between the logger and its callers, so the current time sits behind a lock.
#[derive(Debug)]
#[cfg(test)]
pub(crate) struct ManualClock {
    now: Mutex<Zoned>,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new(now: Zoned) -> ManualClock {
        ManualClock {
            now: Mutex::new(now),
        }
    }

    fn now(&self) -> Zoned {
        self.now
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn set_now(&self, now: Zoned) {
        *self
            .now
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = now;
    }
}

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

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering;

use arc_swap::ArcSwap;
use jiff::tz::TimeZone;

use crate::Error;
use crate::Level;

/// The directory day files are written to when none is configured.
pub const DEFAULT_DIRECTORY: &str = "log/";

/// Runtime configuration shared by a logger and its workers.
///
/// Every field may change while entries are being written. Reads never lock; a change made on
/// one thread becomes visible to others on a best-effort basis, so entries already accepted or
/// in flight may still observe the previous value.
#[derive(Debug)]
pub(crate) struct Config {
    min_level: AtomicU8,
    echo_to_console: AtomicBool,
    directory: ArcSwap<PathBuf>,
    tz: Option<TimeZone>,
}

impl Config {
    pub(crate) fn new(
        min_level: Level,
        echo_to_console: bool,
        directory: PathBuf,
        tz: Option<TimeZone>,
    ) -> Self {
        Self {
            min_level: AtomicU8::new(min_level.as_u8()),
            echo_to_console: AtomicBool::new(echo_to_console),
            directory: ArcSwap::from_pointee(directory),
            tz,
        }
    }

    pub(crate) fn min_level(&self) -> Level {
        Level::from_u8(self.min_level.load(Ordering::Relaxed))
    }

    pub(crate) fn set_min_level(&self, level: Level) {
        self.min_level.store(level.as_u8(), Ordering::Relaxed);
    }

    pub(crate) fn enabled(&self, level: Level) -> bool {
        level >= self.min_level()
    }

    pub(crate) fn echo_to_console(&self) -> bool {
        self.echo_to_console.load(Ordering::Relaxed)
    }

    pub(crate) fn set_echo_to_console(&self, echo: bool) {
        self.echo_to_console.store(echo, Ordering::Relaxed);
    }

    pub(crate) fn directory(&self) -> Arc<PathBuf> {
        self.directory.load_full()
    }

    /// Point day files at `directory`, creating it if absent.
    ///
    /// The new directory takes effect even if creating it fails; writes will try again.
    pub(crate) fn set_directory(&self, directory: impl Into<PathBuf>) -> Result<(), Error> {
        let directory = directory.into();
        self.directory.store(Arc::new(directory.clone()));
        create_directory(&directory)
    }

    pub(crate) fn tz(&self) -> Option<&TimeZone> {
        self.tz.as_ref()
    }
}

pub(crate) fn create_directory(directory: &Path) -> Result<(), Error> {
    fs::create_dir_all(directory).map_err(|err| {
        Error::new("failed to create log directory")
            .with_context("path", directory.display())
            .with_source(err)
    })
}

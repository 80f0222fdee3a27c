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

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use jiff::Zoned;

use crate::Error;
use crate::Level;
use crate::Trap;
use crate::append::Sink;
use crate::clock::Clock;
use crate::config::Config;
use crate::layout::TextLayout;
use crate::logger::builder::LoggerBuilder;
use crate::non_blocking::Dispatcher;
use crate::non_blocking::Task;
use crate::record::Record;

/// The number of lines [`Logger::latest_log`] is usually asked for.
pub const DEFAULT_LATEST_LINES: usize = 10;

/// A leveled logger writing to one file per day.
///
/// Log calls below the minimum level return without any effect. Accepted calls capture the
/// current time, hand the entry to a background worker and return at once; the entry is
/// formatted and written later. Write failures never reach the caller: they are passed to the
/// logger's [`Trap`].
///
/// `Logger` is a cheap handle: clones share the configuration, the day file locks and the
/// workers. When the last handle is dropped, the workers write every pending entry and exit.
///
/// # Examples
///
/// ```no_run
/// use daylog::Level;
/// use daylog::Logger;
///
/// let logger = Logger::builder().folder_path("log").build().unwrap();
///
/// logger.set_min_level(Level::Warn);
/// logger.info("dropped");
/// logger.warn("written");
/// logger.error_with("request failed", std::io::Error::other("connection reset"));
///
/// logger.flush().unwrap();
/// println!("{}", logger.latest_log(10).unwrap().unwrap_or_default());
/// ```
#[derive(Clone, Debug)]
pub struct Logger {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: Arc<Config>,
    clock: Clock,
    sink: Arc<Sink>,
    trap: Arc<dyn Trap>,
    dispatcher: Dispatcher,
}

impl Logger {
    pub(super) fn new(
        config: Arc<Config>,
        clock: Clock,
        sink: Arc<Sink>,
        dispatcher: Dispatcher,
        trap: Arc<dyn Trap>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                clock,
                sink,
                trap,
                dispatcher,
            }),
        }
    }

    /// Create a new [`LoggerBuilder`].
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Log `message` at `level`, with the rendered `error` on the following line(s) if present.
    ///
    /// Returns immediately. Nothing is done if `level` is below the minimum level.
    pub fn log(&self, level: Level, message: impl Into<String>, error: Option<&dyn fmt::Display>) {
        if !self.inner.config.enabled(level) {
            return;
        }

        let error = error.map(|err| err.to_string());
        let record = Record::new(level, message, error, self.now());
        if let Err(err) = self.inner.dispatcher.send(Task::Log(Box::new(record))) {
            self.inner.trap.trap(&err);
        }
    }

    /// Log a message at the debug level.
    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::Debug, message, None);
    }

    /// Log a message and an error at the debug level.
    pub fn debug_with(&self, message: impl Into<String>, error: impl fmt::Display) {
        self.log(Level::Debug, message, Some(&error));
    }

    /// Log a message at the info level.
    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message, None);
    }

    /// Log a message and an error at the info level.
    pub fn info_with(&self, message: impl Into<String>, error: impl fmt::Display) {
        self.log(Level::Info, message, Some(&error));
    }

    /// Log a message at the warn level.
    pub fn warn(&self, message: impl Into<String>) {
        self.log(Level::Warn, message, None);
    }

    /// Log a message and an error at the warn level.
    pub fn warn_with(&self, message: impl Into<String>, error: impl fmt::Display) {
        self.log(Level::Warn, message, Some(&error));
    }

    /// Log a message at the error level.
    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message, None);
    }

    /// Log a message and an error at the error level.
    pub fn error_with(&self, message: impl Into<String>, error: impl fmt::Display) {
        self.log(Level::Error, message, Some(&error));
    }

    /// Log a message at the fatal level.
    pub fn fatal(&self, message: impl Into<String>) {
        self.log(Level::Fatal, message, None);
    }

    /// Log a message and an error at the fatal level.
    pub fn fatal_with(&self, message: impl Into<String>, error: impl fmt::Display) {
        self.log(Level::Fatal, message, Some(&error));
    }

    /// Block until every entry accepted before this call has been written.
    ///
    /// # Errors
    ///
    /// Returns an error if a worker is gone. Write failures of individual entries are reported
    /// to the trap, not here.
    pub fn flush(&self) -> Result<(), Error> {
        self.inner.dispatcher.flush()
    }

    /// Read the first `line_count` lines of today's file.
    ///
    /// Lines are read from the start of the file, not from its end, and lines past the end of
    /// the file are rendered empty, so the result always holds `line_count` lines. Use
    /// [`Logger::tail_log`] for the most recent lines.
    ///
    /// Returns `Ok(None)` if nothing has been written today.
    pub fn latest_log(&self, line_count: usize) -> Result<Option<String>, Error> {
        self.inner
            .sink
            .file()
            .read_head(&self.today_file_path(), line_count)
    }

    /// Read the last `line_count` lines of today's file.
    ///
    /// Returns fewer lines if the file is shorter, and `Ok(None)` if nothing has been written
    /// today.
    pub fn tail_log(&self, line_count: usize) -> Result<Option<String>, Error> {
        self.inner
            .sink
            .file()
            .read_tail(&self.today_file_path(), line_count)
    }

    /// The path of the file entries logged now are written to.
    pub fn today_file_path(&self) -> PathBuf {
        let directory = self.inner.config.directory();
        directory.join(TextLayout::file_name(&self.now()))
    }

    /// Set the directory day files are written to, creating it if absent.
    ///
    /// Entries already accepted may still be written to the previous directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created. The new directory is used anyway,
    /// and later writes to it report their own failures to the trap.
    pub fn set_folder_path(&self, path: impl Into<PathBuf>) -> Result<(), Error> {
        self.inner.config.set_directory(path)
    }

    /// The directory day files are written to.
    pub fn folder_path(&self) -> PathBuf {
        self.inner.config.directory().as_ref().clone()
    }

    /// Set the minimum level of accepted entries.
    pub fn set_min_level(&self, level: Level) {
        self.inner.config.set_min_level(level);
    }

    /// The minimum level of accepted entries.
    pub fn min_level(&self) -> Level {
        self.inner.config.min_level()
    }

    /// Set whether accepted entries are also written to the console.
    pub fn set_echo_to_console(&self, echo: bool) {
        self.inner.config.set_echo_to_console(echo);
    }

    /// Whether accepted entries are also written to the console.
    pub fn echo_to_console(&self) -> bool {
        self.inner.config.echo_to_console()
    }

    pub(crate) fn trap(&self) -> &dyn Trap {
        self.inner.trap.as_ref()
    }

    fn now(&self) -> Zoned {
        let now = self.inner.clock.now();
        match self.inner.config.tz() {
            Some(tz) => now.with_time_zone(tz.clone()),
            None => now,
        }
    }
}

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

use std::path::PathBuf;
use std::sync::Arc;

use jiff::tz::TimeZone;

use crate::Error;
use crate::Level;
use crate::Trap;
use crate::append::Append;
use crate::append::DayFile;
use crate::append::Sink;
use crate::append::Stdout;
use crate::clock::Clock;
use crate::config::Config;
use crate::config::DEFAULT_DIRECTORY;
use crate::config::create_directory;
use crate::logger::log_impl::Logger;
use crate::non_blocking::Dispatcher;
use crate::non_blocking::Overflow;
use crate::trap::DefaultTrap;

/// Create a new [builder][LoggerBuilder] with the default configuration.
///
/// ```no_run
/// use daylog::Level;
///
/// let logger = daylog::builder()
///     .folder_path("/var/log/my_service")
///     .min_level(Level::Info)
///     .echo_to_console(true)
///     .build()
///     .unwrap();
///
/// logger.info("service started");
/// ```
pub fn builder() -> LoggerBuilder {
    LoggerBuilder::new()
}

/// A builder for configuring a [`Logger`]. See also [`builder`] for a fluent API.
///
/// The defaults are:
///
/// * day files under `log/`;
/// * every level accepted (minimum level `Debug`);
/// * no console echo;
/// * timestamps in the system time zone;
/// * one background worker fed by an unbounded queue;
/// * background failures printed to stderr by [`DefaultTrap`].
#[must_use = "call `build` to create the logger"]
#[derive(Debug)]
pub struct LoggerBuilder {
    folder_path: PathBuf,
    min_level: Level,
    echo_to_console: bool,
    tz: Option<TimeZone>,

    // non-blocking options
    thread_name: String,
    workers: usize,
    buffered_lines_limit: Option<usize>,
    overflow: Overflow,

    trap: Box<dyn Trap>,
    console: Box<dyn Append>,
    clock: Clock,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggerBuilder {
    /// Create a new [`LoggerBuilder`] with the default configuration.
    pub fn new() -> Self {
        Self {
            folder_path: PathBuf::from(DEFAULT_DIRECTORY),
            min_level: Level::Debug,
            echo_to_console: false,
            tz: None,

            thread_name: "daylog-worker".to_string(),
            workers: 1,
            buffered_lines_limit: None,
            overflow: Overflow::Block,

            trap: Box::new(DefaultTrap::default()),
            console: Box::new(Stdout::default()),
            clock: Clock::DefaultClock,
        }
    }

    /// Set the directory day files are written to.
    pub fn folder_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.folder_path = path.into();
        self
    }

    /// Set the minimum level of accepted entries.
    pub fn min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// Set whether accepted entries are also written to the console.
    pub fn echo_to_console(mut self, echo: bool) -> Self {
        self.echo_to_console = echo;
        self
    }

    /// Set the time zone of timestamps and day file names.
    ///
    /// Default to the system time zone.
    pub fn time_zone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }

    /// Set the thread name of the background workers.
    ///
    /// With more than one worker, each name is suffixed by the worker index.
    pub fn thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    /// Set the number of background workers. At least one worker is always spawned.
    ///
    /// Entries handed to different workers may reach the file out of call order.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the buffer size of pending entries per worker.
    ///
    /// Default to `None`, an unbounded queue.
    pub fn buffered_lines_limit(mut self, buffered_lines_limit: Option<usize>) -> Self {
        self.buffered_lines_limit = buffered_lines_limit;
        self
    }

    /// Set the overflow policy to block when the buffer is full.
    pub fn overflow_block(mut self) -> Self {
        self.overflow = Overflow::Block;
        self
    }

    /// Set the overflow policy to drop incoming entries when the buffer is full.
    pub fn overflow_drop_incoming(mut self) -> Self {
        self.overflow = Overflow::DropIncoming;
        self
    }

    /// Set the trap for errors raised by background writes.
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    /// Set the appender used for the console echo.
    ///
    /// Default to [`Stdout`].
    pub fn console(mut self, console: impl Into<Box<dyn Append>>) -> Self {
        self.console = console.into();
        self
    }

    #[cfg(test)]
    pub(crate) fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Build the [`Logger`] and spawn its background workers.
    ///
    /// # Errors
    ///
    /// Returns an error if the log directory cannot be created or a worker thread cannot be
    /// spawned.
    pub fn build(self) -> Result<Logger, Error> {
        let LoggerBuilder {
            folder_path,
            min_level,
            echo_to_console,
            tz,
            thread_name,
            workers,
            buffered_lines_limit,
            overflow,
            trap,
            console,
            clock,
        } = self;

        create_directory(&folder_path)?;

        let config = Arc::new(Config::new(min_level, echo_to_console, folder_path, tz));
        let trap: Arc<dyn Trap> = Arc::from(trap);
        let file = DayFile::new(config.clone());
        let sink = Arc::new(Sink::new(config.clone(), file, console));
        let dispatcher = Dispatcher::spawn(
            &thread_name,
            workers,
            buffered_lines_limit,
            overflow,
            sink.clone(),
            trap.clone(),
        )?;

        Ok(Logger::new(config, clock, sink, dispatcher, trap))
    }
}

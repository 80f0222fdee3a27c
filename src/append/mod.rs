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

//! Appenders for log records.

use std::fmt;
use std::sync::Arc;

use crate::Error;
use crate::config::Config;
use crate::record::Record;

mod day_file;
mod stdio;

pub(crate) use self::day_file::DayFile;
pub use self::stdio::Stdout;

/// A trait representing an appender that can process log records.
///
/// Implementors of this trait can handle log records in custom ways.
pub trait Append: fmt::Debug + Send + Sync + 'static {
    /// Dispatch a log record to the append target.
    fn append(&self, record: &Record) -> Result<(), Error>;

    /// Flush any buffered records.
    ///
    /// Default to a no-op.
    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }
}

impl<T: Append> From<T> for Box<dyn Append> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

/// The destination of every accepted record: the day file, and the console when echo is on.
#[derive(Debug)]
pub(crate) struct Sink {
    config: Arc<Config>,
    file: DayFile,
    console: Box<dyn Append>,
}

impl Sink {
    pub(crate) fn new(config: Arc<Config>, file: DayFile, console: Box<dyn Append>) -> Self {
        Self {
            config,
            file,
            console,
        }
    }

    pub(crate) fn file(&self) -> &DayFile {
        &self.file
    }

    /// Echo then write the record. A console failure does not prevent the file write.
    pub(crate) fn write(&self, record: &Record) -> Result<(), Error> {
        let echoed = if self.config.echo_to_console() {
            self.console.append(record)
        } else {
            Ok(())
        };
        self.file.append(record)?;
        echoed
    }

    pub(crate) fn flush(&self) -> Result<(), Error> {
        self.console.flush()?;
        self.file.flush()
    }
}

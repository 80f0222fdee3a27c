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

use log::LevelFilter;
use log::Metadata;
use log::Record;

use crate::Level;
use crate::Logger;

impl Logger {
    /// Set up the global [`log`] logger with a handle to this [`Logger`].
    ///
    /// Records of the `log` crate are mapped to the closest [`Level`]: `Trace` and `Debug` become
    /// [`Level::Debug`]. There is no `log` counterpart of [`Level::Fatal`]. The message is the
    /// formatted arguments of the record; target and location are dropped.
    ///
    /// # Errors
    ///
    /// An error is returned if the global logger has already been set.
    pub fn apply(&self) -> Result<(), log::SetLoggerError> {
        log::set_boxed_logger(Box::new(self.clone()))?;
        log::set_max_level(LevelFilter::Trace);
        Ok(())
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        Level::from(metadata.level()) >= self.min_level()
    }

    fn log(&self, record: &Record) {
        let level = Level::from(record.level());
        Logger::log(self, level, record.args().to_string(), None);
    }

    fn flush(&self) {
        if let Err(err) = Logger::flush(self) {
            self.trap().trap(&err);
        }
    }
}

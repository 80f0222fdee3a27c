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

use crate::record::Record;
#[cfg(feature = "colored")]
use crate::Level;

/// A layout that formats log records as text.
///
/// Output format:
///
/// ```text
/// [2024-08-11 22:44:57.172 Info] Hello info!
/// [2024-08-11 22:44:57.173 Error] Hello error!
/// disk full
/// ```
///
/// The head holds the local time with millisecond precision and the level name. When the record
/// carries an error, its text follows the message on a new line, verbatim.
///
/// With the `colored` feature, the level name is colored unless [`TextLayout::no_color`] is set.
/// Files are always written with a colorless layout.
#[derive(Default, Debug, Clone)]
pub struct TextLayout {
    #[cfg(feature = "colored")]
    colors: LevelColor,
    #[cfg_attr(not(feature = "colored"), allow(dead_code))]
    no_color: bool,
}

impl TextLayout {
    /// Disable colored output.
    pub fn no_color(mut self) -> Self {
        self.no_color = true;
        self
    }

    /// Customize the color of each log level.
    #[cfg(feature = "colored")]
    pub fn colors(mut self, colors: LevelColor) -> Self {
        self.colors = colors;
        self
    }

    /// Format a record into a single entry, which spans two or more lines if an error is attached.
    pub fn format(&self, record: &Record) -> String {
        let time = record.time().strftime("%Y-%m-%d %H:%M:%S.%3f");
        let level = self.level(record);
        let message = record.message();

        match record.error() {
            Some(error) => format!("[{time} {level}] {message}\n{error}"),
            None => format!("[{time} {level}] {message}"),
        }
    }

    /// The name of the day file an entry observed at `time` is written to, as `YYYYMMDD.log`.
    pub fn file_name(time: &Zoned) -> String {
        time.strftime("%Y%m%d.log").to_string()
    }

    #[cfg(not(feature = "colored"))]
    fn level(&self, record: &Record) -> &'static str {
        record.level().name()
    }

    #[cfg(feature = "colored")]
    fn level(&self, record: &Record) -> String {
        use colored::Colorize;

        let name = record.level().name();
        if self.no_color {
            return name.to_string();
        }
        name.color(self.colors.color(record.level())).to_string()
    }
}

/// Customize the color of each log level.
#[cfg(feature = "colored")]
#[derive(Debug, Clone)]
pub struct LevelColor {
    pub fatal: colored::Color,
    pub error: colored::Color,
    pub warn: colored::Color,
    pub info: colored::Color,
    pub debug: colored::Color,
}

#[cfg(feature = "colored")]
impl Default for LevelColor {
    fn default() -> Self {
        use colored::Color;

        Self {
            fatal: Color::BrightRed,
            error: Color::Red,
            warn: Color::Yellow,
            info: Color::Green,
            debug: Color::Blue,
        }
    }
}

#[cfg(feature = "colored")]
impl LevelColor {
    fn color(&self, level: Level) -> colored::Color {
        match level {
            Level::Fatal => self.fatal,
            Level::Error => self.error,
            Level::Warn => self.warn,
            Level::Info => self.info,
            Level::Debug => self.debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Level;

    fn fixed_time() -> Zoned {
        "2024-03-09T07:05:03.042+08:00[+08:00]".parse().unwrap()
    }

    #[test]
    fn test_format_head_and_message() {
        let record = Record::new(Level::Warn, "disk almost full", None, fixed_time());
        let text = TextLayout::default().no_color().format(&record);
        assert_eq!(text, "[2024-03-09 07:05:03.042 Warn] disk almost full");
    }

    #[test]
    fn test_format_with_error() {
        let record = Record::new(
            Level::Error,
            "oops",
            Some("boom".to_string()),
            fixed_time(),
        );
        let text = TextLayout::default().no_color().format(&record);
        assert_eq!(text, "[2024-03-09 07:05:03.042 Error] oops\nboom");
    }

    #[test]
    fn test_format_io_error_as_display() {
        let error = std::io::Error::other("disk full");
        let record = Record::new(Level::Error, "Hello error!", Some(error.to_string()), fixed_time());
        let text = TextLayout::default().no_color().format(&record);
        assert_eq!(text, "[2024-03-09 07:05:03.042 Error] Hello error!\ndisk full");
        assert!(!text.contains("Custom"));
    }

    #[test]
    fn test_format_ignores_empty_error() {
        let record = Record::new(Level::Info, "", Some(String::new()), fixed_time());
        let text = TextLayout::default().no_color().format(&record);
        assert_eq!(text, "[2024-03-09 07:05:03.042 Info] ");
    }

    #[test]
    fn test_format_multiline_error_verbatim() {
        let error = "first\n  second".to_string();
        let record = Record::new(Level::Fatal, "crash", Some(error), fixed_time());
        let text = TextLayout::default().no_color().format(&record);
        assert_eq!(text.lines().collect::<Vec<_>>(), [
            "[2024-03-09 07:05:03.042 Fatal] crash",
            "first",
            "  second"
        ]);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(TextLayout::file_name(&fixed_time()), "20240309.log");
    }
}

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

use std::io::Write;

use crate::Error;
use crate::append::Append;
use crate::layout::TextLayout;
use crate::record::Record;

/// An appender that prints log records to stdout.
///
/// # Examples
///
/// ```
/// use daylog::append::Stdout;
///
/// let stdout_appender = Stdout::default();
/// ```
#[derive(Default, Debug)]
pub struct Stdout {
    layout: TextLayout,
}

impl Stdout {
    /// Set the layout for the [`Stdout`] appender.
    ///
    /// Default to [`TextLayout`].
    ///
    /// # Examples
    ///
    /// ```
    /// use daylog::append::Stdout;
    /// use daylog::layout::TextLayout;
    ///
    /// let stdout_appender = Stdout::default().with_layout(TextLayout::default().no_color());
    /// ```
    pub fn with_layout(mut self, layout: TextLayout) -> Self {
        self.layout = layout;
        self
    }
}

impl Append for Stdout {
    fn append(&self, record: &Record) -> Result<(), Error> {
        let mut bytes = self.layout.format(record).into_bytes();
        bytes.push(b'\n');
        std::io::stdout()
            .write_all(&bytes)
            .map_err(Error::from_io_error)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        std::io::stdout().flush().map_err(Error::from_io_error)?;
        Ok(())
    }
}

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

use std::collections::HashMap;
use std::collections::VecDeque;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use crate::Error;
use crate::append::Append;
use crate::config::Config;
use crate::config::create_directory;
use crate::layout::TextLayout;
use crate::record::Record;

/// An appender that writes each record to the file of the day it was observed.
///
/// Writes and reads of the same file are serialized by a lock keyed by the file path, so entries
/// never interleave within a process. Different days' files do not contend.
///
/// Locks nobody holds are pruned whenever a new path is locked, so the registry only keeps the
/// locks in use plus the latest one.
#[derive(Debug)]
pub(crate) struct DayFile {
    config: Arc<Config>,
    layout: TextLayout,
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl DayFile {
    pub(crate) fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            layout: TextLayout::default().no_color(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        match locks.get(path) {
            Some(lock) => lock.clone(),
            None => {
                // the registry holds the only reference to an idle lock
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
                let lock = Arc::new(Mutex::new(()));
                locks.insert(path.to_path_buf(), lock.clone());
                lock
            }
        }
    }

    /// Append `content` and a line terminator to `directory/file_name`.
    ///
    /// The directory tree and the file are created if missing.
    pub(crate) fn write_line(
        &self,
        directory: &Path,
        file_name: &str,
        content: &str,
    ) -> Result<(), Error> {
        let path = directory.join(file_name);
        let lock = self.lock_for(&path);
        let _guard = acquire(&lock);

        let mut file = match open_append(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                create_directory(directory)?;
                open_append(&path).map_err(|err| write_error(&path, err))?
            }
            Err(err) => return Err(write_error(&path, err)),
        };

        let mut bytes = Vec::with_capacity(content.len() + 1);
        bytes.extend_from_slice(content.as_bytes());
        bytes.push(b'\n');
        file.write_all(&bytes).map_err(|err| write_error(&path, err))
    }

    /// Read the first `line_count` lines of `path`.
    ///
    /// Each line is terminated by `\n`. If the file holds fewer lines, the missing ones are
    /// rendered as empty lines, so the result always holds exactly `line_count` lines. Returns
    /// `None` if the file does not exist. Invalid UTF-8 is decoded lossily.
    pub(crate) fn read_head(&self, path: &Path, line_count: usize) -> Result<Option<String>, Error> {
        let lock = self.lock_for(path);
        let _guard = acquire(&lock);

        let Some(file) = open_read(path)? else {
            return Ok(None);
        };

        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let mut content = String::new();
        for _ in 0..line_count {
            let line = read_line(&mut reader, &mut buf).map_err(|err| read_error(path, err))?;
            if let Some(line) = line {
                content.push_str(&line);
            }
            content.push('\n');
        }
        Ok(Some(content))
    }

    /// Read the last `line_count` lines of `path`, each terminated by `\n`.
    ///
    /// Returns `None` if the file does not exist. Invalid UTF-8 is decoded lossily.
    pub(crate) fn read_tail(&self, path: &Path, line_count: usize) -> Result<Option<String>, Error> {
        let lock = self.lock_for(path);
        let _guard = acquire(&lock);

        let Some(file) = open_read(path)? else {
            return Ok(None);
        };

        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let mut window = VecDeque::new();
        loop {
            let line = read_line(&mut reader, &mut buf).map_err(|err| read_error(path, err))?;
            let Some(line) = line else {
                break;
            };
            if line_count == 0 {
                continue;
            }
            if window.len() == line_count {
                window.pop_front();
            }
            window.push_back(line);
        }

        let mut content = String::new();
        for line in window {
            content.push_str(&line);
            content.push('\n');
        }
        Ok(Some(content))
    }
}

impl Append for DayFile {
    fn append(&self, record: &Record) -> Result<(), Error> {
        let directory = self.config.directory();
        let file_name = TextLayout::file_name(record.time());
        let content = self.layout.format(record);
        self.write_line(&directory, &file_name, &content)
    }
}

/// Read one line without its terminator. Bytes that are not valid UTF-8 are replaced with
/// `U+FFFD`. Returns `None` at the end of the file.
fn read_line(reader: &mut impl BufRead, buf: &mut Vec<u8>) -> io::Result<Option<String>> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

fn acquire(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn open_read(path: &Path) -> Result<Option<File>, Error> {
    match File::open(path) {
        Ok(file) => Ok(Some(file)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(read_error(path, err)),
    }
}

fn write_error(path: &Path, err: io::Error) -> Error {
    Error::new("failed to write log file")
        .with_context("path", path.display())
        .with_source(err)
}

fn read_error(path: &Path, err: io::Error) -> Error {
    Error::new("failed to read log file")
        .with_context("path", path.display())
        .with_source(err)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::thread;

    use rand::Rng;
    use rand::distr::Alphanumeric;
    use tempfile::TempDir;

    use super::*;
    use crate::Level;

    fn day_file(directory: &Path) -> DayFile {
        let config = Config::new(Level::Debug, false, directory.to_path_buf(), None);
        DayFile::new(Arc::new(config))
    }

    fn write_lines(file: &DayFile, directory: &Path, count: usize) {
        for i in 1..=count {
            file.write_line(directory, "20240101.log", &format!("line {i}"))
                .unwrap();
        }
    }

    #[test]
    fn test_write_line_creates_directory_and_appends() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let directory = temp_dir.path().join("nested").join("log");
        let file = day_file(&directory);

        file.write_line(&directory, "20240101.log", "first").unwrap();
        file.write_line(&directory, "20240101.log", "second").unwrap();

        let content = fs::read_to_string(directory.join("20240101.log")).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn test_write_line_utf8() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let file = day_file(temp_dir.path());

        file.write_line(temp_dir.path(), "20240101.log", "日志 ✓").unwrap();

        let content = fs::read_to_string(temp_dir.path().join("20240101.log")).unwrap();
        assert_eq!(content, "日志 ✓\n");
    }

    #[test]
    fn test_write_line_reports_unwritable_directory() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let blocker = temp_dir.path().join("blocker");
        File::create(&blocker).unwrap();
        let file = day_file(&blocker);

        let err = file.write_line(&blocker, "20240101.log", "lost").unwrap_err();
        assert!(err.context("path").is_some());
    }

    #[test]
    fn test_read_head_from_start() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let file = day_file(temp_dir.path());
        write_lines(&file, temp_dir.path(), 5);

        let path = temp_dir.path().join("20240101.log");
        let head = file.read_head(&path, 3).unwrap().unwrap();
        assert_eq!(head, "line 1\nline 2\nline 3\n");
    }

    #[test]
    fn test_read_head_pads_missing_lines() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let file = day_file(temp_dir.path());
        write_lines(&file, temp_dir.path(), 2);

        let path = temp_dir.path().join("20240101.log");
        let head = file.read_head(&path, 4).unwrap().unwrap();
        assert_eq!(head, "line 1\nline 2\n\n\n");
        assert_eq!(file.read_head(&path, 0).unwrap().unwrap(), "");
    }

    #[test]
    fn test_read_tail() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let file = day_file(temp_dir.path());
        write_lines(&file, temp_dir.path(), 5);

        let path = temp_dir.path().join("20240101.log");
        assert_eq!(
            file.read_tail(&path, 2).unwrap().unwrap(),
            "line 4\nline 5\n"
        );
        assert_eq!(file.read_tail(&path, 10).unwrap().unwrap().lines().count(), 5);
        assert_eq!(file.read_tail(&path, 0).unwrap().unwrap(), "");
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let file = day_file(temp_dir.path());

        let path = temp_dir.path().join("19700101.log");
        assert!(file.read_head(&path, 10).unwrap().is_none());
        assert!(file.read_tail(&path, 10).unwrap().is_none());
    }

    #[test]
    fn test_concurrent_writes_do_not_interleave() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let file = Arc::new(day_file(temp_dir.path()));

        let payloads = (0..8)
            .map(|_| generate_random_string())
            .collect::<Vec<_>>();

        let handles = payloads
            .iter()
            .cloned()
            .map(|payload| {
                let file = file.clone();
                let directory = temp_dir.path().to_path_buf();
                thread::spawn(move || {
                    for _ in 0..50 {
                        file.write_line(&directory, "20240101.log", &payload).unwrap();
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().unwrap();
        }

        let content = fs::read_to_string(temp_dir.path().join("20240101.log")).unwrap();
        let lines = content.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 8 * 50);
        for line in lines {
            assert!(payloads.iter().any(|payload| payload == line), "{line}");
        }
    }

    #[test]
    fn test_read_tail_huge_line_count() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let file = day_file(temp_dir.path());
        write_lines(&file, temp_dir.path(), 1);

        let path = temp_dir.path().join("20240101.log");
        assert_eq!(file.read_tail(&path, usize::MAX).unwrap().unwrap(), "line 1\n");
        assert_eq!(file.read_tail(&path, 1 << 40).unwrap().unwrap(), "line 1\n");
    }

    #[test]
    fn test_read_invalid_utf8_lossily() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let file = day_file(temp_dir.path());
        let path = temp_dir.path().join("20240101.log");
        fs::write(&path, b"ok\n\xff\xfe bad\r\nthird\n").unwrap();

        let head = file.read_head(&path, 3).unwrap().unwrap();
        assert_eq!(head, "ok\n\u{FFFD}\u{FFFD} bad\nthird\n");

        let tail = file.read_tail(&path, 2).unwrap().unwrap();
        assert_eq!(tail, "\u{FFFD}\u{FFFD} bad\nthird\n");
    }

    #[test]
    fn test_read_last_line_without_terminator() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let file = day_file(temp_dir.path());
        let path = temp_dir.path().join("20240101.log");
        fs::write(&path, "first\nsecond").unwrap();

        assert_eq!(file.read_head(&path, 2).unwrap().unwrap(), "first\nsecond\n");
        assert_eq!(file.read_tail(&path, 1).unwrap().unwrap(), "second\n");
    }

    #[test]
    fn test_idle_locks_are_pruned() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let file = day_file(temp_dir.path());

        for day in 1..=9 {
            let name = format!("2024010{day}.log");
            file.write_line(temp_dir.path(), &name, "entry").unwrap();
            let missing = temp_dir.path().join(format!("2023010{day}.log"));
            assert!(file.read_head(&missing, 1).unwrap().is_none());
        }

        let locks = file.locks.lock().unwrap();
        assert_eq!(locks.len(), 1);
        assert!(locks.contains_key(&temp_dir.path().join("20230109.log")));
    }

    fn generate_random_string() -> String {
        let mut rng = rand::rng();
        let len = rng.random_range(50..=100);
        let random_string: String = std::iter::repeat(())
            .map(|()| rng.sample(Alphanumeric))
            .map(char::from)
            .take(len)
            .collect();

        random_string
    }
}

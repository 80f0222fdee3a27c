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

use daylog::Level;
use daylog::Logger;
use tempfile::TempDir;

// The global logger can be set once per process, so this file holds a single test.
#[test]
fn test_log_macros_reach_day_file() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let logger = Logger::builder()
        .folder_path(temp_dir.path())
        .min_level(Level::Info)
        .build()
        .unwrap();
    logger.apply().unwrap();

    log::trace!("hidden trace");
    log::debug!("hidden debug");
    log::info!("info {}", 42);
    log::error!("error message");
    log::logger().flush();

    assert!(!log::log_enabled!(log::Level::Debug));

    let mut paths = fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect::<Vec<_>>();
    paths.sort();
    // entries may span two day files when the run crosses midnight
    let content = paths
        .iter()
        .map(|path| fs::read_to_string(path).unwrap())
        .collect::<String>();
    let lines = content.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(" Info] info 42"));
    assert!(lines[1].ends_with(" Error] error message"));
}

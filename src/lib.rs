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

//! Daylog is a leveled logger that appends entries to one file per day.
//!
//! # Overview
//!
//! A [`Logger`] accepts entries at five levels, from [`Level::Debug`] to [`Level::Fatal`], and
//! drops those below its configured minimum level before any work is done. Accepted entries are
//! formatted as
//!
//! ```text
//! [2024-08-11 22:44:57.172 Error] request failed
//! connection reset by peer
//! ```
//!
//! and appended by a background worker to `YYYYMMDD.log` in the configured directory, optionally
//! echoed to the console. Log calls never block on I/O, and a failed write never reaches the
//! caller: it is handed to a [`Trap`].
//!
//! # Examples
//!
//! ```no_run
//! use daylog::Level;
//!
//! let logger = daylog::builder()
//!     .folder_path("log")
//!     .min_level(Level::Info)
//!     .build()
//!     .unwrap();
//!
//! logger.debug("dropped");
//! logger.info("written");
//! logger.error_with("request failed", std::io::Error::other("connection reset by peer"));
//!
//! // wait until everything above is on disk
//! logger.flush().unwrap();
//! ```
//!
//! The logger can also serve the [`log`] crate macros:
//!
//! ```no_run
//! let logger = daylog::builder().build().unwrap();
//! logger.apply().unwrap();
//!
//! log::info!("This is an info message.");
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod append;
pub mod layout;
pub mod trap;

mod bridge;
mod clock;
mod config;
mod error;
mod level;
mod logger;
mod non_blocking;
mod record;

pub use self::append::Append;
pub use self::config::DEFAULT_DIRECTORY;
pub use self::error::Error;
pub use self::level::Level;
pub use self::level::ParseLevelError;
pub use self::logger::*;
pub use self::record::Record;
pub use self::trap::DefaultTrap;
pub use self::trap::Trap;

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

use std::sync::Arc;

use crossbeam_channel::Receiver;

use crate::Error;
use crate::Trap;
use crate::append::Sink;
use crate::non_blocking::Task;

pub(crate) struct Worker {
    receiver: Receiver<Task>,
    sink: Arc<Sink>,
    trap: Arc<dyn Trap>,
}

impl Worker {
    pub(crate) fn new(receiver: Receiver<Task>, sink: Arc<Sink>, trap: Arc<dyn Trap>) -> Self {
        Self {
            receiver,
            sink,
            trap,
        }
    }

    /// Process tasks until every sender is dropped and the queue is drained.
    pub(crate) fn run(self) {
        let Self {
            receiver,
            sink,
            trap,
        } = self;

        while let Ok(task) = receiver.recv() {
            match task {
                Task::Log(record) => {
                    if let Err(err) = sink.write(&record) {
                        let err = Error::new("failed to write log record")
                            .with_context("level", record.level())
                            .with_source(err);
                        trap.trap(&err);
                    }
                }
                Task::Flush(done) => {
                    if let Err(err) = sink.flush() {
                        let err = Error::new("failed to flush").with_source(err);
                        trap.trap(&err);
                    }
                    // the flusher may have given up waiting
                    let _ = done.send(());
                }
            }
        }
    }
}

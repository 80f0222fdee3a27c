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
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;

use crossbeam_channel::Sender;
use crossbeam_channel::TrySendError;

use crate::Error;
use crate::Trap;
use crate::append::Sink;
use crate::non_blocking::Overflow;
use crate::non_blocking::Task;
use crate::non_blocking::worker::Worker;

pub(crate) struct Dispatcher {
    overflow: Overflow,
    senders: Vec<Sender<Task>>,
    handles: Vec<JoinHandle<()>>,
    next: AtomicUsize,
    trap: Arc<dyn Trap>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("overflow", &self.overflow)
            .field("workers", &self.senders.len())
            .finish()
    }
}

impl Dispatcher {
    /// Spawn `workers` threads, each draining its own queue into `sink`.
    pub(crate) fn spawn(
        thread_name: &str,
        workers: usize,
        buffered_lines_limit: Option<usize>,
        overflow: Overflow,
        sink: Arc<Sink>,
        trap: Arc<dyn Trap>,
    ) -> Result<Dispatcher, Error> {
        let workers = workers.max(1);
        let mut dispatcher = Dispatcher {
            overflow,
            senders: Vec::with_capacity(workers),
            handles: Vec::with_capacity(workers),
            next: AtomicUsize::new(0),
            trap: trap.clone(),
        };

        for i in 0..workers {
            let (sender, receiver) = match buffered_lines_limit {
                Some(limit) => crossbeam_channel::bounded(limit),
                None => crossbeam_channel::unbounded(),
            };

            let name = if workers == 1 {
                thread_name.to_string()
            } else {
                format!("{thread_name}-{i}")
            };

            let worker = Worker::new(receiver, sink.clone(), trap.clone());
            // on failure, dropping the partial dispatcher joins the workers spawned so far
            let handle = std::thread::Builder::new()
                .name(name.clone())
                .spawn(move || worker.run())
                .map_err(|err| {
                    Error::new("failed to spawn log worker thread")
                        .with_context("thread", name)
                        .with_source(err)
                })?;

            dispatcher.senders.push(sender);
            dispatcher.handles.push(handle);
        }

        Ok(dispatcher)
    }

    pub(crate) fn send(&self, task: Task) -> Result<(), Error> {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.senders.len();
        let sender = &self.senders[index];

        match self.overflow {
            Overflow::Block => sender
                .send(task)
                .map_err(|_| Error::new("failed to send log task to worker")),
            Overflow::DropIncoming => match sender.try_send(task) {
                Ok(()) => Ok(()),
                Err(TrySendError::Full(_)) => Ok(()),
                Err(TrySendError::Disconnected(_)) => {
                    Err(Error::new("failed to send log task to worker"))
                }
            },
        }
    }

    /// Wait until every worker has processed all tasks queued before this call.
    ///
    /// Flush markers always block for queue space, whatever the overflow policy.
    pub(crate) fn flush(&self) -> Result<(), Error> {
        let mut pending = Vec::with_capacity(self.senders.len());
        for sender in &self.senders {
            let (done, wait) = oneshot::channel();
            sender
                .send(Task::Flush(done))
                .map_err(|_| Error::new("failed to send flush task to worker"))?;
            pending.push(wait);
        }

        for wait in pending {
            wait.recv()
                .map_err(|err| Error::new("log worker exited before flushing").with_source(err))?;
        }
        Ok(())
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        // drop our senders, workers will break the loop after draining their queues
        self.senders.clear();

        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                self.trap.trap(&Error::new("log worker thread panicked"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Mutex;

    use jiff::Zoned;

    use super::*;
    use crate::Level;
    use crate::append::Append;
    use crate::append::DayFile;
    use crate::config::Config;
    use crate::record::Record;

    #[derive(Debug, Default)]
    struct CollectTrap(Mutex<Vec<String>>);

    impl Trap for CollectTrap {
        fn trap(&self, err: &Error) {
            self.0.lock().unwrap().push(err.to_string());
        }
    }

    #[derive(Debug)]
    struct FailingConsole;

    impl Append for FailingConsole {
        fn append(&self, _: &Record) -> Result<(), Error> {
            Err(Error::new("console closed"))
        }
    }

    fn record(message: &str) -> Task {
        Task::Log(Box::new(Record::new(
            Level::Info,
            message,
            None,
            Zoned::now(),
        )))
    }

    fn sink(directory: PathBuf, echo: bool) -> Arc<Sink> {
        let config = Arc::new(Config::new(Level::Debug, echo, directory, None));
        let file = DayFile::new(config.clone());
        Arc::new(Sink::new(config, file, Box::new(FailingConsole)))
    }

    #[test]
    fn test_worker_failures_go_to_trap() {
        let temp_dir = tempfile::TempDir::new().expect("failed to create a temporary directory");
        let trap = Arc::new(CollectTrap::default());

        let dispatcher = Dispatcher::spawn(
            "daylog-test",
            1,
            None,
            Overflow::Block,
            sink(temp_dir.path().to_path_buf(), true),
            trap.clone(),
        )
        .unwrap();

        dispatcher.send(record("echo fails")).unwrap();
        dispatcher.flush().unwrap();

        let trapped = trap.0.lock().unwrap();
        assert_eq!(trapped.len(), 1);
        assert!(trapped[0].contains("failed to write log record"));
        assert!(trapped[0].contains("console closed"));
    }

    #[test]
    fn test_drop_drains_queue() {
        let temp_dir = tempfile::TempDir::new().expect("failed to create a temporary directory");
        let trap = Arc::new(CollectTrap::default());

        let dispatcher = Dispatcher::spawn(
            "daylog-test",
            2,
            Some(4),
            Overflow::Block,
            sink(temp_dir.path().to_path_buf(), false),
            trap.clone(),
        )
        .unwrap();
        for i in 0..20 {
            dispatcher.send(record(&format!("entry {i}"))).unwrap();
        }
        drop(dispatcher);

        let lines = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| std::fs::read_to_string(entry.unwrap().path()).unwrap())
            .map(|content| content.lines().count())
            .sum::<usize>();
        assert_eq!(lines, 20);
        assert!(trap.0.lock().unwrap().is_empty());
    }
}

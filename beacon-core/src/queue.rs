//! Deferred task queue
//!
//! Bounded FIFO of verb invocations that cannot finish inside the host's
//! read-wait window. The scheduler tick runs at most one entry per call.

use beacon_protocol::Command;
use heapless::Deque;

use crate::dispatch::{DeferredFn, VerbError};

/// Default queue capacity
pub const QUEUE_CAPACITY: usize = 8;

/// A queued verb invocation
pub struct QueueEntry<C> {
    pub name: &'static str,
    pub handler: DeferredFn<C>,
    pub command: Command,
}

/// Single-consumer deferred work queue
pub struct DeferredQueue<C> {
    entries: Deque<QueueEntry<C>, QUEUE_CAPACITY>,
    busy: bool,
}

impl<C> Default for DeferredQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> DeferredQueue<C> {
    pub const fn new() -> Self {
        Self {
            entries: Deque::new(),
            busy: false,
        }
    }

    /// Append an entry. Fails with `QueueFull` when at capacity; nothing is
    /// dropped.
    pub fn enqueue(
        &mut self,
        name: &'static str,
        handler: DeferredFn<C>,
        command: Command,
    ) -> Result<(), VerbError> {
        self.entries
            .push_back(QueueEntry {
                name,
                handler,
                command,
            })
            .map_err(|_| VerbError::QueueFull)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// An entry is currently executing
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Run the oldest entry to completion. Returns `None` if the queue is
    /// empty or an entry is already running; failures are logged and
    /// returned, never retried.
    pub fn run_next(&mut self, ctx: &mut C) -> Option<Result<(), VerbError>> {
        if self.busy {
            return None;
        }
        let entry = self.entries.pop_front()?;
        self.busy = true;
        let result = (entry.handler)(ctx, &entry.command);
        self.busy = false;
        if let Err(e) = result {
            warn!("deferred '{}' failed: {}", entry.name, e);
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log {
        seen: std::vec::Vec<std::string::String>,
    }

    fn record(log: &mut Log, cmd: &Command) -> Result<(), VerbError> {
        log.seen.push(cmd.as_str().into());
        Ok(())
    }

    fn fail(_: &mut Log, _: &Command) -> Result<(), VerbError> {
        Err(VerbError::Hardware)
    }

    fn cmd(text: &str) -> Command {
        Command::parse(text).unwrap()
    }

    #[test]
    fn test_fifo_one_per_call() {
        let mut queue = DeferredQueue::new();
        let mut log = Log::default();
        queue.enqueue("a", record, cmd("play one")).unwrap();
        queue.enqueue("b", record, cmd("play two")).unwrap();
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.run_next(&mut log), Some(Ok(())));
        assert_eq!(log.seen, ["play one"]);
        assert_eq!(queue.run_next(&mut log), Some(Ok(())));
        assert_eq!(log.seen, ["play one", "play two"]);
        assert_eq!(queue.run_next(&mut log), None);
        assert!(!queue.is_busy());
    }

    #[test]
    fn test_failure_does_not_block() {
        let mut queue = DeferredQueue::new();
        let mut log = Log::default();
        queue.enqueue("bad", fail, cmd("x")).unwrap();
        queue.enqueue("good", record, cmd("help")).unwrap();

        assert_eq!(queue.run_next(&mut log), Some(Err(VerbError::Hardware)));
        assert_eq!(queue.run_next(&mut log), Some(Ok(())));
        assert_eq!(log.seen, ["help"]);
    }

    #[test]
    fn test_full_queue_rejects() {
        let mut queue: DeferredQueue<Log> = DeferredQueue::new();
        for _ in 0..QUEUE_CAPACITY {
            queue.enqueue("help", record, cmd("help")).unwrap();
        }
        assert_eq!(
            queue.enqueue("help", record, cmd("help")),
            Err(VerbError::QueueFull)
        );
        assert_eq!(queue.len(), QUEUE_CAPACITY);
    }

    #[test]
    fn test_repeated_verbs_not_deduplicated() {
        let mut queue = DeferredQueue::new();
        let mut log = Log::default();
        queue.enqueue("help", record, cmd("help")).unwrap();
        queue.enqueue("help", record, cmd("help")).unwrap();
        while queue.run_next(&mut log).is_some() {}
        assert_eq!(log.seen.len(), 2);
    }
}

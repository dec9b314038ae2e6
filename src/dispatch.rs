use crate::events::SourceEvent;
use crate::presentation::PresentationSink;
use crossbeam::channel::{Receiver, Sender, TrySendError};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("dispatcher closed")]
pub struct DispatchClosed;

/// Worker side of the hand-off. Cloned once per worker.
#[derive(Debug, Clone)]
pub struct DispatchSender {
    tx: Sender<SourceEvent>,
}

impl DispatchSender {
    /// Never blocks. Fails only once the [`Dispatcher`] is gone.
    pub fn send(&self, event: SourceEvent) -> Result<(), DispatchClosed> {
        match self.tx.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Disconnected(_)) | Err(TrySendError::Full(_)) => Err(DispatchClosed),
        }
    }
}

/// Moves events from any number of worker threads into the presentation
/// thread. A single FIFO channel carries every source, so each source's
/// events come out in the order its worker sent them.
pub struct Dispatcher {
    tx: Sender<SourceEvent>,
    rx: Receiver<SourceEvent>,
}

impl Dispatcher {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam::channel::unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> DispatchSender {
        DispatchSender {
            tx: self.tx.clone(),
        }
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Delivers the events pending at call time to `sink`, one at a time, and
    /// returns how many were delivered. Events sent while draining wait for
    /// the next call, so a busy link cannot starve the presentation loop.
    pub fn drain<S: PresentationSink + ?Sized>(&self, sink: &mut S, now: Instant) -> usize {
        let pending = self.rx.len();
        let mut delivered = 0;
        while delivered < pending {
            let Ok(SourceEvent { source, event }) = self.rx.try_recv() else {
                break;
            };
            sink.show(source, event, now);
            delivered += 1;
        }
        delivered
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{NoteEvent, SourceId};
    use crate::protocol::NoteToken;
    use std::thread;

    #[derive(Default)]
    struct Collect(Vec<SourceEvent>);

    impl PresentationSink for Collect {
        fn show(&mut self, source: SourceId, event: NoteEvent, _now: Instant) {
            self.0.push(SourceEvent { source, event });
        }
    }

    fn event(source: usize, duration_ms: u32) -> SourceEvent {
        SourceEvent {
            source: SourceId(source),
            event: NoteEvent::new(NoteToken::La, duration_ms),
        }
    }

    #[test]
    fn drains_in_send_order() {
        let dispatcher = Dispatcher::new();
        let sender = dispatcher.sender();
        for n in 1..=5 {
            sender.send(event(0, n)).unwrap();
        }
        let mut sink = Collect::default();
        assert_eq!(dispatcher.drain(&mut sink, Instant::now()), 5);
        let durations: Vec<_> = sink.0.iter().map(|e| e.event.duration_ms).collect();
        assert_eq!(durations, vec![1, 2, 3, 4, 5]);
        assert_eq!(dispatcher.drain(&mut sink, Instant::now()), 0);
    }

    #[test]
    fn per_source_order_survives_concurrent_senders() {
        const PER_SOURCE: u32 = 2_000;
        let dispatcher = Dispatcher::new();
        let mut sink = Collect::default();

        let producers: Vec<_> = (0..3)
            .map(|source| {
                let sender = dispatcher.sender();
                thread::spawn(move || {
                    for n in 1..=PER_SOURCE {
                        sender.send(event(source, n)).unwrap();
                    }
                })
            })
            .collect();

        // drain while the producers are still running
        while producers.iter().any(|p| !p.is_finished()) {
            dispatcher.drain(&mut sink, Instant::now());
        }
        for producer in producers {
            producer.join().unwrap();
        }
        dispatcher.drain(&mut sink, Instant::now());

        assert_eq!(sink.0.len(), 3 * PER_SOURCE as usize);
        for source in 0..3 {
            let durations: Vec<_> = sink
                .0
                .iter()
                .filter(|e| e.source == SourceId(source))
                .map(|e| e.event.duration_ms)
                .collect();
            assert_eq!(durations, (1..=PER_SOURCE).collect::<Vec<_>>());
        }
    }

    #[test]
    fn send_fails_after_dispatcher_drops() {
        let dispatcher = Dispatcher::new();
        let sender = dispatcher.sender();
        drop(dispatcher);
        assert_eq!(sender.send(event(0, 1)), Err(DispatchClosed));
    }
}

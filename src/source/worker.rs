use super::connection::{ConnectionStatus, SourceConnection};
use super::lines::LineSplitter;
use super::link::{Link, LinkError, LinkOpener};
use crate::config::LinkSettings;
use crate::dispatch::{DispatchClosed, DispatchSender};
use crate::events::{SourceEvent, SourceId};
use crate::protocol::{Dialect, decode_with};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const READ_CHUNK: usize = 256;

/// Everything a worker needs besides its connection.
#[derive(Clone)]
pub struct WorkerContext {
    pub opener: Arc<dyn LinkOpener>,
    pub settings: LinkSettings,
    pub dialect: Dialect,
    pub dispatch: DispatchSender,
}

/// Owner's handle on a running worker thread. Dropping it stops the worker
/// and waits for the thread to end.
pub struct WorkerHandle {
    id: SourceId,
    stop: Arc<AtomicBool>,
    status: ConnectionStatus,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(|t| t.is_finished())
    }

    /// Signals the worker and joins it. Returns within one poll interval
    /// (plus whatever the link's `open` takes, if it is still opening).
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("{}: worker thread panicked", self.id);
            }
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Starts a worker thread bound to `connection`.
pub fn spawn_worker(connection: SourceConnection, context: WorkerContext) -> WorkerHandle {
    let id = connection.id();
    let status = connection.status();
    let stop = Arc::new(AtomicBool::new(false));

    // Visible as soon as this returns, not only once the thread runs.
    connection.connecting();

    let stop_worker = stop.clone();
    let thread = std::thread::spawn(move || {
        worker_thread(connection, context, stop_worker);
    });

    WorkerHandle {
        id,
        stop,
        status,
        thread: Some(thread),
    }
}

enum Exit {
    Stopped,
    DispatcherGone,
    Failed(LinkError),
}

fn worker_thread(connection: SourceConnection, context: WorkerContext, stop: Arc<AtomicBool>) {
    let mut link = match context.opener.open(connection.port_name(), &context.settings) {
        Ok(link) => link,
        Err(e) => {
            connection.failed(e.to_string());
            return;
        }
    };

    if !settle(context.settings.settle_delay(), context.settings.poll_interval(), &stop) {
        connection.closed();
        return;
    }
    connection.connected();

    let mut worker = SourceWorker::new(
        connection.id(),
        context.dialect,
        context.settings.max_line_len,
        context.dispatch,
    );
    match worker.run(link.as_mut(), &stop) {
        Exit::Stopped => connection.closed(),
        Exit::DispatcherGone => {
            debug!("{}: dispatcher gone, stopping", connection.id());
            connection.closed();
        }
        Exit::Failed(e) => connection.failed(e.to_string()),
    }
}

/// Waits out the device's reset after the port opens. Returns false if the
/// worker was stopped meanwhile.
fn settle(delay: Duration, step: Duration, stop: &AtomicBool) -> bool {
    let deadline = Instant::now() + delay;
    loop {
        if stop.load(Ordering::Acquire) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        std::thread::sleep(step.min(deadline - now));
    }
}

/// Line assembly, decoding and forwarding for one source.
pub struct SourceWorker {
    source: SourceId,
    dialect: Dialect,
    splitter: LineSplitter,
    dispatch: DispatchSender,
    forwarded: u64,
    rejected: u64,
}

impl SourceWorker {
    pub fn new(
        source: SourceId,
        dialect: Dialect,
        max_line_len: usize,
        dispatch: DispatchSender,
    ) -> Self {
        Self {
            source,
            dialect,
            splitter: LineSplitter::new(max_line_len),
            dispatch,
            forwarded: 0,
            rejected: 0,
        }
    }

    pub fn forwarded(&self) -> u64 {
        self.forwarded
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    fn run(&mut self, link: &mut dyn Link, stop: &AtomicBool) -> Exit {
        let mut buf = [0u8; READ_CHUNK];
        while !stop.load(Ordering::Acquire) {
            let n = match link.poll(&mut buf) {
                Ok(n) => n,
                Err(e) => return Exit::Failed(e),
            };
            if n == 0 {
                continue;
            }
            if self.feed(&buf[..n]).is_err() {
                return Exit::DispatcherGone;
            }
        }
        Exit::Stopped
    }

    /// Processes a chunk of raw bytes. Bad lines are logged and skipped; only
    /// a closed dispatcher is reported.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), DispatchClosed> {
        let Self {
            source,
            dialect,
            splitter,
            dispatch,
            forwarded,
            rejected,
        } = self;

        let mut result = Ok(());
        let dropped = splitter.push(bytes, |line| {
            if result.is_err() || line.iter().all(u8::is_ascii_whitespace) {
                return;
            }
            match decode_with(line, *dialect) {
                Ok(event) => {
                    debug!("{}: received {}, {} ms", source, event.token, event.duration_ms);
                    result = dispatch.send(SourceEvent {
                        source: *source,
                        event,
                    });
                    if result.is_ok() {
                        *forwarded += 1;
                    }
                }
                Err(e) => {
                    *rejected += 1;
                    warn!("{}: invalid data: {}", source, e);
                }
            }
        });

        if dropped > 0 {
            *rejected += dropped as u64;
            warn!("{}: dropped {} over-long line(s)", source, dropped);
        }
        result
    }
}

use crate::config::LinkSettings;
use crossbeam::channel::{Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use serialport::{DataBits, Parity, StopBits};
use std::collections::{HashMap, VecDeque};
use std::io::{self, Read};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("cannot open {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("no link named {0}")]
    Unavailable(String),
    #[error("link closed")]
    Closed,
    #[error("link I/O: {0}")]
    Io(#[from] io::Error),
}

/// A byte stream that can be polled with a bounded wait.
pub trait Link: Send {
    /// Reads whatever is available into `buf`. Returns `Ok(0)` when the poll
    /// interval elapsed without data; any error ends the link.
    fn poll(&mut self, buf: &mut [u8]) -> Result<usize, LinkError>;
}

/// Opens links by port name. Called from the worker thread.
pub trait LinkOpener: Send + Sync {
    fn open(&self, port_name: &str, settings: &LinkSettings) -> Result<Box<dyn Link>, LinkError>;
}

/// Adapts a reader whose reads time out (a serial port) to [`Link`].
pub struct ReaderLink<R> {
    reader: R,
}

impl<R: Read + Send> ReaderLink<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: Read + Send> Link for ReaderLink<R> {
    fn poll(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        match self.reader.read(buf) {
            Ok(0) => Err(LinkError::Closed),
            Ok(n) => Ok(n),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(0)
            }
            Err(e) => Err(LinkError::Io(e)),
        }
    }
}

/// Serial ports at the configured baud rate, 8N1.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialOpener;

impl LinkOpener for SerialOpener {
    fn open(&self, port_name: &str, settings: &LinkSettings) -> Result<Box<dyn Link>, LinkError> {
        let port = serialport::new(port_name, settings.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(settings.poll_interval())
            .open()
            .map_err(|source| LinkError::Open {
                port: port_name.to_string(),
                source,
            })?;
        Ok(Box::new(ReaderLink::new(port)))
    }
}

/// Names of the serial ports currently present on the machine.
pub fn available_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
        Err(e) => {
            tracing::warn!("listing serial ports: {}", e);
            Vec::new()
        }
    }
}

/// In-process link fed through a channel. Dropping every sender closes it.
pub struct ChannelLink {
    rx: Receiver<Vec<u8>>,
    pending: VecDeque<u8>,
    timeout: Duration,
}

impl ChannelLink {
    pub fn pair(timeout: Duration) -> (Sender<Vec<u8>>, Self) {
        let (tx, rx) = crossbeam::channel::unbounded();
        (
            tx,
            Self {
                rx,
                pending: VecDeque::new(),
                timeout,
            },
        )
    }
}

impl Link for ChannelLink {
    fn poll(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        if self.pending.is_empty() {
            match self.rx.recv_timeout(self.timeout) {
                Ok(chunk) => self.pending.extend(chunk),
                Err(RecvTimeoutError::Timeout) => return Ok(0),
                Err(RecvTimeoutError::Disconnected) => return Err(LinkError::Closed),
            }
        }
        let n = buf.len().min(self.pending.len());
        for (dst, src) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *dst = src;
        }
        Ok(n)
    }
}

/// Hands out pre-built links by name, once each. Lets the pipeline run
/// without hardware.
#[derive(Default)]
pub struct MemoryOpener {
    links: Mutex<HashMap<String, Box<dyn Link>>>,
}

impl MemoryOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, port_name: impl Into<String>, link: impl Link + 'static) {
        self.links.lock().insert(port_name.into(), Box::new(link));
    }
}

impl LinkOpener for MemoryOpener {
    fn open(&self, port_name: &str, _settings: &LinkSettings) -> Result<Box<dyn Link>, LinkError> {
        self.links
            .lock()
            .remove(port_name)
            .ok_or_else(|| LinkError::Unavailable(port_name.to_string()))
    }
}

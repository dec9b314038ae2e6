mod connection;
mod lines;
mod link;
mod worker;

pub use connection::{ConnectionState, ConnectionStatus, SourceConnection};
pub use lines::LineSplitter;
pub use link::{
    ChannelLink, Link, LinkError, LinkOpener, MemoryOpener, ReaderLink, SerialOpener,
    available_ports,
};
pub use worker::{SourceWorker, WorkerContext, WorkerHandle, spawn_worker};

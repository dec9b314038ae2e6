pub mod audio;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod events;
pub mod presentation;
pub mod protocol;
pub mod source;
pub mod ui;

pub use config::{ConfigError, LinkSettings, SourceConfig, SpartitoConfig};
pub use dispatch::{DispatchSender, Dispatcher};
pub use engine::{Pipeline, PipelineError, SourceCommand, TurnReport};
pub use events::{NoteEvent, SourceEvent, SourceId};
pub use presentation::{PresentationSink, Presenter, Staff, TonePlayer};
pub use protocol::{DecodeError, Dialect, NoteToken, decode};
pub use ui::SpartitoApp;

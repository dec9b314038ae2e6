use crate::audio::CpalTonePlayer;
use crate::config::SpartitoConfig;
use crate::dispatch::Dispatcher;
use crate::events::SourceId;
use crate::presentation::{Presenter, Staff, TonePlayer};
use crate::source::{
    ConnectionState, ConnectionStatus, LinkOpener, SerialOpener, SourceConnection, WorkerContext,
    WorkerHandle, spawn_worker,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCommand {
    Open(SourceId),
    Close(SourceId),
    OpenAll,
    SetPort { source: SourceId, port: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("unknown {0}")]
    UnknownSource(SourceId),
}

/// What one presentation turn did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnReport {
    pub delivered: usize,
    pub hidden: usize,
}

struct SourceSlot {
    name: String,
    port: String,
    status: ConnectionStatus,
    worker: Option<WorkerHandle>,
}

/// Sources, their workers, the dispatcher and the presenter, wired together.
///
/// Lives on the presentation thread. Workers only reach it through the
/// dispatcher; [`Pipeline::turn`] is where their events land.
pub struct Pipeline {
    sources: Vec<SourceSlot>,
    context: WorkerContext,
    dispatcher: Dispatcher,
    presenter: Presenter,
}

impl Pipeline {
    pub fn new(
        config: &SpartitoConfig,
        opener: Arc<dyn LinkOpener>,
        player: Option<Box<dyn TonePlayer>>,
    ) -> Self {
        let dispatcher = Dispatcher::new();
        let context = WorkerContext {
            opener,
            settings: config.link.clone(),
            dialect: config.dialect,
            dispatch: dispatcher.sender(),
        };

        let sources: Vec<SourceSlot> = config
            .sources
            .iter()
            .map(|source| SourceSlot {
                name: source.name.clone(),
                port: source.port.clone(),
                status: ConnectionStatus::new(),
                worker: None,
            })
            .collect();

        let mut presenter = Presenter::new(sources.len());
        if let Some(player) = player {
            presenter = presenter.with_player(player);
        }

        Self {
            sources,
            context,
            dispatcher,
            presenter,
        }
    }

    /// Real serial ports, plus the default audio device when the config asks
    /// for sound. A missing audio device only disables sound.
    pub fn with_serial(config: &SpartitoConfig) -> Self {
        let player: Option<Box<dyn TonePlayer>> = if config.audio {
            match CpalTonePlayer::open() {
                Ok(player) => Some(Box::new(player) as Box<dyn TonePlayer>),
                Err(e) => {
                    warn!("audio disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };
        Self::new(config, Arc::new(SerialOpener), player)
    }

    pub fn source_ids(&self) -> impl Iterator<Item = SourceId> + use<> {
        (0..self.sources.len()).map(SourceId)
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn has_audio(&self) -> bool {
        self.presenter.has_audio()
    }

    pub fn name(&self, id: SourceId) -> Option<&str> {
        self.sources.get(id.index()).map(|s| s.name.as_str())
    }

    pub fn port(&self, id: SourceId) -> Option<&str> {
        self.sources.get(id.index()).map(|s| s.port.as_str())
    }

    pub fn state(&self, id: SourceId) -> Option<ConnectionState> {
        self.sources.get(id.index()).map(|s| s.status.get())
    }

    pub fn staff(&self, id: SourceId) -> Option<&Staff> {
        self.presenter.staff(id)
    }

    pub fn apply(&mut self, command: SourceCommand) -> Result<(), PipelineError> {
        match command {
            SourceCommand::Open(id) => self.open(id),
            SourceCommand::Close(id) => self.close(id),
            SourceCommand::OpenAll => {
                self.open_all();
                Ok(())
            }
            SourceCommand::SetPort { source, port } => self.set_port(source, port),
        }
    }

    pub fn set_port(&mut self, id: SourceId, port: impl Into<String>) -> Result<(), PipelineError> {
        let slot = self
            .sources
            .get_mut(id.index())
            .ok_or(PipelineError::UnknownSource(id))?;
        slot.port = port.into();
        Ok(())
    }

    /// (Re)connects a source to its configured port. Any worker already
    /// bound to the source is stopped first.
    pub fn open(&mut self, id: SourceId) -> Result<(), PipelineError> {
        let slot = self
            .sources
            .get_mut(id.index())
            .ok_or(PipelineError::UnknownSource(id))?;

        if let Some(previous) = slot.worker.take() {
            info!("{}: restarting", id);
            previous.stop();
        }
        self.presenter.reset(id);

        let connection = SourceConnection::with_status(id, slot.port.clone(), slot.status.clone());
        slot.worker = Some(spawn_worker(connection, self.context.clone()));
        Ok(())
    }

    /// Opens every source independently; one failing does not stop the rest.
    pub fn open_all(&mut self) {
        for id in self.source_ids() {
            if let Err(e) = self.open(id) {
                warn!("{}", e);
            }
        }
    }

    pub fn close(&mut self, id: SourceId) -> Result<(), PipelineError> {
        let slot = self
            .sources
            .get_mut(id.index())
            .ok_or(PipelineError::UnknownSource(id))?;
        if let Some(worker) = slot.worker.take() {
            worker.stop();
        }
        Ok(())
    }

    /// One iteration of the presentation loop: deliver what the workers
    /// produced, then run due hides.
    pub fn turn(&mut self, now: Instant) -> TurnReport {
        let delivered = self.dispatcher.drain(&mut self.presenter, now);
        let hidden = self.presenter.expire(now);
        TurnReport { delivered, hidden }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.presenter.next_deadline()
    }

    /// Stops every worker. Events still queued are dropped with the pipeline.
    pub fn shutdown(&mut self) {
        for slot in &mut self.sources {
            if let Some(worker) = slot.worker.take() {
                worker.stop();
            }
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}

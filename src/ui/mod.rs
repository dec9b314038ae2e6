mod staff;

use crate::engine::{Pipeline, SourceCommand};
use crate::events::SourceId;
use crate::source::{ConnectionState, available_ports};
use eframe::egui;
use staff::draw_staff;
use std::time::{Duration, Instant};
use tracing::warn;

/// Longest the window sleeps between presentation turns, so events from the
/// links never wait on user input to be shown.
const MAX_FRAME_GAP: Duration = Duration::from_millis(30);

pub struct SpartitoApp {
    pipeline: Pipeline,
    ports: Vec<String>,
}

impl SpartitoApp {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            ports: available_ports(),
        }
    }

    fn status_text(&self, id: SourceId) -> String {
        let port = self.pipeline.port(id).unwrap_or_default();
        match self.pipeline.state(id) {
            Some(ConnectionState::Connecting) => format!("Connecting to {}", port),
            Some(ConnectionState::Connected) => format!("Connected to {}", port),
            Some(state) => state.to_string(),
            None => String::new(),
        }
    }

    fn source_controls(&self, ui: &mut egui::Ui, commands: &mut Vec<SourceCommand>) {
        ui.horizontal(|ui| {
            for id in self.pipeline.source_ids() {
                let name = self.pipeline.name(id).unwrap_or_default();
                let current = self.pipeline.port(id).unwrap_or_default().to_string();

                ui.label(format!("{} - port:", name));
                let mut selected = current.clone();
                egui::ComboBox::from_id_salt(("port", id.index()))
                    .selected_text(selected.as_str())
                    .show_ui(ui, |ui| {
                        for port in &self.ports {
                            ui.selectable_value(&mut selected, port.clone(), port.as_str());
                        }
                    });
                if selected != current {
                    commands.push(SourceCommand::SetPort {
                        source: id,
                        port: selected,
                    });
                }

                if ui.button(format!("RUN {}", id.index() + 1)).clicked() {
                    commands.push(SourceCommand::Open(id));
                }
                let color = match self.pipeline.state(id) {
                    Some(ConnectionState::Error(_)) => egui::Color32::RED,
                    _ => ui.visuals().text_color(),
                };
                ui.colored_label(color, self.status_text(id));
                ui.separator();
            }

            if self.pipeline.source_count() > 1 && ui.button("RUN ALL").clicked() {
                commands.push(SourceCommand::OpenAll);
            }
        });
    }
}

impl eframe::App for SpartitoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.pipeline.turn(now);

        let mut commands = Vec::new();
        let mut refresh_ports = false;

        egui::TopBottomPanel::top("sources").show(ctx, |ui| {
            self.source_controls(ui, &mut commands);
            refresh_ports = ui.small_button("Refresh ports").clicked();
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                for id in self.pipeline.source_ids() {
                    if self.pipeline.source_count() > 1 {
                        ui.heading(self.pipeline.name(id).unwrap_or_default());
                    }
                    if let Some(staff) = self.pipeline.staff(id) {
                        draw_staff(ui, staff);
                    }
                    ui.add_space(8.0);
                }
            });
        });

        if refresh_ports {
            self.ports = available_ports();
        }
        for command in commands {
            if let Err(e) = self.pipeline.apply(command) {
                warn!("{}", e);
            }
        }

        let wait = self
            .pipeline
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
            .map_or(MAX_FRAME_GAP, |until| until.min(MAX_FRAME_GAP));
        ctx.request_repaint_after(wait);
    }
}

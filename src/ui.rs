use crate::orchestrator::{Mode, ModeForm, Orchestrator};
use crate::prompt::CharsetKind;
use eframe::egui;
use std::time::Duration;
use tokio::runtime::Handle;

const NOTICE: &str = "This tool is for educational and ethical cybersecurity research purposes only. \
Do not use it for unauthorized access or illegal activities. Always ensure you have explicit permission \
from the owner of any device you intend to test. The model's knowledge comes from its training data; \
it does not search the internet or query breach databases.";

struct CredGenApp {
    orch: Orchestrator,
    runtime: Handle,
    has_api_key: bool,
    active: Mode,
    samples: String,
    manufacturer: String,
    model: String,
    usernames: String,
    length: String,
    count: String,
    charset: CharsetKind,
}

impl CredGenApp {
    fn new(orch: Orchestrator, runtime: Handle, has_api_key: bool) -> Self {
        Self {
            orch,
            runtime,
            has_api_key,
            active: Mode::Samples,
            samples: String::new(),
            manufacturer: String::new(),
            model: String::new(),
            usernames: String::new(),
            length: String::new(),
            count: "10".to_string(),
            charset: CharsetKind::Mixed,
        }
    }

    fn current_form(&self) -> ModeForm {
        match self.active {
            Mode::Samples => ModeForm::Samples {
                samples: self.samples.clone(),
            },
            Mode::Target => ModeForm::Target {
                manufacturer: self.manufacturer.clone(),
                model: self.model.clone(),
                usernames: self.usernames.clone(),
            },
            Mode::Length => ModeForm::Length {
                length: self.length.clone(),
                count: self.count.clone(),
                charset: self.charset,
            },
        }
    }

    fn dispatch(&self, ctx: &egui::Context) {
        if let Some(call) = self.orch.prepare(self.current_form()) {
            tracing::debug!("{:?} call spawned", call.mode());
            let ctx = ctx.clone();
            self.runtime.spawn(async move {
                call.run().await;
                ctx.request_repaint();
            });
        }
    }

    fn form_fields(&mut self, ui: &mut egui::Ui) {
        match self.active {
            Mode::Samples => {
                ui.label("Sample passwords (one per line):");
                ui.add(
                    egui::TextEdit::multiline(&mut self.samples)
                        .hint_text("password123\nSummer2024!\nadmin")
                        .desired_rows(6)
                        .desired_width(f32::INFINITY),
                );
            }
            Mode::Target => {
                egui::Grid::new("target_fields").num_columns(2).show(ui, |ui| {
                    ui.label("Manufacturer:");
                    ui.add(egui::TextEdit::singleline(&mut self.manufacturer).hint_text("e.g. Hikvision"));
                    ui.end_row();
                    ui.label("Model:");
                    ui.add(egui::TextEdit::singleline(&mut self.model).hint_text("e.g. DS-2CD2042WD"));
                    ui.end_row();
                    ui.label("Common usernames:");
                    ui.add(egui::TextEdit::singleline(&mut self.usernames).hint_text("e.g. operator, service"));
                    ui.end_row();
                });
            }
            Mode::Length => {
                let policy = *self.orch.policy();
                egui::Grid::new("length_fields").num_columns(2).show(ui, |ui| {
                    ui.label("Password length:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.length)
                            .hint_text(format!("{}-{}", policy.min_length, policy.max_length)),
                    );
                    ui.end_row();
                    ui.label("Number of passwords:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.count)
                            .hint_text(format!("{}-{}", policy.min_count, policy.max_count)),
                    );
                    ui.end_row();
                });
                ui.horizontal(|ui| {
                    for kind in CharsetKind::ALL {
                        ui.radio_value(&mut self.charset, kind, kind.label());
                    }
                });
            }
        }
    }
}

impl eframe::App for CredGenApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let state = self.orch.snapshot();
        let mode_state = state.mode(self.active).clone();
        if Mode::ALL.iter().any(|m| state.mode(*m).busy) {
            // Keep the spinner moving until the in-flight call lands.
            ctx.request_repaint_after(Duration::from_millis(120));
        }

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.heading("Passwords Generator");
            ui.label("Generate candidate username and password lists for authorized testing.");
            egui::CollapsingHeader::new("Ethical & legal notice")
                .default_open(true)
                .show(ui, |ui| {
                    ui.colored_label(egui::Color32::from_rgb(0xB4, 0x83, 0x09), NOTICE);
                });
            if !self.has_api_key {
                ui.colored_label(
                    egui::Color32::from_rgb(0xDC, 0x26, 0x26),
                    "No API key configured. Set GEMINI_API_KEY or gemini_api_key in config.json.",
                );
            }
            ui.separator();
            ui.horizontal(|ui| {
                for mode in Mode::ALL {
                    let label = if state.mode(mode).busy {
                        format!("{} …", mode.title())
                    } else {
                        mode.title().to_string()
                    };
                    ui.selectable_value(&mut self.active, mode, label);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.form_fields(ui);
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let label = if mode_state.busy { "Generating…" } else { "Generate" };
                if ui
                    .add_enabled(!mode_state.busy, egui::Button::new(label))
                    .clicked()
                {
                    self.dispatch(ctx);
                }
                if mode_state.busy {
                    ui.spinner();
                }
            });

            if !state.error.is_empty() {
                ui.add_space(6.0);
                ui.colored_label(egui::Color32::from_rgb(0xDC, 0x26, 0x26), &state.error);
            }

            if !mode_state.last_result.is_empty() {
                ui.separator();
                ui.horizontal(|ui| {
                    ui.strong("Output");
                    ui.label(format!("({} lines)", mode_state.last_result.lines().count()));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Copy").clicked() {
                            ctx.output_mut(|o| o.copied_text = mode_state.last_result.clone());
                        }
                    });
                });
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        let mut view = mode_state.last_result.as_str();
                        ui.add(
                            egui::TextEdit::multiline(&mut view)
                                .font(egui::TextStyle::Monospace)
                                .desired_rows(20)
                                .desired_width(f32::INFINITY),
                        );
                    });
            }
        });
    }
}

/// Runs the window on the calling thread until it is closed.
pub fn run(orch: Orchestrator, runtime: Handle, has_api_key: bool) -> anyhow::Result<()> {
    tracing::info!("Main UI: starting event loop");
    let app = CredGenApp::new(orch, runtime, has_api_key);
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("credgen - Passwords Generator")
            .with_inner_size([860.0, 680.0]),
        ..Default::default()
    };
    eframe::run_native(
        "credgen",
        native_options,
        Box::new(|_cc| Box::new(app)),
    )
    .map_err(|e| anyhow::anyhow!("UI error: {e}"))?;
    tracing::info!("Main UI: event loop exited");
    Ok(())
}

//! Interactive Voronoi viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the simulation state and the
//! per-tick pipeline, implements [`eframe::App`], and presents the result
//! either as an uploaded texture (CPU strategies) or through a glow paint
//! callback (GPU strategy).
//!
//! The per-frame update is:
//! 1. Decode this frame's key-released events into commands.
//! 2. Run the pipeline phases (input, simulate, field, edge, composite).
//! 3. Present the frame, the seed markers, and the status bar.

use std::sync::Arc;

use eframe::App;
use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};
use egui::mutex::Mutex;
use glam::Vec2;
use tracing::info;
use voronoi_core::{
    command::Command,
    config::{Config, Strategy},
    field::{FieldEvaluator, ParallelEvaluator, ScalarEvaluator},
    palette::SEED_MARKER_COLOR,
    phases::{self, TickBuffers},
    state::SimulationState,
};

use crate::gpu::{FrameUniforms, GlowFieldRenderer, GpuError};

/// Key bindings: one command per released key.
const KEY_BINDINGS: [(egui::Key, Command); 7] = [
    (egui::Key::Space, Command::TogglePause),
    (egui::Key::S, Command::SpawnSeed),
    (egui::Key::D, Command::RemoveSeed),
    (egui::Key::E, Command::ToggleEdges),
    (egui::Key::H, Command::ToggleMarkers),
    (egui::Key::ArrowUp, Command::IncreaseThickness),
    (egui::Key::ArrowDown, Command::DecreaseThickness),
];

/// The pipeline backing this session, resolved from [`Strategy`] once at
/// startup.
enum Pipeline {
    /// CPU strategies: the core pipeline renders into [`TickBuffers`] and
    /// the frame is uploaded as an egui texture.
    Cpu {
        evaluator: Box<dyn FieldEvaluator>,
        buffers: TickBuffers,
        texture: Option<TextureHandle>,
    },
    /// GPU strategy: field and edge passes run in a glow paint callback;
    /// markers are drawn by the egui painter on top.
    Gpu(Arc<Mutex<GlowFieldRenderer>>),
}

impl Pipeline {
    fn label(&self) -> &'static str {
        match self {
            Pipeline::Cpu { evaluator, .. } => evaluator.name(),
            Pipeline::Gpu(_) => "gpu",
        }
    }
}

/// Main application state for the interactive viewer.
pub struct Viewer {
    cfg: Config,
    state: SimulationState,
    rng: rand::rngs::ThreadRng,
    pipeline: Pipeline,
    fps: f32,
}

impl Viewer {
    /// Creates the viewer: spawns the starting seeds and resolves the
    /// configured strategy into a concrete pipeline.
    ///
    /// ### Returns
    /// - `Ok(viewer)` when the pipeline is ready.
    /// - `Err` when the GPU strategy cannot be set up (missing GL context,
    ///   shader or surface failure); app creation aborts and the process
    ///   exits non-zero.
    pub fn new(cc: &eframe::CreationContext<'_>, cfg: Config) -> Result<Self, GpuError> {
        let mut rng = rand::rng();
        let state = SimulationState::new(&cfg, &mut rng);

        let pipeline = match cfg.strategy {
            Strategy::Scalar => Self::cpu_pipeline(Box::new(ScalarEvaluator), &cfg),
            Strategy::Parallel => Self::cpu_pipeline(Box::new(ParallelEvaluator), &cfg),
            Strategy::Gpu => {
                let gl = cc.gl.as_ref().ok_or(GpuError::NoContext)?;
                Pipeline::Gpu(Arc::new(Mutex::new(GlowFieldRenderer::new(gl, &cfg)?)))
            }
            Strategy::Auto => match cc.gl.as_ref() {
                Some(gl) => {
                    Pipeline::Gpu(Arc::new(Mutex::new(GlowFieldRenderer::new(gl, &cfg)?)))
                }
                None => Self::cpu_pipeline(Box::new(ParallelEvaluator), &cfg),
            },
        };

        info!(
            strategy = pipeline.label(),
            seeds = state.seeds.len(),
            "viewer initialized"
        );

        Ok(Self {
            cfg,
            state,
            rng,
            pipeline,
            fps: 0.0,
        })
    }

    /// Builds a CPU pipeline with buffers sized to the domain divided by
    /// the configured scale.
    fn cpu_pipeline(evaluator: Box<dyn FieldEvaluator>, cfg: &Config) -> Pipeline {
        let scale = cfg.cpu_field_scale.max(1);
        let width = (cfg.domain.x as u32 / scale).max(1) as usize;
        let height = (cfg.domain.y as u32 / scale).max(1) as usize;
        Pipeline::Cpu {
            evaluator,
            buffers: TickBuffers::new(width, height, cfg.domain),
            texture: None,
        }
    }

    /// Exponentially smoothed frames-per-second estimate for the HUD.
    fn track_fps(&mut self, ctx: &egui::Context) {
        let dt = ctx.input(|i| i.unstable_dt).max(1e-6);
        let instantaneous = 1.0 / dt;
        self.fps = if self.fps == 0.0 {
            instantaneous
        } else {
            0.9 * self.fps + 0.1 * instantaneous
        };
    }

    /// Draws the translucent circular seed markers with the egui painter
    /// (GPU path; the CPU compositor rasterizes its own markers).
    fn draw_seed_markers(&self, painter: &egui::Painter, rect: egui::Rect) {
        let c = SEED_MARKER_COLOR;
        let color = egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a);
        let radius = self.cfg.seed_radius * rect.width() / self.cfg.domain.x;

        for seed in self.state.seeds.iter() {
            let center = domain_to_screen(seed.position, rect, self.cfg.domain);
            painter.circle_filled(center, radius, color);
        }
    }

    /// Builds the central panel: the presented field plus seed markers.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let rect = ui.available_rect_before_wrap();

                match &self.pipeline {
                    Pipeline::Cpu {
                        texture: Some(texture),
                        ..
                    } => {
                        // The composited frame already contains markers and
                        // edges; stretch it over the panel.
                        let uv =
                            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                        ui.painter()
                            .image(texture.id(), rect, uv, egui::Color32::WHITE);
                    }
                    Pipeline::Cpu { texture: None, .. } => {}
                    Pipeline::Gpu(renderer) => {
                        let renderer = Arc::clone(renderer);
                        let uniforms = FrameUniforms::capture(&self.state);
                        ui.painter().add(egui::PaintCallback {
                            rect,
                            callback: Arc::new(egui_glow::CallbackFn::new(
                                move |_info, painter| {
                                    renderer.lock().paint(painter.gl(), &uniforms);
                                },
                            )),
                        });

                        if !self.state.params.hide_seeds {
                            self.draw_seed_markers(ui.painter(), rect);
                        }
                    }
                }
            });
    }

    /// Builds the bottom status bar (fps, strategy, seed count, toggles).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("fps = {:.0}", self.fps));
                ui.separator();
                ui.label(format!("strategy = {}", self.pipeline.label()));
                ui.separator();
                ui.label(format!("seeds = {}", self.state.seeds.len()));
                ui.label(if self.state.params.paused {
                    "paused"
                } else {
                    "running"
                });
                ui.separator();
                ui.label(format!(
                    "edges = {} (thickness {:.0})",
                    if self.state.params.hide_edges { "off" } else { "on" },
                    self.state.params.edge_thickness
                ));
                ui.label(format!(
                    "markers = {}",
                    if self.state.params.hide_seeds { "off" } else { "on" }
                ));
            });
        });
    }
}

impl App for Viewer {
    /// eframe callback driving one pipeline tick per frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let commands = collect_commands(ctx);
        self.track_fps(ctx);

        match &mut self.pipeline {
            Pipeline::Cpu {
                evaluator,
                buffers,
                texture,
            } => {
                phases::run_tick(
                    &mut self.state,
                    &self.cfg,
                    evaluator.as_ref(),
                    &commands,
                    &mut self.rng,
                    buffers,
                );

                let image = ColorImage::from_rgba_unmultiplied(
                    [buffers.frame.width(), buffers.frame.height()],
                    &buffers.frame.to_rgba8(),
                );
                match texture {
                    Some(texture) => texture.set(image, TextureOptions::NEAREST),
                    None => {
                        *texture =
                            Some(ctx.load_texture("voronoi-frame", image, TextureOptions::NEAREST));
                    }
                }
            }
            Pipeline::Gpu(_) => {
                // Field, edge, and present run in the paint callback; only
                // the state phases run here.
                phases::input_phase(&mut self.state, &self.cfg, &commands, &mut self.rng);
                phases::simulate_phase(&mut self.state, &self.cfg);
            }
        }

        self.ui_central_panel(ctx);
        self.ui_status_bar(ctx);

        // Animate continuously; pausing freezes the simulation, not the UI.
        ctx.request_repaint();
    }

    fn on_exit(&mut self, gl: Option<&eframe::glow::Context>) {
        if let (Pipeline::Gpu(renderer), Some(gl)) = (&self.pipeline, gl) {
            renderer.lock().destroy(gl);
        }
    }
}

/// Decodes this frame's key-released events into commands, in binding
/// order.
fn collect_commands(ctx: &egui::Context) -> Vec<Command> {
    ctx.input(|input| {
        KEY_BINDINGS
            .iter()
            .filter(|(key, _)| input.key_released(*key))
            .map(|&(_, cmd)| cmd)
            .collect()
    })
}

/// Maps a domain-space position into the screen-space rect the field is
/// presented in.
fn domain_to_screen(p: Vec2, rect: egui::Rect, domain: Vec2) -> egui::Pos2 {
    egui::pos2(
        rect.min.x + p.x * rect.width() / domain.x,
        rect.min.y + p.y * rect.height() / domain.y,
    )
}

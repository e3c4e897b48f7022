use control::{DriveSession, InputAggregator, KeyMap, PointerId};
use egui::{Event, Key, Pos2, Rect, TouchPhase};
use egui_plot::{Legend, Line, Plot, PlotBounds};
use log::{debug, info, warn};
use mechanics::CarModel;
use simcore::Control;

use crate::config::AppConfig;
use crate::render::{self, Scene, Viewport};
use crate::trace::Trace;

// Downsampled history interval for the plot and path trail
const TRACE_DT: f64 = 0.05;
const RESET_KEY: Key = Key::Backspace;

const BUTTONS: [(Control, &str); 5] = [
    (Control::Left, "◀ Left"),
    (Control::Right, "▶ Right"),
    (Control::Reverse, "↶ Reverse"),
    (Control::Brake, "▼ Brake"),
    (Control::Throttle, "▲ Gas"),
];

pub struct DriveApp {
    session: DriveSession<CarModel>,
    input: InputAggregator,
    trace: Trace,
    paused: bool,
    view_show_path: bool,
    window_s: f64,
    wheel_visual_angle: f64,
    // on-screen control buttons as laid out on the previous frame
    buttons: Vec<(Control, Rect)>,
}

impl DriveApp {
    pub fn new(config: AppConfig) -> Self {
        let keymap = config.keymap().unwrap_or_else(|err| {
            warn!("{err}; using default key bindings");
            KeyMap::default()
        });
        let model = CarModel::new(config.params);
        info!(
            "car ready: max speed {} u/s, arena {}x{}",
            model.params.max_speed, model.params.arena.width, model.params.arena.height
        );
        DriveApp {
            session: DriveSession::new(model, config.publish_interval()),
            input: InputAggregator::new(keymap),
            trace: Trace::new(config.history_seconds, TRACE_DT),
            paused: false,
            view_show_path: true,
            window_s: config.history_seconds,
            wheel_visual_angle: config.wheel_visual_angle,
            buttons: Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.session.reset();
        self.trace.clear();
    }

    fn set_paused(&mut self, paused: bool) {
        if paused == self.paused {
            return;
        }
        self.paused = paused;
        if paused {
            self.session.suspend();
        }
        info!("{}", if paused { "paused" } else { "resumed" });
    }

    fn button_at(&self, pos: Pos2) -> Option<Control> {
        self.buttons
            .iter()
            .find(|(_, rect)| rect.contains(pos))
            .map(|(control, _)| *control)
    }

    /// Applies this frame's raw input events to the aggregator.
    fn handle_events(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::Key {
                    key,
                    physical_key,
                    pressed,
                    repeat,
                    ..
                } => {
                    let key = physical_key.unwrap_or(*key);
                    if key == RESET_KEY {
                        if *pressed && !*repeat {
                            self.reset();
                        }
                    } else if *pressed {
                        self.input.key_down(key);
                    } else {
                        self.input.key_up(key);
                    }
                }
                Event::WindowFocused(false) => {
                    self.input.visibility_lost();
                    // a minimized or backgrounded window stops repainting
                    self.session.suspend();
                }
                Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed,
                    ..
                } => {
                    let target = self.button_at(*pos);
                    if *pressed {
                        self.input.pointer_down(PointerId::Mouse, target);
                    } else {
                        self.input.pointer_up(PointerId::Mouse, target);
                    }
                }
                Event::Touch { id, phase, pos, .. } => {
                    let pointer = PointerId::Touch(id.0);
                    let target = self.button_at(*pos);
                    match phase {
                        TouchPhase::Start => self.input.pointer_down(pointer, target),
                        TouchPhase::End => self.input.pointer_up(pointer, target),
                        TouchPhase::Cancel => {
                            debug!("touch {} cancelled", id.0);
                            self.input.pointer_cancel();
                        }
                        TouchPhase::Move => {}
                    }
                }
                _ => {}
            }
        }
    }

    /// One simulation tick at frame time `now` (seconds).
    fn advance(&mut self, now: f64) {
        if self.paused {
            return;
        }
        let frame = self.session.tick(now, &self.input.flags());
        let signed_speed = frame.state.velocity * self.session.model().params.speed_display_factor;
        self.trace
            .record(self.session.sim_time(), signed_speed, frame.state.x, frame.state.y);
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            if ui.button(if self.paused { "▶ Resume" } else { "⏸ Pause" }).clicked() {
                self.set_paused(!self.paused);
            }
            if ui.button("⟲ Reset").clicked() {
                self.reset();
            }

            ui.separator();
            ui.checkbox(&mut self.view_show_path, "Path");
            ui.label("History");
            if ui
                .add(egui::Slider::new(&mut self.window_s, 2.0..=60.0).suffix(" s"))
                .changed()
            {
                self.trace.set_window_seconds(self.window_s);
            }

            ui.separator();
            let keymap = self.input.keymap();
            let help: Vec<String> = Control::ALL
                .into_iter()
                .map(|control| {
                    let keys: Vec<&str> = keymap.keys_for(control).into_iter().map(|k| k.name()).collect();
                    format!("{} {}", control.name(), keys.join("/"))
                })
                .collect();
            ui.label(format!("Keys: {}, reset {}", help.join(", "), RESET_KEY.name()));
        });
    }

    fn control_buttons(&mut self, ui: &mut egui::Ui) {
        let flags = self.input.flags();
        self.buttons.clear();
        ui.horizontal(|ui| {
            for (control, label) in BUTTONS {
                let fill = if flags.get(control) {
                    ui.visuals().selection.bg_fill
                } else {
                    ui.visuals().widgets.inactive.weak_bg_fill
                };
                let response = ui.add(
                    egui::Button::new(egui::RichText::new(label).size(18.0))
                        .min_size(egui::vec2(96.0, 56.0))
                        .fill(fill),
                );
                self.buttons.push((control, response.rect));
            }
        });
    }

    fn telemetry_panel(&self, ui: &mut egui::Ui) {
        ui.heading("Telemetry");
        match self.session.telemetry() {
            Some(t) => {
                egui::Grid::new("telemetry_grid").num_columns(2).show(ui, |ui| {
                    ui.label("Speed");
                    ui.monospace(format!("{:6.1} km/h", t.speed));
                    ui.end_row();
                    ui.label("Heading");
                    ui.monospace(format!("{:6.1}°", t.heading_deg));
                    ui.end_row();
                    ui.label("Accel");
                    ui.monospace(format!("{:6.2} u/s²", t.acceleration));
                    ui.end_row();
                });
            }
            None => {
                ui.label("waiting for first frame");
            }
        }

        ui.separator();
        let flags = self.input.flags();
        ui.horizontal_wrapped(|ui| {
            for control in Control::ALL {
                let text = egui::RichText::new(control.name());
                ui.label(if flags.get(control) { text.strong() } else { text.weak() });
            }
        });

        ui.separator();
        let params = &self.session.model().params;
        let top = params.max_speed * params.speed_display_factor * 1.1;
        let bottom = params.max_reverse_speed * params.speed_display_factor * 1.1;
        let latest = self.trace.latest_time();
        Plot::new("speed_plot")
            .legend(Legend::default())
            .height(220.0)
            .allow_scroll(false)
            .allow_drag(false)
            .allow_zoom(false)
            .x_axis_label("Time (s)")
            .y_axis_label("km/h")
            .show(ui, |plot_ui| {
                let x_min = (latest - self.window_s).max(0.0);
                let x_max = latest.max(self.window_s * 0.1);
                plot_ui.set_plot_bounds(PlotBounds::from_min_max([x_min, bottom], [x_max, top]));
                plot_ui.line(Line::new("speed", Trace::line(&self.trace.speed, &self.trace.t)));
            });
    }

    fn draw_viewport(&self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
        let params = &self.session.model().params;
        let Some(viewport) = Viewport::fit(response.rect, &params.arena) else {
            return;
        };
        painter.rect_filled(response.rect, 4.0, ui.visuals().extreme_bg_color);
        let scene = Scene {
            state: self.session.state(),
            arena: &params.arena,
            wheel_visual_angle: self.wheel_visual_angle,
            trail: self.view_show_path.then_some(&self.trace),
        };
        render::draw_scene(&painter, &viewport, &scene);

        if self.paused {
            painter.text(
                response.rect.center(),
                egui::Align2::CENTER_CENTER,
                "PAUSED",
                egui::FontId::proportional(32.0),
                ui.visuals().strong_text_color(),
            );
        }
    }
}

impl eframe::App for DriveApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let (events, now) = ctx.input(|i| (i.events.clone(), i.time));
        self.handle_events(&events);
        self.advance(now);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));
        egui::TopBottomPanel::bottom("pedals").show(ctx, |ui| self.control_buttons(ui));
        egui::SidePanel::right("telemetry")
            .resizable(false)
            .min_width(260.0)
            .show(ctx, |ui| self.telemetry_panel(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.draw_viewport(ui));

        ctx.request_repaint();
    }
}

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use eframe::egui;
use tracing::warn;

use coursedeck::input::NavCommand;
use coursedeck::progress::AnsweredState;
use coursedeck::summary::SummaryAction;
use coursedeck::xapi::XapiVerb;
use coursedeck::{
    ConfirmationDialog, DeckParameters, EngineEvent, Extras, JumpOptions, PresentationEngine,
    SavedState,
};

use crate::cli::Cli;
use crate::demo::{DemoFactory, DemoView, ViewHandle};

const PROGRESS_BAR_HEIGHT: f32 = 26.0;
const TOAST_DURATION: f32 = 2.0;

/// Two-phase submit confirmation: the engine-side collaborator declines the
/// first jump and raises a flag; the app shows its own modal and re-issues
/// the jump with the gate bypassed.
struct DeferredDialog {
    requested: Rc<Cell<bool>>,
}

impl ConfirmationDialog for DeferredDialog {
    fn confirm_submission(&mut self) -> bool {
        self.requested.set(true);
        false
    }
}

struct Toast {
    message: String,
    start: Instant,
}

pub struct PlayerApp {
    engine: PresentationEngine,
    /// View handles per slide, assigned as ContentAttached events arrive.
    views: HashMap<usize, Vec<ViewHandle>>,
    created: Rc<RefCell<Vec<ViewHandle>>>,
    /// How many created handles have been assigned to slides so far.
    cursor: usize,
    submit_requested: Rc<Cell<bool>>,
    pending_submit: Option<usize>,
    state_path: Option<PathBuf>,
    last_width: f32,
    toast: Option<Toast>,
}

impl PlayerApp {
    fn new(
        params: DeckParameters,
        previous_state: Option<SavedState>,
        cli: &Cli,
    ) -> anyhow::Result<Self> {
        let (factory, created) = DemoFactory::new();
        let submit_requested = Rc::new(Cell::new(false));
        let extras = Extras {
            previous_state,
            is_reporting_enabled: true,
            standalone: true,
            editor_mode: cli.editor,
        };
        let engine = PresentationEngine::new(
            params,
            "deckview-demo",
            extras,
            Box::new(factory),
            Box::new(DeferredDialog {
                requested: submit_requested.clone(),
            }),
        )?;

        let mut app = Self {
            engine,
            views: HashMap::new(),
            created,
            cursor: 0,
            submit_requested,
            pending_submit: None,
            state_path: cli.state.clone(),
            last_width: 0.0,
            toast: None,
        };
        app.drain_events();

        if let Some(slide) = cli.slide {
            app.try_jump(slide.saturating_sub(1));
            app.engine.complete_transition();
        }
        Ok(app)
    }

    fn drain_events(&mut self) {
        for event in self.engine.take_events() {
            match event {
                EngineEvent::ContentAttached { slide_index } => {
                    let count = self.engine.registry().runtime(slide_index).elements.len();
                    let handles = self.created.borrow()[self.cursor..self.cursor + count].to_vec();
                    self.cursor += count;
                    self.views.insert(slide_index, handles);
                }
                EngineEvent::SlideChanged { .. } => {}
                EngineEvent::Completed(signal) => {
                    self.show_toast(format!(
                        "Finished: {} of {} points",
                        signal.score, signal.max_score
                    ));
                }
            }
        }
    }

    fn show_toast(&mut self, message: String) {
        self.toast = Some(Toast {
            message,
            start: Instant::now(),
        });
    }

    /// Jump wrapper that turns a declined submit gate into a pending modal.
    fn try_jump(&mut self, target: usize) {
        match self.engine.jump_to(target, JumpOptions::default()) {
            Ok(_) => self.check_submit_request(target),
            Err(err) => self.show_toast(format!("content error: {err}")),
        }
        self.drain_events();
    }

    fn nav_key(&mut self, command: NavCommand) {
        let target = match command {
            NavCommand::Next => self.engine.current_slide() + 1,
            NavCommand::Previous => self.engine.current_slide().saturating_sub(1),
            NavCommand::First => 0,
            NavCommand::Last => self.engine.slide_count() - 1,
        };
        match self.engine.handle_key(command, Instant::now()) {
            Ok(_) => self.check_submit_request(target),
            Err(err) => self.show_toast(format!("content error: {err}")),
        }
        self.drain_events();
    }

    fn check_submit_request(&mut self, target: usize) {
        if self.submit_requested.take() {
            self.pending_submit = Some(target);
        }
    }

    fn save_state(&mut self) {
        let Some(path) = self.state_path.clone() else {
            self.show_toast("no state file configured (--state)".to_string());
            return;
        };
        let state = self.engine.current_state();
        match serde_json::to_string_pretty(&state)
            .map_err(anyhow::Error::from)
            .and_then(|json| std::fs::write(&path, json).map_err(anyhow::Error::from))
        {
            Ok(()) => self.show_toast(format!("progress saved to {}", path.display())),
            Err(err) => {
                warn!(%err, "failed to save state");
                self.show_toast(format!("save failed: {err}"));
            }
        }
    }

    fn handle_input(&mut self, ctx: &egui::Context) {
        let mut command = None;
        let mut toggle_menu = false;
        let mut save = false;
        let mut swipe = None;

        ctx.input(|i| {
            if i.key_pressed(egui::Key::ArrowRight) || i.key_pressed(egui::Key::Space) {
                command = Some(NavCommand::Next);
            }
            if i.key_pressed(egui::Key::ArrowLeft) {
                command = Some(NavCommand::Previous);
            }
            if i.key_pressed(egui::Key::Home) {
                command = Some(NavCommand::First);
            }
            if i.key_pressed(egui::Key::End) {
                command = Some(NavCommand::Last);
            }
            if i.key_pressed(egui::Key::M) {
                toggle_menu = true;
            }
            if i.modifiers.ctrl && i.key_pressed(egui::Key::S) {
                save = true;
            }

            if i.pointer.any_pressed() {
                if let Some(pos) = i.pointer.press_origin() {
                    self.engine.swipe_tracker().begin(pos.x, pos.y);
                }
            }
            if i.pointer.any_released() {
                if let Some(pos) = i.pointer.latest_pos() {
                    swipe = self.engine.swipe_tracker().end(pos.x, pos.y);
                }
            }
        });

        if let Some(command) = command {
            self.nav_key(command);
        }
        if toggle_menu {
            if let Some(menu) = self.engine.keyword_menu() {
                if menu.is_open() {
                    self.engine.close_keyword_menu();
                } else {
                    self.engine.open_keyword_menu();
                }
            }
        }
        if save {
            self.save_state();
        }
        if let Some(direction) = swipe {
            let target = match direction {
                coursedeck::input::SwipeDirection::Left => self.engine.current_slide() + 1,
                coursedeck::input::SwipeDirection::Right => {
                    self.engine.current_slide().saturating_sub(1)
                }
            };
            match self.engine.handle_swipe(direction) {
                Ok(_) => self.check_submit_request(target),
                Err(err) => self.show_toast(format!("content error: {err}")),
            }
            self.drain_events();
        }
    }

    // --- Drawing ------------------------------------------------------

    fn draw_slide(&mut self, ui: &mut egui::Ui, index: usize, rect: egui::Rect, interactive: bool) {
        let registry = self.engine.registry();
        if registry.is_summary(index) {
            self.draw_summary(ui, rect);
            return;
        }

        let definitions = registry.slide(index).elements.clone();
        let views = self.views.get(&index).cloned().unwrap_or_default();
        let solution_mode = self.engine.is_solution_mode();
        let mut answered_now = false;

        for (definition, view) in definitions.iter().zip(&views) {
            let p = definition.placement;
            let element_rect = egui::Rect::from_min_size(
                rect.min
                    + egui::vec2(rect.width() * p.x / 100.0, rect.height() * p.y / 100.0),
                egui::vec2(rect.width() * p.width / 100.0, rect.height() * p.height / 100.0),
            );
            match &mut *view.borrow_mut() {
                DemoView::Text { body, heading } => {
                    let font = if *heading {
                        egui::FontId::proportional(48.0)
                    } else {
                        egui::FontId::proportional(22.0)
                    };
                    let galley = ui.painter().layout(
                        body.clone(),
                        font,
                        egui::Color32::from_rgb(230, 230, 230),
                        element_rect.width(),
                    );
                    ui.painter()
                        .galley(element_rect.min, galley, egui::Color32::TRANSPARENT);
                }
                DemoView::Quiz {
                    question,
                    alternatives,
                    correct,
                    chosen,
                    revealed,
                } => {
                    let mut child = ui.new_child(
                        egui::UiBuilder::new()
                            .max_rect(element_rect)
                            .layout(egui::Layout::top_down(egui::Align::Min)),
                    );
                    child.label(
                        egui::RichText::new(question.as_str())
                            .size(26.0)
                            .color(egui::Color32::WHITE),
                    );
                    child.add_space(12.0);
                    for (i, alternative) in alternatives.iter().enumerate() {
                        let mut text = egui::RichText::new(alternative).size(20.0);
                        if *revealed || solution_mode {
                            if i == *correct {
                                text = text.color(egui::Color32::from_rgb(120, 220, 120));
                            } else if *chosen == Some(i) {
                                text = text.color(egui::Color32::from_rgb(230, 120, 120));
                            }
                        }
                        let response = child.radio(*chosen == Some(i), text);
                        if interactive && !solution_mode && response.clicked() {
                            *chosen = Some(i);
                            answered_now = true;
                        }
                    }
                }
            }
        }

        if answered_now {
            self.engine.on_task_event(index, XapiVerb::Answered);
        }
    }

    fn draw_summary(&mut self, ui: &mut egui::Ui, rect: egui::Rect) {
        let mut child = ui.new_child(
            egui::UiBuilder::new()
                .max_rect(rect.shrink(60.0))
                .layout(egui::Layout::top_down(egui::Align::Min)),
        );
        child.label(
            egui::RichText::new("Summary")
                .size(40.0)
                .color(egui::Color32::WHITE),
        );
        child.add_space(16.0);

        let mut action = None;
        if let Some(summary) = self.engine.summary() {
            for record in summary.records() {
                child.label(
                    egui::RichText::new(format!(
                        "Slide {}: {} / {}",
                        record.slide_index + 1,
                        record.score,
                        record.max_score
                    ))
                    .size(20.0),
                );
            }
            let totals = summary.totals();
            child.add_space(12.0);
            child.label(
                egui::RichText::new(format!(
                    "Total: {} / {} ({}%)",
                    totals.total_score, totals.total_max_score, totals.total_percentage
                ))
                .size(24.0)
                .color(egui::Color32::WHITE),
            );
            child.add_space(20.0);
            child.horizontal(|ui| {
                if ui.button("Show solutions").clicked() {
                    action = Some(SummaryAction::ShowSolutions);
                }
                if ui.button("Retry").clicked() {
                    action = Some(SummaryAction::Retry);
                }
            });
        }
        if let Some(action) = action {
            if let Err(err) = self.engine.summary_action(action) {
                self.show_toast(format!("content error: {err}"));
            }
            self.drain_events();
        }
    }

    fn draw_progress_bar(&mut self, ui: &mut egui::Ui) {
        let rect = ui.max_rect();
        let count = self.engine.slide_count();
        let gap = 2.0;
        let segment_width = (rect.width() - gap * (count as f32 - 1.0)) / count as f32;
        let mut clicked = None;

        for index in 0..count {
            let x = rect.left() + index as f32 * (segment_width + gap);
            let segment_rect = egui::Rect::from_min_size(
                egui::pos2(x, rect.top() + 4.0),
                egui::vec2(segment_width, rect.height() - 8.0),
            );

            let segment = self.engine.progress().segment(index);
            let mut color = if self.engine.progress().is_filled(index) {
                egui::Color32::from_rgb(90, 140, 200)
            } else {
                egui::Color32::from_rgb(60, 60, 60)
            };
            color = match segment.answered {
                AnsweredState::Answered => egui::Color32::from_rgb(110, 170, 230),
                AnsweredState::AllCorrect => egui::Color32::from_rgb(110, 200, 110),
                AnsweredState::HasIncorrect => egui::Color32::from_rgb(210, 110, 110),
                _ => color,
            };
            ui.painter().rect_filled(segment_rect, 2.0, color);

            if segment.has_task_marker {
                ui.painter().circle_filled(
                    segment_rect.center_top() + egui::vec2(0.0, 3.0),
                    2.0,
                    egui::Color32::WHITE,
                );
            }
            if index == self.engine.current_slide() {
                ui.painter().rect_stroke(
                    segment_rect,
                    2.0,
                    egui::Stroke::new(1.5, egui::Color32::WHITE),
                    egui::StrokeKind::Outside,
                );
            }

            let response = ui.interact(
                segment_rect,
                ui.id().with(("segment", index)),
                egui::Sense::click(),
            );
            if response.clicked() {
                clicked = Some(index);
            }
        }

        if let Some(target) = clicked {
            self.try_jump(target);
        }
    }

    fn draw_keyword_menu(&mut self, ctx: &egui::Context) {
        let open = self
            .engine
            .keyword_menu()
            .is_some_and(|menu| menu.is_open());
        if !open {
            return;
        }

        let mut selected = None;
        egui::SidePanel::left("keyword_menu")
            .resizable(false)
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Contents");
                ui.separator();
                let Some(menu) = self.engine.keyword_menu() else {
                    return;
                };
                let current = menu.current_item();
                let rows: Vec<(String, Vec<String>)> = menu
                    .items()
                    .iter()
                    .map(|item| (item.title.clone(), item.subtitles.clone()))
                    .collect();
                for (ordinal, (title, subtitles)) in rows.iter().enumerate() {
                    let marked = current == Some(ordinal);
                    if ui.selectable_label(marked, title).clicked() {
                        selected = Some(ordinal);
                    }
                    for subtitle in subtitles {
                        ui.weak(subtitle);
                    }
                }
            });

        if let Some(ordinal) = selected {
            match self.engine.select_keyword(ordinal) {
                Ok(_) => {}
                Err(err) => self.show_toast(format!("content error: {err}")),
            }
            self.drain_events();
        }
    }

    fn draw_submit_modal(&mut self, ctx: &egui::Context) {
        let Some(target) = self.pending_submit else {
            return;
        };
        let mut decision = None;
        egui::Window::new("Submit answers?")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label("Your answers will be submitted and scored.");
                ui.horizontal(|ui| {
                    if ui.button("Submit").clicked() {
                        decision = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        decision = Some(false);
                    }
                });
            });

        match decision {
            Some(true) => {
                self.pending_submit = None;
                let options = JumpOptions {
                    skip_confirmation: true,
                };
                if let Err(err) = self.engine.jump_to(target, options) {
                    self.show_toast(format!("content error: {err}"));
                }
                self.drain_events();
            }
            Some(false) => self.pending_submit = None,
            None => {}
        }
    }

    fn draw_toast(&mut self, ui: &mut egui::Ui, rect: egui::Rect) {
        let Some(toast) = &self.toast else {
            return;
        };
        if toast.start.elapsed().as_secs_f32() > TOAST_DURATION {
            self.toast = None;
            return;
        }
        let galley = ui.painter().layout_no_wrap(
            toast.message.clone(),
            egui::FontId::proportional(16.0),
            egui::Color32::WHITE,
        );
        let pos = egui::pos2(
            rect.center().x - galley.rect.width() / 2.0,
            rect.bottom() - 60.0,
        );
        let background = egui::Rect::from_min_size(
            pos - egui::vec2(10.0, 6.0),
            galley.rect.size() + egui::vec2(20.0, 12.0),
        );
        ui.painter().rect_filled(
            background,
            6.0,
            egui::Color32::from_rgba_unmultiplied(0, 0, 0, 200),
        );
        ui.painter().galley(pos, galley, egui::Color32::TRANSPARENT);
    }
}

fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

impl eframe::App for PlayerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.engine.tick();
        self.handle_input(ctx);
        self.drain_events();
        self.draw_keyword_menu(ctx);
        self.draw_submit_modal(ctx);

        egui::TopBottomPanel::bottom("progress")
            .exact_height(PROGRESS_BAR_HEIGHT)
            .show(ctx, |ui| {
                self.draw_progress_bar(ui);
            });

        let background = egui::Color32::from_rgb(28, 30, 34);
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(background).inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                if (rect.width() - self.last_width).abs() > 0.5 {
                    self.last_width = rect.width();
                    self.engine.resize(rect.width());
                }

                let transition = self
                    .engine
                    .transition()
                    .map(|t| (t.from, t.to, t.is_forward(), ease_in_out(t.progress())));
                match transition {
                    Some((from, to, forward, progress)) => {
                        let w = rect.width();
                        let sign = if forward { -1.0 } else { 1.0 };
                        let from_offset = sign * progress * w;
                        let to_offset = from_offset - sign * w;
                        let from_rect = rect.translate(egui::vec2(from_offset, 0.0));
                        let to_rect = rect.translate(egui::vec2(to_offset, 0.0));
                        self.draw_slide(ui, from, from_rect, false);
                        self.draw_slide(ui, to, to_rect, false);
                        ctx.request_repaint();
                    }
                    None => {
                        let current = self.engine.current_slide();
                        self.draw_slide(ui, current, rect, true);
                    }
                }

                // Footer counter, bottom right.
                let counter = self.engine.slide_counter_text();
                let galley = ui.painter().layout_no_wrap(
                    counter,
                    egui::FontId::monospace(14.0),
                    egui::Color32::from_rgba_unmultiplied(180, 180, 180, 200),
                );
                let pos = egui::pos2(
                    rect.right() - galley.rect.width() - 12.0,
                    rect.bottom() - galley.rect.height() - 8.0,
                );
                ui.painter().galley(pos, galley, egui::Color32::TRANSPARENT);

                self.draw_toast(ui, rect);
            });
    }
}

pub fn run(params: DeckParameters, cli: Cli) -> anyhow::Result<()> {
    let previous_state = match &cli.state {
        Some(path) if path.exists() => {
            let json = std::fs::read_to_string(path)?;
            Some(serde_json::from_str(&json)?)
        }
        _ => None,
    };

    let app = PlayerApp::new(params, previous_state, &cli)?;

    let mut viewport = egui::ViewportBuilder::default().with_title("Deckview");
    viewport = if cli.windowed {
        viewport.with_inner_size([1280.0, 720.0])
    } else {
        viewport.with_fullscreen(true)
    };
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native("Deckview", options, Box::new(move |_cc| Ok(Box::new(app))))
        .map_err(|err| anyhow::anyhow!("failed to start viewer: {err}"))
}

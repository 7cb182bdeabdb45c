//! The presentation engine: current-slide state machine, transition
//! coordination, score aggregation and resume state.
//!
//! Public navigation methods return synchronously: an accepted jump commits
//! the new index immediately while the visual transition finishes later.
//! Overlapping requests are rejected, never queued — the in-transit marker
//! is the sole concurrency-control mechanism, and it serializes transitions
//! so the index and the rendered slide can't desynchronize.

#[cfg(test)]
mod tests;

use std::time::{Duration, Instant};

use tracing::debug;

use crate::attach::AttachmentService;
use crate::copyright::{self, CopyrightNode};
use crate::deck::DeckParameters;
use crate::element::ElementFactory;
use crate::error::Error;
use crate::input::{KeyboardAdapter, NavCommand, SwipeDirection, SwipeTracker};
use crate::keyword_menu::KeywordMenu;
use crate::progress::{AnsweredState, ProgressIndicator, TransitionPlan};
use crate::registry::SlideRegistry;
use crate::resume::SavedState;
use crate::summary::{ScoreRecord, SummaryAction, SummarySlide};
use crate::xapi::{CompletedSignal, XapiData, XapiVerb, scored_statement};

/// Duration of the slide transition animation.
pub const SLIDE_TRANSITION_DURATION: Duration = Duration::from_millis(250);

/// Host-supplied construction extras.
#[derive(Debug, Clone, Default)]
pub struct Extras {
    /// Resume snapshot from a previous session.
    pub previous_state: Option<SavedState>,

    /// Enables the submit-confirmation flow before the summary slide.
    pub is_reporting_enabled: bool,

    /// The presentation runs on its own, not embedded in a larger unit.
    pub standalone: bool,

    /// Authoring mode: placeholder menu titles, no confirmation dialogs,
    /// no summary scoring.
    pub editor_mode: bool,
}

/// Per-jump options.
#[derive(Debug, Clone, Copy, Default)]
pub struct JumpOptions {
    /// Bypass the submit-confirmation gate. Hosts with asynchronous dialog
    /// chrome cancel the first jump, show their dialog, then re-issue the
    /// jump with this set.
    pub skip_confirmation: bool,
}

/// Modal collaborator asked for consent before the first arrival at the
/// summary slide.
pub trait ConfirmationDialog {
    fn confirm_submission(&mut self) -> bool;
}

/// Default collaborator for hosts without dialog chrome.
pub struct AlwaysConfirm;

impl ConfirmationDialog for AlwaysConfirm {
    fn confirm_submission(&mut self) -> bool {
        true
    }
}

/// Fire-and-forget notifications drained by the host each frame.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A slide's elements were instantiated and mounted.
    ContentAttached { slide_index: usize },

    /// The current slide changed; `plan` staggers the progress-bar fill.
    SlideChanged {
        from: usize,
        to: usize,
        plan: TransitionPlan,
    },

    /// Final-score signal from the summary slide, at most once.
    Completed(CompletedSignal),
}

/// In-flight transition marker, committed index already updated.
pub struct ActiveTransition {
    pub from: usize,
    pub to: usize,
    started: Instant,
    duration: Duration,
}

impl ActiveTransition {
    fn new(from: usize, to: usize) -> Self {
        Self {
            from,
            to,
            started: Instant::now(),
            duration: SLIDE_TRANSITION_DURATION,
        }
    }

    pub fn progress(&self) -> f32 {
        (self.started.elapsed().as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.started.elapsed() >= self.duration
    }

    pub fn is_forward(&self) -> bool {
        self.to > self.from
    }
}

/// Cross-content correlation context: which slide a confusion report refers
/// to, one-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportContext {
    pub kind: &'static str,
    pub value: usize,
}

pub struct PresentationEngine {
    registry: SlideRegistry,
    attachment: AttachmentService,
    progress: ProgressIndicator,
    keyword_menu: Option<KeywordMenu>,
    summary: Option<SummarySlide>,
    confirmer: Box<dyn ConfirmationDialog>,

    current_slide: usize,
    transition: Option<ActiveTransition>,
    solution_mode: bool,
    jumped_to_first_solution: bool,
    summary_confirmed: bool,

    keyboard: KeyboardAdapter,
    swipe: SwipeTracker,

    reporting_enabled: bool,
    standalone: bool,
    editor_mode: bool,

    events: Vec<EngineEvent>,
}

impl PresentationEngine {
    pub fn new(
        params: DeckParameters,
        content_id: &str,
        extras: Extras,
        factory: Box<dyn ElementFactory>,
        confirmer: Box<dyn ConfirmationDialog>,
    ) -> Result<Self, Error> {
        params.validate()?;

        let mut registry = SlideRegistry::new(params.presentation.slides)?;
        // Editor mode disables summary-slide scoring entirely.
        registry.maybe_append_summary(
            !extras.editor_mode,
            params.overrides.hide_summary_slide,
            factory.as_ref(),
        );

        let task_slides: Vec<bool> = (0..registry.count())
            .map(|i| registry.slide_has_task_definition(i, factory.as_ref()))
            .collect();
        let marker_limit = if params.overrides.hide_task_markers {
            0
        } else {
            crate::progress::TASK_MARKER_MAX_SLIDES
        };
        let mut progress = ProgressIndicator::with_task_marker_limit(&task_slides, marker_limit);

        let keyword_menu = params
            .presentation
            .keyword_list_enabled
            .then(|| KeywordMenu::build(&registry, extras.editor_mode));

        let summary = registry.summary_index().map(|_| SummarySlide::new());

        let resume_slide = extras
            .previous_state
            .as_ref()
            .map(|s| s.progress.min(registry.count() - 1))
            .unwrap_or(0);

        let attachment = AttachmentService::new(
            factory,
            content_id.to_string(),
            extras.previous_state.clone(),
        );

        let mut events = Vec::new();
        // Eager attachment: the first two slides plus the resume slide, so
        // the initial view and the first transition are instant.
        for index in [0, 1, resume_slide] {
            if index < registry.count() && attachment.attach(&mut registry, index)? {
                events.push(EngineEvent::ContentAttached { slide_index: index });
            }
        }

        progress.set_current(resume_slide);
        if let Some(previous) = &extras.previous_state {
            for index in 0..registry.count() {
                if previous.was_answered(index) {
                    progress.set_answered(index, AnsweredState::Answered);
                }
            }
        }

        let mut engine = Self {
            registry,
            attachment,
            progress,
            keyword_menu,
            summary,
            confirmer,
            current_slide: resume_slide,
            transition: None,
            solution_mode: false,
            jumped_to_first_solution: false,
            summary_confirmed: false,
            keyboard: KeyboardAdapter::new(),
            swipe: SwipeTracker::new(),
            reporting_enabled: extras.is_reporting_enabled,
            standalone: extras.standalone,
            editor_mode: extras.editor_mode,
            events,
        };
        if let Some(menu) = &mut engine.keyword_menu {
            menu.set_current_slide(resume_slide);
        }
        debug!(
            slides = engine.registry.count(),
            resume_slide, "presentation engine ready"
        );
        Ok(engine)
    }

    // --- Navigation ---------------------------------------------------

    /// Jump to a slide. Returns `Ok(false)` when the request is refused:
    /// out-of-range target, a transition still in flight, or a declined
    /// submit confirmation. An `Ok(true)` means the index is committed even
    /// though the animation has not finished yet.
    pub fn jump_to(&mut self, target: usize, options: JumpOptions) -> Result<bool, Error> {
        if target >= self.registry.count() {
            return Ok(false);
        }
        if self.transition.is_some() {
            debug!(target, "jump rejected: transition in flight");
            return Ok(false);
        }
        if !options.skip_confirmation && self.needs_submit_confirmation(target) {
            if !self.confirmer.confirm_submission() {
                debug!(target, "jump aborted: submission declined");
                return Ok(false);
            }
            self.summary_confirmed = true;
        }

        let from = self.current_slide;

        // Leaving a slide snapshots whether it was answered.
        self.update_answered_marker(from);

        self.current_slide = target;
        self.attach_with_event(target)?;
        if target + 1 < self.registry.count() {
            self.attach_with_event(target + 1)?;
        }

        let plan = self.progress.set_current(target);
        if let Some(menu) = &mut self.keyword_menu {
            menu.set_current_slide(target);
        }

        if let Some(summary_index) = self.registry.summary_index() {
            if target >= summary_index {
                self.refresh_summary()?;
                if target == summary_index && !self.editor_mode {
                    let solution_mode = self.solution_mode;
                    if let Some(signal) = self
                        .summary
                        .as_mut()
                        .and_then(|s| s.on_rendered(solution_mode))
                    {
                        self.events.push(EngineEvent::Completed(signal));
                    }
                }
            }
        }

        if from != target {
            self.transition = Some(ActiveTransition::new(from, target));
        }
        self.relayout_slide(target);
        self.events.push(EngineEvent::SlideChanged { from, to: target, plan });
        debug!(from, to = target, "slide committed");
        Ok(true)
    }

    /// Advance one slide; refuses at the last slide.
    pub fn next_slide(&mut self) -> Result<bool, Error> {
        if self.current_slide + 1 >= self.registry.count() {
            return Ok(false);
        }
        self.jump_to(self.current_slide + 1, JumpOptions::default())
    }

    /// Go back one slide; refuses at slide zero.
    pub fn previous_slide(&mut self) -> Result<bool, Error> {
        if self.current_slide == 0 {
            return Ok(false);
        }
        self.jump_to(self.current_slide - 1, JumpOptions::default())
    }

    /// Advance the transition clock; call once per frame.
    pub fn tick(&mut self) {
        if self.transition.as_ref().is_some_and(|t| t.is_complete()) {
            self.complete_transition();
        }
    }

    /// Finish the in-flight transition immediately. Lets hosts and tests
    /// sequence animation phases deterministically.
    pub fn complete_transition(&mut self) {
        self.transition = None;
    }

    fn needs_submit_confirmation(&self, target: usize) -> bool {
        self.registry.is_summary(target)
            && self.reporting_enabled
            && self.standalone
            && !self.editor_mode
            && !self.summary_confirmed
    }

    fn attach_with_event(&mut self, index: usize) -> Result<(), Error> {
        if self.attachment.attach(&mut self.registry, index)? {
            self.events
                .push(EngineEvent::ContentAttached { slide_index: index });
        }
        Ok(())
    }

    /// Generic resize pass over a slide's mounted elements.
    fn relayout_slide(&mut self, index: usize) {
        for entry in &mut self.registry.runtime_mut(index).elements {
            entry.instance.resize();
        }
    }

    // --- Answer tracking ----------------------------------------------

    /// Recompute one slide's answered marker from its live task instances.
    /// Correctness states are only produced in solution mode.
    fn update_answered_marker(&mut self, index: usize) {
        let runtime = self.registry.runtime(index);
        if !runtime.attached || runtime.tasks.is_empty() {
            return;
        }
        let state = if self.solution_mode {
            let mut max_total = 0;
            let mut all_correct = true;
            for &ordinal in &runtime.tasks {
                if let Some(scoreable) = runtime.elements[ordinal].instance.as_scoreable() {
                    max_total += scoreable.max_score();
                    if scoreable.score() < scoreable.max_score() {
                        all_correct = false;
                    }
                }
            }
            if max_total == 0 {
                // Nothing scoreable: fall back to the answered flag.
                if runtime.answered() {
                    AnsweredState::Answered
                } else {
                    AnsweredState::NotAnswered
                }
            } else if all_correct {
                AnsweredState::AllCorrect
            } else {
                AnsweredState::HasIncorrect
            }
        } else if runtime.answered() {
            AnsweredState::Answered
        } else {
            AnsweredState::NotAnswered
        };
        self.progress.set_answered(index, state);
    }

    /// Feed an xAPI-style verb signal from one of a slide's task instances.
    /// `attempted`/`interacted`/`answered` recompute that slide's answered
    /// marker; other verbs are ignored here.
    pub fn on_task_event(&mut self, slide_index: usize, verb: XapiVerb) {
        if slide_index < self.registry.count() && verb.marks_activity() {
            self.update_answered_marker(slide_index);
        }
    }

    // --- Solution mode and reset --------------------------------------

    /// Reveal solutions on every task across the deck and aggregate scores.
    /// Returns `Ok(None)` when no slide has any task to score — distinct
    /// from a score of zero. The first invocation jumps to the first
    /// task-bearing slide; later invocations stay put.
    pub fn show_solutions(&mut self) -> Result<Option<Vec<ScoreRecord>>, Error> {
        let task_slides: Vec<usize> = (0..self.registry.count())
            .filter(|&i| {
                self.registry
                    .slide_has_task_definition(i, self.attachment.factory())
                    || !self.registry.runtime(i).tasks.is_empty()
            })
            .collect();
        if task_slides.is_empty() {
            return Ok(None);
        }

        self.solution_mode = true;
        for &index in &task_slides {
            self.attach_with_event(index)?;
        }

        if !self.jumped_to_first_solution {
            self.jumped_to_first_solution = true;
            self.jump_to(task_slides[0], JumpOptions { skip_confirmation: true })?;
        }

        let mut records = Vec::with_capacity(task_slides.len());
        for &index in &task_slides {
            let runtime = self.registry.runtime_mut(index);
            let task_ordinals = runtime.tasks.clone();
            let mut score = 0;
            let mut max_score = 0;
            for &ordinal in &task_ordinals {
                let entry = &mut runtime.elements[ordinal];
                if let Some(solvable) = entry.instance.as_solvable() {
                    solvable.show_solutions();
                }
                if let Some(scoreable) = entry.instance.as_scoreable() {
                    score += scoreable.score();
                    max_score += scoreable.max_score();
                }
            }
            records.push(ScoreRecord {
                slide_index: index,
                score,
                max_score,
                task_ordinals,
            });
            self.update_answered_marker(index);
        }
        debug!(slides = records.len(), "solutions revealed");
        Ok(Some(records))
    }

    /// Exit solution mode, reset every resettable task, clear the progress
    /// bar and return to the first slide. Open overlays are dismissed.
    pub fn reset_tasks(&mut self) -> Result<(), Error> {
        self.solution_mode = false;
        self.jumped_to_first_solution = false;
        // A fresh attempt gets a fresh submit gate.
        self.summary_confirmed = false;
        self.transition = None;

        for runtime in self.registry.runtimes_mut() {
            for entry in &mut runtime.elements {
                if let Some(resettable) = entry.instance.as_resettable() {
                    resettable.reset_task();
                }
            }
        }

        self.progress.reset();
        if let Some(menu) = &mut self.keyword_menu {
            menu.close();
            menu.set_current_slide(0);
        }

        let from = self.current_slide;
        self.current_slide = 0;
        self.attach_with_event(0)?;
        if self.registry.count() > 1 {
            self.attach_with_event(1)?;
        }
        self.events.push(EngineEvent::SlideChanged {
            from,
            to: 0,
            plan: TransitionPlan::default(),
        });
        debug!("tasks reset");
        Ok(())
    }

    /// Handle a summary-slide affordance.
    pub fn summary_action(&mut self, action: SummaryAction) -> Result<(), Error> {
        match action {
            SummaryAction::ShowSolutions => {
                self.show_solutions()?;
            }
            SummaryAction::Retry => self.reset_tasks()?,
        }
        Ok(())
    }

    /// Recompute the summary slide's score rows without navigating.
    fn refresh_summary(&mut self) -> Result<(), Error> {
        if self.summary.is_none() {
            return Ok(());
        }
        let task_slides: Vec<usize> = (0..self.registry.count())
            .filter(|&i| {
                self.registry
                    .slide_has_task_definition(i, self.attachment.factory())
            })
            .collect();
        for &index in &task_slides {
            self.attach_with_event(index)?;
        }
        let mut records = Vec::new();
        for &index in &task_slides {
            let runtime = self.registry.runtime(index);
            let mut score = 0;
            let mut max_score = 0;
            for &ordinal in &runtime.tasks {
                if let Some(scoreable) = runtime.elements[ordinal].instance.as_scoreable() {
                    score += scoreable.score();
                    max_score += scoreable.max_score();
                }
            }
            records.push(ScoreRecord {
                slide_index: index,
                score,
                max_score,
                task_ordinals: runtime.tasks.clone(),
            });
        }
        if let Some(summary) = &mut self.summary {
            summary.rebuild(records);
        }
        Ok(())
    }

    // --- Scores and reporting -----------------------------------------

    /// Sum of `score` over every instance with score capability. Missing
    /// capability contributes zero.
    pub fn score(&self) -> i32 {
        self.sum_scores(|s| s.score())
    }

    /// Sum of `max_score` over every instance with score capability.
    pub fn max_score(&self) -> i32 {
        self.sum_scores(|s| s.max_score())
    }

    fn sum_scores(&self, f: impl Fn(&dyn crate::element::Scoreable) -> i32) -> i32 {
        (0..self.registry.count())
            .map(|i| {
                self.registry
                    .runtime(i)
                    .elements
                    .iter()
                    .filter_map(|e| e.instance.as_scoreable())
                    .map(|s| f(s))
                    .sum::<i32>()
            })
            .sum()
    }

    /// Statement-shaped reporting record: the deck statement plus the
    /// flattened per-task sub-records.
    pub fn xapi_data(&self) -> XapiData {
        let mut data = XapiData::new(scored_statement(
            XapiVerb::Answered,
            self.score(),
            self.max_score(),
        ));
        for index in 0..self.registry.count() {
            let runtime = self.registry.runtime(index);
            for &ordinal in &runtime.tasks {
                if let Some(child) = runtime.elements[ordinal].instance.xapi_data() {
                    data.children.push(child);
                }
            }
        }
        data
    }

    /// Cross-content correlation context, one-indexed.
    pub fn context(&self) -> ReportContext {
        ReportContext {
            kind: "slide",
            value: self.current_slide + 1,
        }
    }

    /// Hierarchical media-attribution tree: one node per slide, one child
    /// per attributable element.
    pub fn copyrights(&self) -> CopyrightNode {
        let mut root = CopyrightNode {
            label: "Presentation".to_string(),
            ..Default::default()
        };
        for index in 0..self.registry.count() {
            if self.registry.is_summary(index) {
                continue;
            }
            let mut slide_node = CopyrightNode {
                label: format!("Slide {}", index + 1),
                ..Default::default()
            };
            let runtime = self.registry.runtime(index);
            let slide = self.registry.slide(index);
            for (ordinal, definition) in slide.elements.iter().enumerate() {
                let (label, media) = match runtime.elements.get(ordinal) {
                    Some(entry) => {
                        let label = entry
                            .instance
                            .title()
                            .unwrap_or_else(|| entry.instance.type_name().to_string());
                        let media = entry
                            .instance
                            .as_copyrightable()
                            .map(|c| c.copyrights())
                            .or_else(|| copyright::extract_from_params(&definition.action.params));
                        (label, media)
                    }
                    // Not attached yet: fall back to the generic extractor.
                    None => (
                        definition.action.library.clone(),
                        copyright::extract_from_params(&definition.action.params),
                    ),
                };
                if let Some(media) = media {
                    slide_node.children.push(CopyrightNode {
                        label,
                        media: Some(media),
                        children: Vec::new(),
                    });
                }
            }
            root.children.push(slide_node);
        }
        root
    }

    // --- Resume -------------------------------------------------------

    /// Serialize the resume snapshot. Slides never attached this session
    /// carry their previous fragments forward unchanged, so a save/restore
    /// cycle is lossless regardless of how far the user navigated.
    pub fn current_state(&self) -> SavedState {
        let previous = self.attachment.resume_state();
        let mut answered = Vec::with_capacity(self.registry.count());
        let mut answers = Vec::with_capacity(self.registry.count());

        for index in 0..self.registry.count() {
            let runtime = self.registry.runtime(index);
            if runtime.attached {
                answered.push(runtime.answered());
                answers.push(
                    runtime
                        .elements
                        .iter()
                        .map(|e| e.instance.as_resumable().map(|r| r.current_state()))
                        .collect(),
                );
            } else {
                answered.push(previous.map(|p| p.was_answered(index)).unwrap_or(false));
                let row = previous
                    .and_then(|p| p.answers.get(index).cloned())
                    .unwrap_or_else(|| vec![None; self.registry.slide(index).elements.len()]);
                answers.push(row);
            }
        }

        SavedState {
            progress: self.current_slide,
            answered,
            answers,
        }
    }

    // --- Input adapters -----------------------------------------------

    /// Debounced keyboard entry point.
    pub fn handle_key(&mut self, command: NavCommand, now: Instant) -> Result<bool, Error> {
        if !self.keyboard.accept(now) {
            return Ok(false);
        }
        self.handle_nav(command)
    }

    pub fn handle_nav(&mut self, command: NavCommand) -> Result<bool, Error> {
        match command {
            NavCommand::Next => self.next_slide(),
            NavCommand::Previous => self.previous_slide(),
            NavCommand::First => self.jump_to(0, JumpOptions::default()),
            NavCommand::Last => {
                self.jump_to(self.registry.count() - 1, JumpOptions::default())
            }
        }
    }

    pub fn handle_swipe(&mut self, direction: SwipeDirection) -> Result<bool, Error> {
        match direction {
            SwipeDirection::Left => self.next_slide(),
            SwipeDirection::Right => self.previous_slide(),
        }
    }

    /// Surface resize: rederive the swipe threshold and let the current
    /// slide's elements re-layout.
    pub fn resize(&mut self, width: f32) {
        self.swipe.set_render_width(width);
        self.relayout_slide(self.current_slide);
    }

    pub fn swipe_tracker(&mut self) -> &mut SwipeTracker {
        &mut self.swipe
    }

    // --- Keyword menu and progress-bar interaction --------------------

    pub fn open_keyword_menu(&mut self) {
        if let Some(menu) = &mut self.keyword_menu {
            menu.open();
        }
    }

    pub fn close_keyword_menu(&mut self) {
        if let Some(menu) = &mut self.keyword_menu {
            menu.close();
        }
    }

    /// Resolve a keyword-menu row selection into a jump.
    pub fn select_keyword(&mut self, item_ordinal: usize) -> Result<bool, Error> {
        let Some(target) = self
            .keyword_menu
            .as_mut()
            .and_then(|m| m.select(item_ordinal))
        else {
            return Ok(false);
        };
        self.jump_to(target, JumpOptions::default())
    }

    pub fn focus_next_segment(&mut self) -> bool {
        self.progress.focus_next()
    }

    pub fn focus_prev_segment(&mut self) -> bool {
        self.progress.focus_prev()
    }

    /// Jump to the segment holding keyboard focus.
    pub fn activate_focused_segment(&mut self) -> Result<bool, Error> {
        self.jump_to(self.progress.focused(), JumpOptions::default())
    }

    // --- Accessors ----------------------------------------------------

    pub fn current_slide(&self) -> usize {
        self.current_slide
    }

    pub fn slide_count(&self) -> usize {
        self.registry.count()
    }

    /// Footer text, e.g. "3 / 12".
    pub fn slide_counter_text(&self) -> String {
        format!("{} / {}", self.current_slide + 1, self.registry.count())
    }

    pub fn is_solution_mode(&self) -> bool {
        self.solution_mode
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn transition(&self) -> Option<&ActiveTransition> {
        self.transition.as_ref()
    }

    pub fn registry(&self) -> &SlideRegistry {
        &self.registry
    }

    pub fn progress(&self) -> &ProgressIndicator {
        &self.progress
    }

    pub fn keyword_menu(&self) -> Option<&KeywordMenu> {
        self.keyword_menu.as_ref()
    }

    pub fn keyword_menu_mut(&mut self) -> Option<&mut KeywordMenu> {
        self.keyword_menu.as_mut()
    }

    pub fn summary(&self) -> Option<&SummarySlide> {
        self.summary.as_ref()
    }

    /// Drain pending notifications.
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }
}

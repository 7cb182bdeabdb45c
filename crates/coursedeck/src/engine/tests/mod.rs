mod scoring;

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Value, json};

use crate::copyright::CopyrightInfo;
use crate::deck::{
    ContentDescriptor, DeckParameters, ElementDefinition, KeywordEntry, OverrideParams, Placement,
    PresentationParams, SlideDefinition,
};
use crate::element::{
    AnswerableTask, ContentElement, Copyrightable, ElementFactory, Resettable, Resumable,
    Scoreable, Solvable,
};
use crate::engine::{ConfirmationDialog, Extras, PresentationEngine};
use crate::xapi::XapiData;

/// Shared, observable state of a mock task instance.
#[derive(Debug, Default)]
pub struct TaskState {
    pub answered: bool,
    pub score: i32,
    pub max_score: i32,
    pub reset_calls: usize,
    pub solution_calls: usize,
    pub resize_calls: usize,
}

/// A scoreable, answerable, resettable, solvable, resumable task element.
struct MockTask {
    state: Rc<RefCell<TaskState>>,
}

impl ContentElement for MockTask {
    fn type_name(&self) -> &str {
        "Task"
    }

    fn resize(&mut self) {
        self.state.borrow_mut().resize_calls += 1;
    }

    fn as_scoreable(&self) -> Option<&dyn Scoreable> {
        Some(self)
    }

    fn as_task(&self) -> Option<&dyn AnswerableTask> {
        Some(self)
    }

    fn as_resumable(&self) -> Option<&dyn Resumable> {
        Some(self)
    }

    fn as_resettable(&mut self) -> Option<&mut dyn Resettable> {
        Some(self)
    }

    fn as_solvable(&mut self) -> Option<&mut dyn Solvable> {
        Some(self)
    }

    fn xapi_data(&self) -> Option<XapiData> {
        Some(XapiData::new(json!({ "object": "mock-task" })))
    }
}

impl Scoreable for MockTask {
    fn score(&self) -> i32 {
        self.state.borrow().score
    }

    fn max_score(&self) -> i32 {
        self.state.borrow().max_score
    }
}

impl AnswerableTask for MockTask {
    fn answer_given(&self) -> bool {
        self.state.borrow().answered
    }
}

impl Resumable for MockTask {
    fn current_state(&self) -> Value {
        let state = self.state.borrow();
        json!({ "answered": state.answered, "score": state.score })
    }
}

impl Resettable for MockTask {
    fn reset_task(&mut self) {
        let mut state = self.state.borrow_mut();
        state.answered = false;
        state.score = 0;
        state.reset_calls += 1;
    }
}

impl Solvable for MockTask {
    fn show_solutions(&mut self) {
        self.state.borrow_mut().solution_calls += 1;
    }
}

/// A passive element with no facets at all.
struct MockText;

impl ContentElement for MockText {
    fn type_name(&self) -> &str {
        "Text"
    }
}

/// A non-task element that exports answer text and carries attribution.
struct MockExporter;

impl ContentElement for MockExporter {
    fn type_name(&self) -> &str {
        "Export"
    }

    fn exports_answers(&self) -> bool {
        true
    }

    fn as_copyrightable(&self) -> Option<&dyn Copyrightable> {
        Some(self)
    }
}

impl Copyrightable for MockExporter {
    fn copyrights(&self) -> CopyrightInfo {
        CopyrightInfo {
            title: Some("Exported media".to_string()),
            ..Default::default()
        }
    }
}

/// Record of one factory invocation, in creation order.
pub struct CreatedElement {
    pub library: String,
    pub resume: Option<Value>,
    pub state: Option<Rc<RefCell<TaskState>>>,
}

/// Factory covering the mock element zoo. Created instances are recorded so
/// tests can reach into their shared state.
pub struct MockFactory {
    pub created: Rc<RefCell<Vec<CreatedElement>>>,
    pub fail_library: Option<String>,
}

impl MockFactory {
    pub fn new() -> (Self, Rc<RefCell<Vec<CreatedElement>>>) {
        let created = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                created: created.clone(),
                fail_library: None,
            },
            created,
        )
    }
}

impl ElementFactory for MockFactory {
    fn create(
        &self,
        descriptor: &ContentDescriptor,
        _content_id: &str,
        resume: Option<&Value>,
    ) -> anyhow::Result<Box<dyn ContentElement>> {
        if self.fail_library.as_deref() == Some(descriptor.library.as_str()) {
            anyhow::bail!("broken content parameters for {}", descriptor.library);
        }
        let mut record = CreatedElement {
            library: descriptor.library.clone(),
            resume: resume.cloned(),
            state: None,
        };
        let instance: Box<dyn ContentElement> = match descriptor.library.as_str() {
            "Task" => {
                let max_score = descriptor
                    .params
                    .get("maxScore")
                    .and_then(Value::as_i64)
                    .unwrap_or(1) as i32;
                let state = Rc::new(RefCell::new(TaskState {
                    max_score,
                    ..Default::default()
                }));
                if let Some(fragment) = resume {
                    let mut s = state.borrow_mut();
                    s.answered = fragment["answered"].as_bool().unwrap_or(false);
                    s.score = fragment["score"].as_i64().unwrap_or(0) as i32;
                }
                record.state = Some(state.clone());
                Box::new(MockTask { state })
            }
            "Export" => Box::new(MockExporter),
            _ => Box::new(MockText),
        };
        self.created.borrow_mut().push(record);
        Ok(instance)
    }

    fn descriptor_is_task(&self, descriptor: &ContentDescriptor) -> bool {
        descriptor.library == "Task"
    }

    fn descriptor_exports_answers(&self, descriptor: &ContentDescriptor) -> bool {
        descriptor.library == "Export"
    }
}

/// Confirmation dialog with a scripted response and an invocation counter.
pub struct ScriptedDialog {
    pub response: bool,
    pub calls: Rc<RefCell<usize>>,
}

impl ScriptedDialog {
    pub fn new(response: bool) -> (Self, Rc<RefCell<usize>>) {
        let calls = Rc::new(RefCell::new(0));
        (
            Self {
                response,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl ConfirmationDialog for ScriptedDialog {
    fn confirm_submission(&mut self) -> bool {
        *self.calls.borrow_mut() += 1;
        self.response
    }
}

pub fn element(library: &str) -> ElementDefinition {
    ElementDefinition {
        placement: Placement::default(),
        action: ContentDescriptor {
            library: library.to_string(),
            params: Value::Null,
        },
        display_as_button: false,
        solution: None,
        always_display_comments: false,
    }
}

pub fn slide(libraries: &[&str]) -> SlideDefinition {
    SlideDefinition {
        elements: libraries.iter().map(|l| element(l)).collect(),
        ..Default::default()
    }
}

pub fn titled_slide(title: &str, libraries: &[&str]) -> SlideDefinition {
    SlideDefinition {
        keywords: vec![KeywordEntry {
            main: title.to_string(),
            subs: Vec::new(),
        }],
        ..slide(libraries)
    }
}

pub fn deck(slides: Vec<SlideDefinition>) -> DeckParameters {
    DeckParameters {
        presentation: PresentationParams {
            slides,
            global_background: None,
            keyword_list_enabled: true,
        },
        overrides: OverrideParams::default(),
    }
}

/// Build an engine over mock content; returns the factory's creation log.
pub fn engine_with(
    slides: Vec<SlideDefinition>,
    extras: Extras,
) -> (PresentationEngine, Rc<RefCell<Vec<CreatedElement>>>) {
    let (factory, created) = MockFactory::new();
    let engine = PresentationEngine::new(
        deck(slides),
        "content-1",
        extras,
        Box::new(factory),
        Box::new(crate::engine::AlwaysConfirm),
    )
    .unwrap();
    (engine, created)
}

/// Shared state handle for the `nth` created task instance (creation order).
pub fn task_state(
    created: &Rc<RefCell<Vec<CreatedElement>>>,
    nth: usize,
) -> Rc<RefCell<TaskState>> {
    created
        .borrow()
        .iter()
        .filter_map(|c| c.state.clone())
        .nth(nth)
        .expect("task instance not created yet")
}

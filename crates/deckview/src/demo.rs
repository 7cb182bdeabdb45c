//! Built-in demo content: a tiny element zoo so the player can run without
//! a host runtime supplying its own content types.
//!
//! Every created element shares its view state with the app through an
//! `Rc<RefCell<..>>` handle; the engine drives the element facets while the
//! app renders and mutates the same state in response to clicks.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Value, json};

use coursedeck::deck::ContentDescriptor;
use coursedeck::element::{AnswerableTask, Resettable, Resumable, Scoreable, Solvable};
use coursedeck::{ContentElement, ElementFactory};

/// What the app draws for one element.
pub enum DemoView {
    Text {
        body: String,
        heading: bool,
    },
    Quiz {
        question: String,
        alternatives: Vec<String>,
        correct: usize,
        chosen: Option<usize>,
        revealed: bool,
    },
}

pub type ViewHandle = Rc<RefCell<DemoView>>;

struct TextElement {
    view: ViewHandle,
}

impl ContentElement for TextElement {
    fn type_name(&self) -> &str {
        "Text"
    }

    fn title(&self) -> Option<String> {
        match &*self.view.borrow() {
            DemoView::Text {
                body,
                heading: true,
            } => Some(body.clone()),
            _ => None,
        }
    }
}

struct QuizElement {
    view: ViewHandle,
}

impl QuizElement {
    fn with_view<T>(&self, f: impl FnOnce(&DemoView) -> T) -> T {
        f(&self.view.borrow())
    }
}

impl ContentElement for QuizElement {
    fn type_name(&self) -> &str {
        "SingleChoice"
    }

    fn title(&self) -> Option<String> {
        self.with_view(|view| match view {
            DemoView::Quiz { question, .. } => Some(question.clone()),
            _ => None,
        })
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
}

impl Scoreable for QuizElement {
    fn score(&self) -> i32 {
        self.with_view(|view| match view {
            DemoView::Quiz {
                chosen, correct, ..
            } if *chosen == Some(*correct) => 1,
            _ => 0,
        })
    }

    fn max_score(&self) -> i32 {
        1
    }
}

impl AnswerableTask for QuizElement {
    fn answer_given(&self) -> bool {
        self.with_view(|view| matches!(view, DemoView::Quiz { chosen: Some(_), .. }))
    }
}

impl Resumable for QuizElement {
    fn current_state(&self) -> Value {
        self.with_view(|view| match view {
            DemoView::Quiz { chosen, .. } => json!({ "chosen": chosen }),
            _ => Value::Null,
        })
    }
}

impl Resettable for QuizElement {
    fn reset_task(&mut self) {
        if let DemoView::Quiz {
            chosen, revealed, ..
        } = &mut *self.view.borrow_mut()
        {
            *chosen = None;
            *revealed = false;
        }
    }
}

impl Solvable for QuizElement {
    fn show_solutions(&mut self) {
        if let DemoView::Quiz { revealed, .. } = &mut *self.view.borrow_mut() {
            *revealed = true;
        }
    }
}

/// Factory for the demo content types. Created view handles are recorded in
/// attachment order so the app can pick them up per slide.
pub struct DemoFactory {
    created: Rc<RefCell<Vec<ViewHandle>>>,
}

impl DemoFactory {
    pub fn new() -> (Self, Rc<RefCell<Vec<ViewHandle>>>) {
        let created = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                created: created.clone(),
            },
            created,
        )
    }
}

impl ElementFactory for DemoFactory {
    fn create(
        &self,
        descriptor: &ContentDescriptor,
        _content_id: &str,
        resume: Option<&Value>,
    ) -> anyhow::Result<Box<dyn ContentElement>> {
        let params = &descriptor.params;
        let view = match descriptor.library.as_str() {
            "Text" => DemoView::Text {
                body: params["text"].as_str().unwrap_or_default().to_string(),
                heading: params["heading"].as_bool().unwrap_or(false),
            },
            "SingleChoice" => {
                let alternatives: Vec<String> = params["alternatives"]
                    .as_array()
                    .map(|a| {
                        a.iter()
                            .filter_map(|v| v.as_str())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                if alternatives.is_empty() {
                    anyhow::bail!("single-choice element without alternatives");
                }
                let chosen = resume
                    .and_then(|r| r["chosen"].as_u64())
                    .map(|c| c as usize)
                    .filter(|&c| c < alternatives.len());
                DemoView::Quiz {
                    question: params["question"].as_str().unwrap_or_default().to_string(),
                    correct: params["correct"].as_u64().unwrap_or(0) as usize,
                    alternatives,
                    chosen,
                    revealed: false,
                }
            }
            other => anyhow::bail!("unknown content type: {other}"),
        };

        let handle = Rc::new(RefCell::new(view));
        self.created.borrow_mut().push(handle.clone());
        Ok(match &*handle.borrow() {
            DemoView::Text { .. } => Box::new(TextElement { view: handle.clone() }),
            DemoView::Quiz { .. } => Box::new(QuizElement { view: handle.clone() }),
        })
    }

    fn descriptor_is_task(&self, descriptor: &ContentDescriptor) -> bool {
        descriptor.library == "SingleChoice"
    }
}

/// Deck used when no parameter file is given.
pub const DEMO_DECK: &str = r#"{
    "presentation": {
        "slides": [
            {
                "keywords": [{ "main": "Welcome" }],
                "elements": [
                    {
                        "x": 8, "y": 10, "width": 84, "height": 20,
                        "action": {
                            "library": "Text",
                            "params": { "text": "Deckview", "heading": true }
                        }
                    },
                    {
                        "x": 8, "y": 35, "width": 84, "height": 50,
                        "action": {
                            "library": "Text",
                            "params": { "text": "Navigate with the arrow keys or by swiping. Press M for the keyword menu, Ctrl+S to save your progress. Answer the quizzes along the way; the final slide sums up your score." }
                        }
                    }
                ]
            },
            {
                "keywords": [{ "main": "Geography", "subs": ["One quick question"] }],
                "elements": [
                    {
                        "x": 8, "y": 12, "width": 84, "height": 70,
                        "action": {
                            "library": "SingleChoice",
                            "params": {
                                "question": "Which of these is the capital of Sweden?",
                                "alternatives": ["Gothenburg", "Stockholm", "Uppsala"],
                                "correct": 1
                            }
                        }
                    }
                ]
            },
            {
                "elements": [
                    {
                        "x": 8, "y": 30, "width": 84, "height": 40,
                        "action": {
                            "library": "Text",
                            "params": { "text": "This slide has no keyword, so it does not appear in the menu. The progress bar at the bottom still counts it." }
                        }
                    }
                ]
            },
            {
                "keywords": [{ "main": "Arithmetic" }],
                "elements": [
                    {
                        "x": 8, "y": 12, "width": 84, "height": 70,
                        "action": {
                            "library": "SingleChoice",
                            "params": {
                                "question": "What is 7 times 8?",
                                "alternatives": ["54", "56", "64"],
                                "correct": 1
                            }
                        }
                    }
                ]
            }
        ]
    }
}"#;

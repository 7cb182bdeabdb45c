use super::*;
use crate::engine::JumpOptions;
use crate::progress::AnsweredState;
use crate::summary::percentage;

#[test]
fn test_score_sums_over_attached_instances() {
    let (mut engine, created) = engine_with(
        vec![
            slide(&["Task", "Text"]),
            slide(&["Task"]),
            slide(&["Task"]),
        ],
        Extras::default(),
    );
    // Eager attachment covers slides 0 and 1; slide 2 is not mounted yet.
    task_state(&created, 0).borrow_mut().score = 1;
    task_state(&created, 1).borrow_mut().score = 1;
    assert_eq!(engine.score(), 2);
    assert_eq!(engine.max_score(), 2);

    engine.jump_to(2, JumpOptions::default()).unwrap();
    assert_eq!(engine.max_score(), 3);
}

#[test]
fn test_taskless_deck_scores_zero() {
    let (engine, _) = engine_with(vec![slide(&["Text"]), slide(&["Text"])], Extras::default());
    assert_eq!(engine.score(), 0);
    assert_eq!(engine.max_score(), 0);
    assert_eq!(percentage(engine.score(), engine.max_score()), 0);
}

#[test]
fn test_show_solutions_with_nothing_scoreable() {
    let (mut engine, _) = engine_with(vec![slide(&["Text"]), slide(&["Text"])], Extras::default());
    assert!(engine.show_solutions().unwrap().is_none());
    assert!(!engine.is_solution_mode());
}

#[test]
fn test_show_solutions_jumps_to_first_task_only_once() {
    let (mut engine, created) = engine_with(
        vec![slide(&["Text"]), slide(&["Task"]), slide(&["Text"]), slide(&["Task"])],
        Extras::default(),
    );
    let records = engine.show_solutions().unwrap().unwrap();
    assert!(engine.is_solution_mode());
    assert_eq!(engine.current_slide(), 1);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].slide_index, 1);
    assert_eq!(records[1].slide_index, 3);
    // Every task slide got mounted so its solutions could be revealed.
    assert!(engine.registry().runtime(3).attached);
    assert_eq!(task_state(&created, 0).borrow().solution_calls, 1);
    assert_eq!(task_state(&created, 1).borrow().solution_calls, 1);

    // A second invocation re-reveals but stays put.
    engine.complete_transition();
    engine.jump_to(2, JumpOptions::default()).unwrap();
    engine.complete_transition();
    engine.show_solutions().unwrap().unwrap();
    assert_eq!(engine.current_slide(), 2);
    assert_eq!(task_state(&created, 0).borrow().solution_calls, 2);
}

#[test]
fn test_solution_mode_markers_carry_correctness() {
    let (mut engine, created) = engine_with(
        vec![slide(&["Task"]), slide(&["Task"])],
        Extras::default(),
    );
    {
        let correct = task_state(&created, 0);
        let mut s = correct.borrow_mut();
        s.answered = true;
        s.score = 1;
    }
    {
        let wrong = task_state(&created, 1);
        let mut s = wrong.borrow_mut();
        s.answered = true;
        s.score = 0;
    }
    engine.show_solutions().unwrap();
    assert_eq!(engine.progress().answered(0), AnsweredState::AllCorrect);
    assert_eq!(engine.progress().answered(1), AnsweredState::HasIncorrect);
}

#[test]
fn test_markers_outside_solution_mode_never_show_correctness() {
    let (mut engine, created) = engine_with(
        vec![slide(&["Task"]), slide(&["Text"])],
        Extras::default(),
    );
    {
        let state = task_state(&created, 0);
        let mut s = state.borrow_mut();
        s.answered = true;
        s.score = 0;
    }
    engine.next_slide().unwrap();
    assert_eq!(engine.progress().answered(0), AnsweredState::Answered);
}

#[test]
fn test_reset_returns_to_start_and_clears_everything() {
    let (mut engine, created) = engine_with(
        vec![slide(&["Task"]), slide(&["Task"]), slide(&["Text"])],
        Extras::default(),
    );
    {
        let state = task_state(&created, 0);
        let mut s = state.borrow_mut();
        s.answered = true;
        s.score = 1;
    }
    engine.show_solutions().unwrap();
    engine.complete_transition();

    engine.reset_tasks().unwrap();
    assert!(!engine.is_solution_mode());
    assert_eq!(engine.current_slide(), 0);
    assert_eq!(engine.score(), 0);
    assert_eq!(task_state(&created, 0).borrow().reset_calls, 1);
    assert_eq!(task_state(&created, 1).borrow().reset_calls, 1);
    assert_eq!(engine.progress().answered(0), AnsweredState::NotAnswered);

    // The first-solution jump latch is re-armed by the reset.
    engine.show_solutions().unwrap();
    assert_eq!(engine.current_slide(), 0);
    assert!(engine.is_solution_mode());
}

#[test]
fn test_xapi_children_cover_every_task() {
    let (engine, created) = engine_with(
        vec![slide(&["Task", "Task"]), slide(&["Task"])],
        Extras::default(),
    );
    for nth in 0..3 {
        task_state(&created, nth).borrow_mut().score = 1;
    }
    let data = engine.xapi_data();
    assert_eq!(data.children.len(), 3);
    assert_eq!(engine.score(), 3);

    // Flattening keeps the deck statement first.
    assert_eq!(data.flatten().len(), 4);
}

#[test]
fn test_report_context_is_one_indexed() {
    let (mut engine, _) = engine_with(vec![slide(&[]), slide(&[])], Extras::default());
    assert_eq!(engine.context().kind, "slide");
    assert_eq!(engine.context().value, 1);
    engine.next_slide().unwrap();
    assert_eq!(engine.context().value, 2);
}

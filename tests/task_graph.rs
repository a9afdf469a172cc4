// tests/task_graph.rs
//
// TaskSet construction rejects malformed graphs before anything runs.

use rnapipe::dag::TaskSet;
use rnapipe::errors::PipelineError;
use rnapipe_test_utils::builders::TaskBuilder;

#[test]
fn valid_chain_is_accepted() {
    let set = TaskSet::new(vec![
        TaskBuilder::new("a").build(),
        TaskBuilder::new("b").after("a").build(),
        TaskBuilder::new("c").after("b").build(),
    ])
    .unwrap();

    assert_eq!(set.len(), 3);
    assert_eq!(set.dependencies_of("c").to_vec(), vec!["b".to_string()]);
    assert_eq!(set.dependents_of("a").to_vec(), vec!["b".to_string()]);
}

#[test]
fn duplicate_task_id_is_rejected() {
    let err = TaskSet::new(vec![
        TaskBuilder::new("a").build(),
        TaskBuilder::new("a").build(),
    ])
    .unwrap_err();
    assert!(matches!(err, PipelineError::DuplicateTask(ref id) if id == "a"));
}

#[test]
fn unknown_dependency_is_rejected() {
    let err = TaskSet::new(vec![TaskBuilder::new("a").after("ghost").build()]).unwrap_err();
    match err {
        PipelineError::UnknownDependency { task, dep } => {
            assert_eq!(task, "a");
            assert_eq!(dep, "ghost");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn self_dependency_is_rejected() {
    let err = TaskSet::new(vec![TaskBuilder::new("a").after("a").build()]).unwrap_err();
    assert!(matches!(err, PipelineError::CyclicDependency(_)));
}

#[test]
fn dependency_cycle_is_rejected() {
    let err = TaskSet::new(vec![
        TaskBuilder::new("a").after("c").build(),
        TaskBuilder::new("b").after("a").build(),
        TaskBuilder::new("c").after("b").build(),
    ])
    .unwrap_err();
    assert!(matches!(err, PipelineError::CyclicDependency(_)));
}

#[test]
fn task_without_outputs_is_rejected() {
    let mut task = TaskBuilder::new("a").build();
    task.outputs.clear();

    let err = TaskSet::new(vec![task]).unwrap_err();
    assert!(matches!(err, PipelineError::EmptyOutputs { ref task } if task == "a"));
}

#[test]
fn dependents_are_sorted_for_determinism() {
    let set = TaskSet::new(vec![
        TaskBuilder::new("base").build(),
        TaskBuilder::new("z").after("base").build(),
        TaskBuilder::new("a").after("base").build(),
        TaskBuilder::new("m").after("base").build(),
    ])
    .unwrap();

    assert_eq!(
        set.dependents_of("base").to_vec(),
        vec!["a".to_string(), "m".to_string(), "z".to_string()]
    );
}

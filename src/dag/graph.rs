// src/dag/graph.rs

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::dag::task::{Task, TaskId};
use crate::errors::{PipelineError, Result};

/// Validated collection of tasks plus reverse (dependent) edges.
///
/// Construction fails fast on duplicate ids, references to unknown tasks,
/// tasks with no declared outputs, and dependency cycles. After that the
/// scheduler can assume the graph is a well-formed DAG.
#[derive(Debug, Clone)]
pub struct TaskSet {
    tasks: HashMap<TaskId, Task>,
    dependents: HashMap<TaskId, Vec<TaskId>>,
}

impl TaskSet {
    pub fn new(tasks: Vec<Task>) -> Result<Self> {
        let mut map: HashMap<TaskId, Task> = HashMap::new();
        for task in tasks {
            if task.outputs.is_empty() {
                return Err(PipelineError::EmptyOutputs {
                    task: task.id.clone(),
                });
            }
            if map.insert(task.id.clone(), task.clone()).is_some() {
                return Err(PipelineError::DuplicateTask(task.id));
            }
        }

        for task in map.values() {
            for dep in &task.deps {
                if !map.contains_key(dep) {
                    return Err(PipelineError::UnknownDependency {
                        task: task.id.clone(),
                        dep: dep.clone(),
                    });
                }
                if dep == &task.id {
                    return Err(PipelineError::CyclicDependency(format!(
                        "task '{}' depends on itself",
                        task.id
                    )));
                }
            }
        }

        validate_acyclic(&map)?;

        let mut dependents: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
        for task in map.values() {
            for dep in &task.deps {
                dependents
                    .entry(dep.clone())
                    .or_default()
                    .push(task.id.clone());
            }
        }
        // Deterministic dependent order regardless of map iteration.
        for deps in dependents.values_mut() {
            deps.sort();
        }

        Ok(Self {
            tasks: map,
            dependents,
        })
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Immediate dependencies of a task.
    pub fn dependencies_of(&self, id: &str) -> &[TaskId] {
        self.tasks.get(id).map(|t| t.deps.as_slice()).unwrap_or(&[])
    }

    /// Immediate dependents of a task (tasks that list it as a dependency).
    pub fn dependents_of(&self, id: &str) -> &[TaskId] {
        self.dependents
            .get(id)
            .map(|d| d.as_slice())
            .unwrap_or(&[])
    }
}

/// A topological sort fails iff there is a cycle.
fn validate_acyclic(tasks: &HashMap<TaskId, Task>) -> Result<()> {
    // Edge direction: dep -> task.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for id in tasks.keys() {
        graph.add_node(id.as_str());
    }

    for task in tasks.values() {
        for dep in &task.deps {
            graph.add_edge(dep.as_str(), task.id.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(PipelineError::CyclicDependency(format!(
                "cycle in task DAG involving task '{}'",
                node
            )))
        }
    }
}

//! Todo agent: typed task dispatch over a private in-memory list.

use crate::agents::base::{Agent, AgentCore, AgentError};
use ak_protocol::{AgentDefinition, AgentEvent, RawTask, SeedTodo, Task, Todo, TodoPatch};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

/// Result of dispatching a single task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "value", rename_all = "lowercase")]
pub enum TaskOutcome {
    /// The todo that was created.
    Created(Todo),
    /// The todo after the patch was applied, or `None` if the id was unknown.
    Updated(Option<Todo>),
    /// Whether a todo with the id existed and was removed.
    Deleted(bool),
}

/// An agent that owns a list of todos and mutates it through [`Task`]s.
///
/// Each mutation publishes a domain event (`todoCreated`, `todoUpdated`,
/// `todoDeleted`) carrying the affected todo. Readers always get copies.
pub struct TodoAgent {
    core: AgentCore,
    todos: Mutex<Vec<Todo>>,
}

impl TodoAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: AgentCore::new(name, None),
            todos: Mutex::new(Vec::new()),
        }
    }

    pub fn from_definition(definition: &AgentDefinition) -> Self {
        Self {
            core: AgentCore::new(definition.name.clone(), definition.description.clone()),
            todos: Mutex::new(Vec::new()),
        }
        .with_seed_todos(definition.seed_todos.iter().cloned())
    }

    /// Preload todos without publishing events.
    pub fn with_seed_todos(self, seeds: impl IntoIterator<Item = SeedTodo>) -> Self {
        {
            let mut todos = self.todos.lock();
            for seed in seeds {
                let mut todo = Todo::new(new_id(), seed.title);
                todo.completed = seed.completed;
                todos.push(todo);
            }
        }
        self
    }

    /// Dispatch a task to exactly one handler.
    pub fn handle_task(&self, task: Task) -> TaskOutcome {
        debug!(agent = %self.name(), task = task.name(), "Handling task");

        match task {
            Task::Create { title } => TaskOutcome::Created(self.dispatch_create(title)),
            Task::Update { id, patch } => TaskOutcome::Updated(self.dispatch_update(&id, &patch)),
            Task::Delete { id } => TaskOutcome::Deleted(self.dispatch_delete(&id)),
        }
    }

    /// Decode and dispatch a task that arrived in untyped form.
    ///
    /// # Errors
    ///
    /// `AgentError::Task` if the tag is unknown or the payload does not
    /// match it. The agent's state is untouched in that case.
    pub fn handle_raw_task(&self, raw: RawTask) -> Result<TaskOutcome, AgentError> {
        let task = Task::try_from(raw)?;
        Ok(self.handle_task(task))
    }

    pub fn add_task(&self, title: impl Into<String>) -> Todo {
        self.dispatch_create(title.into())
    }

    pub fn update_task(&self, id: &str, patch: TodoPatch) -> Option<Todo> {
        self.dispatch_update(id, &patch)
    }

    pub fn complete_task(&self, id: &str) -> Option<Todo> {
        self.update_task(id, TodoPatch::completed())
    }

    pub fn remove_task(&self, id: &str) -> bool {
        self.dispatch_delete(id)
    }

    pub fn get_all_todos(&self) -> Vec<Todo> {
        self.todos.lock().clone()
    }

    pub fn get_completed_todos(&self) -> Vec<Todo> {
        self.filtered(|t| t.completed)
    }

    pub fn get_pending_todos(&self) -> Vec<Todo> {
        self.filtered(|t| !t.completed)
    }

    pub fn get_todo(&self, id: &str) -> Option<Todo> {
        self.todos.lock().iter().find(|t| t.id == id).cloned()
    }

    fn filtered(&self, keep: impl Fn(&Todo) -> bool) -> Vec<Todo> {
        self.todos
            .lock()
            .iter()
            .filter(|t| keep(t))
            .cloned()
            .collect()
    }

    fn dispatch_create(&self, title: String) -> Todo {
        let todo = Todo::new(new_id(), title);
        self.todos.lock().push(todo.clone());

        self.core.emit(AgentEvent::TodoCreated { todo: todo.clone() });
        todo
    }

    fn dispatch_update(&self, id: &str, patch: &TodoPatch) -> Option<Todo> {
        let updated = {
            let mut todos = self.todos.lock();
            let todo = todos.iter_mut().find(|t| t.id == id)?;
            todo.apply(patch);
            todo.clone()
        };

        self.core.emit(AgentEvent::TodoUpdated {
            todo: updated.clone(),
        });
        Some(updated)
    }

    fn dispatch_delete(&self, id: &str) -> bool {
        let removed = {
            let mut todos = self.todos.lock();
            match todos.iter().position(|t| t.id == id) {
                Some(index) => todos.remove(index),
                None => return false,
            }
        };

        self.core.emit(AgentEvent::TodoDeleted { todo: removed });
        true
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[async_trait]
impl Agent for TodoAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }
}

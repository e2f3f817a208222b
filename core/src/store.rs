//! Client-side cache of the signed-in user's task list.
//!
//! # Design
//! `TaskStore` is a read-through copy of the server's task list. Every
//! mutation waits for server confirmation before it touches the cache, so
//! the cache only ever reflects successful responses. Fetches replace the
//! list and pagination wholesale; mutations patch single entries and never
//! re-derive pagination.
//!
//! A failed fetch discards the cache and resets pagination to page 1 of 1.
//! A failed mutation leaves the cache untouched. In both cases the message
//! is kept in `error()` and the `ApiError` is returned to the caller.
//!
//! Mutating methods take `&mut self`, so one store applies its own
//! responses in call order. Hosts that run requests elsewhere and feed the
//! results back use `begin` and `apply_update`, which drop a response that
//! is older than one already applied for the same task, or that was issued
//! before the most recent fetch.

use std::collections::HashMap;

use log::warn;
use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{CreateTask, PageQuery, Pagination, Task, TaskList, UpdateTask};

/// Sequence number issued for one in-flight mutation of one task.
///
/// `epoch` counts fetches; a ticket from an older epoch is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub id: Uuid,
    pub epoch: u64,
    pub seq: u64,
}

pub struct TaskStore<'a, T> {
    client: &'a ApiClient<T>,
    tasks: Vec<Task>,
    loading: bool,
    error: Option<String>,
    pagination: Pagination,
    epoch: u64,
    issued: HashMap<Uuid, u64>,
    applied: HashMap<Uuid, u64>,
}

impl<'a, T: Transport> TaskStore<'a, T> {
    /// An empty store. Call `fetch` to populate it.
    pub fn new(client: &'a ApiClient<T>) -> Self {
        Self {
            client,
            tasks: Vec::new(),
            loading: false,
            error: None,
            pagination: Pagination::default(),
            epoch: 0,
            issued: HashMap::new(),
            applied: HashMap::new(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Set only while a fetch runs. Fetches hold `&mut self`, so callers
    /// always observe `false` between calls.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Look a task up in the cache only. Tasks that exist on the server but
    /// have not been fetched are reported as absent.
    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn fetch(&mut self) -> Result<(), ApiError> {
        let client = self.client;
        self.load(|| client.list_tasks())
    }

    pub fn go_to_page(&mut self, page: u32) -> Result<(), ApiError> {
        let client = self.client;
        let query = PageQuery {
            page: page.max(1),
            page_size: None,
        };
        self.load(|| client.list_tasks_page(query))
    }

    /// Create a task and put the server's copy at the front of the list.
    pub fn create(&mut self, input: &CreateTask) -> Result<Task, ApiError> {
        self.error = None;
        match self.client.create_task(input) {
            Ok(task) => {
                self.tasks.insert(0, task.clone());
                Ok(task)
            }
            Err(err) => Err(self.fail(err, "Failed to create task")),
        }
    }

    pub fn update(&mut self, id: Uuid, patch: &UpdateTask) -> Result<Task, ApiError> {
        self.error = None;
        let ticket = self.begin(id);
        match self.client.update_task(id, patch) {
            Ok(task) => {
                self.apply_update(ticket, task.clone());
                Ok(task)
            }
            Err(err) => Err(self.fail(err, "Failed to update task")),
        }
    }

    /// Flip completion through the dedicated toggle endpoint.
    pub fn toggle(&mut self, id: Uuid) -> Result<Task, ApiError> {
        self.error = None;
        let ticket = self.begin(id);
        match self.client.toggle_task(id) {
            Ok(task) => {
                self.apply_update(ticket, task.clone());
                Ok(task)
            }
            Err(err) => Err(self.fail(err, "Failed to toggle task")),
        }
    }

    pub fn delete(&mut self, id: Uuid) -> Result<(), ApiError> {
        self.error = None;
        match self.client.delete_task(id) {
            Ok(()) => {
                self.tasks.retain(|t| t.id != id);
                self.issued.remove(&id);
                self.applied.remove(&id);
                Ok(())
            }
            Err(err) => Err(self.fail(err, "Failed to delete task")),
        }
    }

    /// Issue the next sequence number for a mutation of `id`.
    pub fn begin(&mut self, id: Uuid) -> Ticket {
        let seq = self.issued.entry(id).or_insert(0);
        *seq += 1;
        Ticket {
            id,
            epoch: self.epoch,
            seq: *seq,
        }
    }

    /// Replace the cached entry for `ticket.id` in place.
    ///
    /// Returns `false` and leaves the cache alone when the ticket predates
    /// the last fetch or a response for a later ticket has been applied.
    pub fn apply_update(&mut self, ticket: Ticket, task: Task) -> bool {
        if ticket.epoch != self.epoch {
            warn!(
                "dropping response for task {} issued before the last fetch",
                ticket.id
            );
            return false;
        }
        let newest = self.applied.get(&ticket.id).copied().unwrap_or(0);
        if ticket.seq <= newest {
            warn!(
                "dropping stale response for task {} (seq {} <= {newest})",
                ticket.id, ticket.seq
            );
            return false;
        }
        self.applied.insert(ticket.id, ticket.seq);
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == ticket.id) {
            *slot = task;
        }
        true
    }

    fn load(
        &mut self,
        call: impl FnOnce() -> Result<TaskList, ApiError>,
    ) -> Result<(), ApiError> {
        self.loading = true;
        self.error = None;
        let result = call();
        self.loading = false;

        // Every fetch, successful or not, invalidates outstanding tickets.
        self.epoch += 1;
        self.issued.clear();
        self.applied.clear();

        match result {
            Ok(list) => {
                self.pagination = Pagination::from(&list);
                self.tasks = list.items;
                Ok(())
            }
            Err(err) => {
                self.tasks.clear();
                self.pagination = Pagination::default();
                Err(self.fail(err, "Failed to fetch tasks"))
            }
        }
    }

    /// Record the error for display. `ApiError::message` always yields
    /// text (the server's message or the transport description), so
    /// `context` only prefixes the log line.
    fn fail(&mut self, err: ApiError, context: &str) -> ApiError {
        let message = err.message();
        warn!("{context}: {message}");
        self.error = Some(message);
        err
    }
}

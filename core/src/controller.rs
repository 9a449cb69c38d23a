//! The recipe view-model: single owner of the in-memory recipe list.
//!
//! # Design
//! `RecipeViewModel` is a single-writer state holder. All state sits in one
//! `RefCell` that is only borrowed inside synchronous sections and never
//! across an `.await`, so the network call is the only point where another
//! operation on the same view-model can interleave. Operations take `&self`
//! and their futures are `!Send`; run them on a current-thread runtime, a
//! `LocalSet`, or a browser executor.
//!
//! Every change to the records, the loading flag, or the error message is
//! pushed to subscribed [`SyncObserver`]s as a fresh snapshot, after the
//! borrow is released, so observers may read back from the view-model.
//!
//! Mutations on [`RecordKey::Pending`] records never reach the network.
//! Edits to persisted records are applied optimistically and kept even if
//! the server rejects them; deletes always remove the record locally.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::Utc;

use crate::client::RecipeClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::handlers::RecipeHandlers;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{LocalRecipe, RecipeDraft, RecordKey, WriteResponse};

pub const TITLE_REQUIRED: &str = "title is required";
pub const LOAD_FAILED: &str = "failed to load recipes";
pub const CREATE_FAILED: &str = "failed to create recipe";
pub const UPDATE_FAILED: &str = "failed to update recipe";
pub const DELETE_FAILED: &str = "failed to delete recipe";

/// Receives view-model snapshots. Every method defaults to a no-op.
pub trait SyncObserver {
    fn records_changed(&self, _records: &[LocalRecipe]) {}
    fn loading_changed(&self, _loading: bool) {}
    fn error_changed(&self, _error: Option<&str>) {}
    fn form_reset(&self) {}
}

type RecordsFn = Box<dyn Fn(&[LocalRecipe])>;
type LoadingFn = Box<dyn Fn(bool)>;
type ErrorFn = Box<dyn Fn(Option<&str>)>;
type ResetFn = Box<dyn Fn()>;

/// A `SyncObserver` assembled from four closures.
pub struct Callbacks {
    on_records_changed: RecordsFn,
    on_loading_changed: LoadingFn,
    on_error_changed: ErrorFn,
    on_form_reset: ResetFn,
}

impl Callbacks {
    pub fn new(
        on_records_changed: impl Fn(&[LocalRecipe]) + 'static,
        on_loading_changed: impl Fn(bool) + 'static,
        on_error_changed: impl Fn(Option<&str>) + 'static,
        on_form_reset: impl Fn() + 'static,
    ) -> Self {
        Self {
            on_records_changed: Box::new(on_records_changed),
            on_loading_changed: Box::new(on_loading_changed),
            on_error_changed: Box::new(on_error_changed),
            on_form_reset: Box::new(on_form_reset),
        }
    }
}

impl SyncObserver for Callbacks {
    fn records_changed(&self, records: &[LocalRecipe]) {
        (self.on_records_changed)(records)
    }

    fn loading_changed(&self, loading: bool) {
        (self.on_loading_changed)(loading)
    }

    fn error_changed(&self, error: Option<&str>) {
        (self.on_error_changed)(error)
    }

    fn form_reset(&self) {
        (self.on_form_reset)()
    }
}

#[derive(Debug, Default)]
struct SyncState {
    records: Vec<LocalRecipe>,
    loading: bool,
    error: Option<String>,
    form: RecipeDraft,
}

/// Local ids for records the server has not assigned one to: the current
/// time in milliseconds, bumped when two are requested within the same
/// millisecond.
#[derive(Debug, Default)]
struct PendingIds {
    last: Cell<u64>,
}

impl PendingIds {
    fn next(&self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let id = now.max(self.last.get() + 1);
        self.last.set(id);
        id
    }
}

/// Owner of the recipe list, the loading flag, the last error and the
/// mutation form.
///
/// Operations are `async fn(&self)`; snapshots reach presentation through
/// [`SyncObserver`]s registered with [`subscribe`](Self::subscribe) or
/// [`set_callbacks`](Self::set_callbacks).
pub struct RecipeViewModel<T> {
    handlers: RecipeHandlers<T>,
    state: RefCell<SyncState>,
    observers: RefCell<Vec<Rc<dyn SyncObserver>>>,
    pending_ids: PendingIds,
    surface_write_errors: bool,
}

impl RecipeViewModel<ReqwestTransport> {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }
}

impl<T> RecipeViewModel<T> {
    pub fn new(handlers: RecipeHandlers<T>) -> Self {
        Self {
            handlers,
            state: RefCell::new(SyncState::default()),
            observers: RefCell::new(Vec::new()),
            pending_ids: PendingIds::default(),
            surface_write_errors: false,
        }
    }

    pub fn with_transport(config: &ClientConfig, transport: T) -> Self {
        let handlers = RecipeHandlers::new(RecipeClient::new(&config.base_url), transport);
        Self {
            surface_write_errors: config.surface_write_errors,
            ..Self::new(handlers)
        }
    }

    /// Report failed edits and deletes through `error_changed`. The local
    /// change is kept either way.
    pub fn surface_write_errors(mut self, enabled: bool) -> Self {
        self.surface_write_errors = enabled;
        self
    }

    pub fn handlers(&self) -> &RecipeHandlers<T> {
        &self.handlers
    }

    pub fn subscribe(&self, observer: Rc<dyn SyncObserver>) {
        self.observers.borrow_mut().push(observer);
    }

    pub fn set_callbacks(&self, callbacks: Callbacks) {
        self.subscribe(Rc::new(callbacks));
    }

    pub fn recipes(&self) -> Vec<LocalRecipe> {
        self.state.borrow().records.clone()
    }

    pub fn find(&self, key: RecordKey) -> Option<LocalRecipe> {
        self.state
            .borrow()
            .records
            .iter()
            .find(|r| r.key == key)
            .cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn form(&self) -> RecipeDraft {
        self.state.borrow().form.clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.state.borrow_mut().form.title = title.into();
    }

    pub fn set_ingredients(&self, ingredients: impl Into<String>) {
        self.state.borrow_mut().form.ingredients = ingredients.into();
    }

    pub fn set_description(&self, description: impl Into<String>) {
        self.state.borrow_mut().form.description = description.into();
    }

    pub fn reset_form(&self) {
        self.state.borrow_mut().form = RecipeDraft::default();
        self.notify(|o| o.form_reset());
    }

    fn notify(&self, event: impl Fn(&dyn SyncObserver)) {
        let observers = self.observers.borrow().clone();
        for observer in &observers {
            event(observer.as_ref());
        }
    }

    fn update_records(&self, change: impl FnOnce(&mut Vec<LocalRecipe>)) {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            change(&mut state.records);
            state.records.clone()
        };
        self.notify(|o| o.records_changed(&snapshot));
    }

    fn update_record(&self, key: RecordKey, change: impl FnOnce(&mut LocalRecipe)) {
        self.update_records(|records| {
            if let Some(record) = records.iter_mut().find(|r| r.key == key) {
                change(record);
            }
        });
    }

    fn set_loading(&self, loading: bool) {
        self.state.borrow_mut().loading = loading;
        self.notify(|o| o.loading_changed(loading));
    }

    fn set_error(&self, error: Option<&str>) {
        self.state.borrow_mut().error = error.map(str::to_string);
        self.notify(|o| o.error_changed(error));
    }

    fn begin_loading(&self) -> LoadingGuard<'_, T> {
        self.set_loading(true);
        LoadingGuard { view_model: self }
    }

    fn write_failed(
        &self,
        message: &'static str,
        key: RecordKey,
        error: &ApiError,
    ) -> Option<&'static str> {
        tracing::warn!(
            id = key.id(),
            pending = key.is_pending(),
            %error,
            "{message}; keeping local change"
        );
        self.surface_write_errors.then_some(message)
    }
}

impl<T: Transport> RecipeViewModel<T> {
    /// Replace the list with the server's. Loading is cleared on every exit.
    pub async fn load_recipes(&self) {
        let _loading = self.begin_loading();
        match self.handlers.list().await {
            Ok(recipes) => {
                let mut records: Vec<LocalRecipe> =
                    recipes.into_iter().map(LocalRecipe::from_server).collect();
                number_unsaved(&mut records);
                tracing::debug!(count = records.len(), "recipes loaded");
                self.update_records(|current| *current = records);
                self.set_error(None);
            }
            Err(error) => {
                tracing::warn!(%error, "{LOAD_FAILED}");
                self.set_error(Some(LOAD_FAILED));
            }
        }
    }

    /// Submit the form as a new recipe and prepend the result.
    pub async fn create_recipe(&self) {
        let draft = self.form();
        if !draft.has_title() {
            self.set_error(Some(TITLE_REQUIRED));
            return;
        }

        let _loading = self.begin_loading();
        match self.handlers.create(&draft).await {
            Ok(response) => {
                let record = self.created_record(response, &draft);
                tracing::debug!(key = ?record.key, "recipe created");
                self.update_records(|records| records.insert(0, record));
                self.reset_form();
                self.set_error(None);
            }
            Err(error) => {
                tracing::warn!(%error, "{CREATE_FAILED}");
                self.set_error(Some(CREATE_FAILED));
            }
        }
    }

    fn created_record(&self, response: WriteResponse, draft: &RecipeDraft) -> LocalRecipe {
        match response {
            WriteResponse::Message { recipe_id, .. } => {
                let key = match recipe_id {
                    Some(id) if id > 0 => RecordKey::Persisted(id),
                    _ => RecordKey::Pending(self.pending_ids.next()),
                };
                LocalRecipe::from_draft(key, draft, Utc::now())
            }
            WriteResponse::Record(recipe) => {
                let mut record = LocalRecipe::from_server(recipe);
                if record.key.is_pending() {
                    record.key = RecordKey::Pending(self.pending_ids.next());
                }
                record
            }
        }
    }

    /// Apply `draft` to the record at `key`.
    ///
    /// Pending records change locally only. Persisted records change
    /// immediately and are then reconciled with the server's answer; a
    /// failed update leaves the local change in place.
    pub async fn edit_recipe(&self, key: RecordKey, draft: RecipeDraft) {
        let _loading = self.begin_loading();

        let id = match key {
            RecordKey::Pending(_) => {
                let now = Utc::now();
                self.update_record(key, |record| {
                    record.apply(&draft);
                    record.updated_at = Some(now);
                });
                self.set_error(None);
                return;
            }
            RecordKey::Persisted(id) => id,
        };

        self.update_record(key, |record| record.apply(&draft));

        let error = match self.handlers.update(id, &draft).await {
            Ok(WriteResponse::Message { .. }) => {
                let now = Utc::now();
                self.update_record(key, |record| {
                    record.apply(&draft);
                    record.updated_at = Some(now);
                });
                None
            }
            Ok(WriteResponse::Record(recipe)) => {
                let mut fresh = LocalRecipe::from_server(recipe);
                fresh.key = key;
                self.update_record(key, |record| *record = fresh);
                None
            }
            Err(error) => self.write_failed(UPDATE_FAILED, key, &error),
        };
        self.set_error(error);
    }

    /// Remove the record at `key`. The record is gone afterwards whatever
    /// the server said.
    pub async fn delete_recipe(&self, key: RecordKey) {
        let _loading = self.begin_loading();

        let error = match key {
            RecordKey::Pending(_) => None,
            RecordKey::Persisted(id) => match self.handlers.delete(id).await {
                Ok(true) => None,
                Ok(false) => {
                    tracing::debug!(id, "server did not confirm delete");
                    None
                }
                Err(error) => self.write_failed(DELETE_FAILED, key, &error),
            },
        };

        self.update_records(|records| records.retain(|r| r.key != key));
        self.set_error(error);
    }
}

/// Give every listed record without a server id its own pending key,
/// numbered from 1 in list order. Time-based ids from `PendingIds` never
/// reach that range, and the same list always gets the same keys.
fn number_unsaved(records: &mut [LocalRecipe]) {
    let unsaved = records
        .iter_mut()
        .filter(|r| r.key == RecordKey::Pending(0));
    for (record, n) in unsaved.zip(1..) {
        record.key = RecordKey::Pending(n);
    }
}

/// Clears the loading flag when dropped, including when the operation's
/// future is dropped before completing.
struct LoadingGuard<'a, T> {
    view_model: &'a RecipeViewModel<T>,
}

impl<T> Drop for LoadingGuard<'_, T> {
    fn drop(&mut self) {
        self.view_model.set_loading(false);
    }
}

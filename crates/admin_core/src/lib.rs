use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use shared::{
    domain::{FormMethod, PermissionId},
    protocol::{PermissionBody, PermissionPage, PermissionRecord, SaveOutcome, ValidationErrors},
};
use thiserror::Error;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, warn};

pub mod config;
pub mod messages;
pub mod validate;

pub use config::Settings;

/// Supplies the bearer token attached to every outbound request. The token
/// lifecycle (login, refresh, storage) lives outside this crate.
#[async_trait]
pub trait AuthTokenProvider: Send + Sync {
    async fn token(&self) -> Result<String>;
}

pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl AuthTokenProvider for StaticTokenProvider {
    async fn token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

pub struct MissingAuthTokenProvider;

#[async_trait]
impl AuthTokenProvider for MissingAuthTokenProvider {
    async fn token(&self) -> Result<String> {
        Err(anyhow!("auth token provider is unavailable"))
    }
}

/// Composes request URLs from the externally supplied API base path.
#[derive(Debug, Clone)]
pub struct ApiEndpoint {
    base_path: String,
}

impl ApiEndpoint {
    pub fn new(base_path: impl Into<String>) -> Self {
        let mut base_path = base_path.into();
        while base_path.ends_with('/') {
            base_path.pop();
        }
        Self { base_path }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn permissions(&self) -> String {
        format!("{}/permissions", self.base_path)
    }

    pub fn permission(&self, id: PermissionId) -> String {
        format!("{}/permissions/{}", self.base_path, id.0)
    }
}

/// State of the add/edit form. Created when the view opens, mutated
/// field-by-field on user input, cleared after a successful submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub resource: String,
    pub description: String,
    pub method: String,
    pub path: String,
    pub form_method: FormMethod,
    pub update_id: Option<PermissionId>,
}

/// State driving the list view. Out-of-range values are normalized when the
/// request is built, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pub page: i64,
    pub keywords: Option<String>,
    pub limit: i64,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            page: 1,
            keywords: None,
            limit: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Resource,
    Description,
    Method,
    Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Danger,
}

/// A transient user-facing message for the global toast/snackbar display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub auto_hide: bool,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Success,
            auto_hide: true,
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Danger,
            auto_hide: true,
        }
    }
}

/// State-change and notification events consumed by the UI layer.
#[derive(Debug, Clone)]
pub enum ModuleEvent {
    LoadingChanged(bool),
    PermissionsAssigned(PermissionPage),
    QueryChanged(QueryState),
    FormChanged(FormState),
    FormClosed,
    FormCleared,
    ValidationFailed(ValidationErrors),
    Notification(Notification),
    Error(String),
}

/// Named events that start a workflow. Dispatching a trigger supersedes any
/// still-running handler of the same kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    QueryPermissions,
    GetPermissionById,
    SubmitForm,
    ValidateForm,
    DeleteItemById { id: PermissionId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TriggerKind {
    Query,
    FetchById,
    Submit,
    Validate,
    Delete,
}

impl Trigger {
    fn kind(&self) -> TriggerKind {
        match self {
            Trigger::QueryPermissions => TriggerKind::Query,
            Trigger::GetPermissionById => TriggerKind::FetchById,
            Trigger::SubmitForm => TriggerKind::Submit,
            Trigger::ValidateForm => TriggerKind::Validate,
            Trigger::DeleteItemById { .. } => TriggerKind::Delete,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Trigger::QueryPermissions => "query_permissions",
            Trigger::GetPermissionById => "get_permission_by_id",
            Trigger::SubmitForm => "submit_form",
            Trigger::ValidateForm => "validate_form",
            Trigger::DeleteItemById { .. } => "delete_item_by_id",
        }
    }
}

/// Submit is rejected before any request goes out when the form state
/// breaks the verb/target invariant.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitFormError {
    #[error("update form has no target id")]
    MissingUpdateId,
}

#[derive(Debug, Default)]
struct ModuleState {
    form: FormState,
    query: QueryState,
    permissions: PermissionPage,
    validation_errors: ValidationErrors,
    loading: bool,
    form_open: bool,
}

#[derive(Serialize)]
struct ListQuery {
    page: i64,
    limit: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    keywords: Option<String>,
}

/// Client-side engine for the permission CRUD module: holds form/query
/// state, runs the five REST workflows, and emits state-change and
/// notification events for the UI layer.
pub struct PermissionModule {
    http: Client,
    api: ApiEndpoint,
    auth: Arc<dyn AuthTokenProvider>,
    inner: Mutex<ModuleState>,
    tasks: Mutex<HashMap<TriggerKind, JoinHandle<()>>>,
    events: broadcast::Sender<ModuleEvent>,
}

impl PermissionModule {
    pub fn new(api: ApiEndpoint, auth: Arc<dyn AuthTokenProvider>) -> Arc<Self> {
        Self::with_state(api, auth, ModuleState::default())
    }

    pub fn from_settings(settings: &Settings, auth: Arc<dyn AuthTokenProvider>) -> Arc<Self> {
        let state = ModuleState {
            query: QueryState {
                limit: settings.page_limit,
                ..QueryState::default()
            },
            ..ModuleState::default()
        };
        Self::with_state(ApiEndpoint::new(settings.api_base_url.clone()), auth, state)
    }

    fn with_state(api: ApiEndpoint, auth: Arc<dyn AuthTokenProvider>, state: ModuleState) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            http: Client::new(),
            api,
            auth,
            inner: Mutex::new(state),
            tasks: Mutex::new(HashMap::new()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ModuleEvent> {
        self.events.subscribe()
    }

    pub async fn form(&self) -> FormState {
        self.inner.lock().await.form.clone()
    }

    pub async fn query_state(&self) -> QueryState {
        self.inner.lock().await.query.clone()
    }

    pub async fn permissions(&self) -> PermissionPage {
        self.inner.lock().await.permissions.clone()
    }

    pub async fn validation_errors(&self) -> ValidationErrors {
        self.inner.lock().await.validation_errors.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.lock().await.loading
    }

    pub async fn is_form_open(&self) -> bool {
        self.inner.lock().await.form_open
    }

    /// Opens the add view with a blank form.
    pub async fn open_create_form(&self) {
        let form = {
            let mut guard = self.inner.lock().await;
            guard.form = FormState::default();
            guard.validation_errors.clear();
            guard.form_open = true;
            guard.form.clone()
        };
        let _ = self.events.send(ModuleEvent::FormChanged(form));
    }

    /// Opens the edit view for an existing record. The field values are
    /// loaded by dispatching [`Trigger::GetPermissionById`] afterwards.
    pub async fn open_edit_form(&self, id: PermissionId) {
        let form = {
            let mut guard = self.inner.lock().await;
            guard.form = FormState {
                form_method: FormMethod::Put,
                update_id: Some(id),
                ..FormState::default()
            };
            guard.validation_errors.clear();
            guard.form_open = true;
            guard.form.clone()
        };
        let _ = self.events.send(ModuleEvent::FormChanged(form));
    }

    pub async fn change_field(&self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        let form = {
            let mut guard = self.inner.lock().await;
            match field {
                FormField::Resource => guard.form.resource = value,
                FormField::Description => guard.form.description = value,
                FormField::Method => guard.form.method = value,
                FormField::Path => guard.form.path = value,
            }
            guard.form.clone()
        };
        let _ = self.events.send(ModuleEvent::FormChanged(form));
    }

    pub async fn clear_form(&self) {
        {
            let mut guard = self.inner.lock().await;
            guard.form = FormState::default();
            guard.validation_errors.clear();
        }
        let _ = self.events.send(ModuleEvent::FormCleared);
    }

    pub async fn set_page(&self, page: i64) {
        let query = {
            let mut guard = self.inner.lock().await;
            guard.query.page = page;
            guard.query.clone()
        };
        let _ = self.events.send(ModuleEvent::QueryChanged(query));
    }

    pub async fn set_limit(&self, limit: i64) {
        let query = {
            let mut guard = self.inner.lock().await;
            guard.query.limit = limit;
            guard.query.clone()
        };
        let _ = self.events.send(ModuleEvent::QueryChanged(query));
    }

    pub async fn set_keywords(&self, keywords: Option<String>) {
        let query = {
            let mut guard = self.inner.lock().await;
            guard.query.keywords = keywords;
            guard.query.clone()
        };
        let _ = self.events.send(ModuleEvent::QueryChanged(query));
    }

    /// Starts the workflow for `trigger`, aborting any still-running handler
    /// of the same trigger kind first. Handlers of different kinds do not
    /// synchronize with each other.
    pub fn dispatch<'a>(
        self: &'a Arc<Self>,
        trigger: Trigger,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        let module = Arc::clone(self);
        Box::pin(async move {
            let kind = trigger.kind();
            let name = trigger.name();
            let mut tasks = module.tasks.lock().await;
            if let Some(previous) = tasks.remove(&kind) {
                previous.abort();
            }
            let handler_module = Arc::clone(&module);
            let task = tokio::spawn(async move {
                let result = match trigger {
                    Trigger::QueryPermissions => handler_module.handle_query().await,
                    Trigger::GetPermissionById => handler_module.handle_get_by_id().await,
                    Trigger::SubmitForm => handler_module.handle_submit().await,
                    Trigger::ValidateForm => handler_module.handle_validate().await,
                    Trigger::DeleteItemById { id } => handler_module.handle_delete(id).await,
                };
                if let Err(err) = result {
                    warn!(trigger = name, "workflow handler failed: {err}");
                    let _ = handler_module.events.send(ModuleEvent::Error(err.to_string()));
                }
            });
            tasks.insert(kind, task);
            debug!(trigger = name, "dispatched workflow trigger");
        })
    }

    async fn async_start(&self) {
        self.inner.lock().await.loading = true;
        let _ = self.events.send(ModuleEvent::LoadingChanged(true));
    }

    async fn async_end(&self) {
        self.inner.lock().await.loading = false;
        let _ = self.events.send(ModuleEvent::LoadingChanged(false));
    }

    fn notify(&self, notification: Notification) {
        let _ = self.events.send(ModuleEvent::Notification(notification));
    }

    async fn enter_validation_errors(&self, errors: ValidationErrors) {
        {
            let mut guard = self.inner.lock().await;
            guard.validation_errors = errors.clone();
        }
        let _ = self.events.send(ModuleEvent::ValidationFailed(errors));
    }

    /// List retrieval. Failures end the loading indicator without any
    /// user-facing message; the previously cached page stays untouched.
    async fn handle_query(&self) -> Result<()> {
        let token = self.auth.token().await?;
        let query = { self.inner.lock().await.query.clone() };
        let request = ListQuery {
            page: if query.page > 0 { query.page } else { 1 },
            limit: if query.limit > 0 { query.limit } else { 10 },
            keywords: query.keywords.filter(|keywords| !keywords.trim().is_empty()),
        };
        self.async_start().await;

        let result = async {
            let page: PermissionPage = self
                .http
                .get(self.api.permissions())
                .bearer_auth(&token)
                .query(&request)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            Ok::<_, anyhow::Error>(page)
        }
        .await;

        match result {
            Ok(page) => {
                {
                    let mut guard = self.inner.lock().await;
                    guard.permissions = page.clone();
                    guard.loading = false;
                }
                let _ = self.events.send(ModuleEvent::PermissionsAssigned(page));
                let _ = self.events.send(ModuleEvent::LoadingChanged(false));
            }
            Err(err) => {
                warn!("permission query failed: {err}");
                self.async_end().await;
            }
        }
        Ok(())
    }

    /// Loads the record behind `update_id` into the form for editing.
    /// Failures end the loading indicator silently, like the query workflow.
    async fn handle_get_by_id(&self) -> Result<()> {
        self.async_start().await;

        let result = async {
            let token = self.auth.token().await?;
            let id = self
                .inner
                .lock()
                .await
                .form
                .update_id
                .ok_or_else(|| anyhow!("no update id set for edit fetch"))?;
            let record: PermissionRecord = self
                .http
                .get(self.api.permission(id))
                .bearer_auth(&token)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            Ok::<_, anyhow::Error>(record)
        }
        .await;

        match result {
            Ok(record) => {
                let form = {
                    let mut guard = self.inner.lock().await;
                    guard.form.resource = record.resource;
                    guard.form.description = record.description;
                    guard.form.method = record.method;
                    guard.form.path = record.path;
                    guard.form.clone()
                };
                let _ = self.events.send(ModuleEvent::FormChanged(form));
                self.async_end().await;
            }
            Err(err) => {
                warn!("permission fetch failed: {err}");
                self.async_end().await;
            }
        }
        Ok(())
    }

    /// Client-side validation pass. Errors are stored and the submit is
    /// aborted; a clean form dispatches the submit trigger. The loading
    /// indicator stays on across the hand-off to submit.
    async fn handle_validate(self: &Arc<Self>) -> Result<()> {
        self.async_start().await;
        let form = { self.inner.lock().await.form.clone() };
        let errors = validate::validate_form(&form);
        if !errors.is_empty() {
            self.async_end().await;
            self.enter_validation_errors(errors).await;
            return Ok(());
        }
        self.dispatch(Trigger::SubmitForm).await;
        Ok(())
    }

    /// Create (POST) or update (PUT, id in the path) with the current form
    /// fields. A response carrying an `error` payload is stored as
    /// validation errors; success refreshes the list, closes and clears the
    /// form, and raises one success notification; transport failures raise
    /// the generic server-error notification.
    async fn handle_submit(self: &Arc<Self>) -> Result<()> {
        let form = { self.inner.lock().await.form.clone() };

        let request = match form.form_method {
            FormMethod::Post => self.http.post(self.api.permissions()),
            FormMethod::Put => {
                let Some(id) = form.update_id else {
                    let err = SubmitFormError::MissingUpdateId;
                    self.async_end().await;
                    warn!("submit aborted: {err}");
                    let _ = self.events.send(ModuleEvent::Error(err.to_string()));
                    return Ok(());
                };
                self.http.put(self.api.permission(id))
            }
        };
        let body = PermissionBody {
            resource: form.resource.clone(),
            description: form.description.clone(),
            method: form.method.clone(),
            path: form.path.clone(),
        };

        let result = async {
            let token = self.auth.token().await?;
            let outcome: SaveOutcome = request
                .bearer_auth(&token)
                .json(&body)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            Ok::<_, anyhow::Error>(outcome)
        }
        .await;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    form_method = form.form_method.as_str(),
                    "permission save failed: {err}"
                );
                self.async_end().await;
                self.notify(Notification::danger(messages::SERVER_ERROR));
                return Ok(());
            }
        };

        self.async_end().await;
        if let Some(errors) = outcome.error {
            self.enter_validation_errors(errors).await;
            return Ok(());
        }

        self.dispatch(Trigger::QueryPermissions).await;
        {
            let mut guard = self.inner.lock().await;
            guard.form_open = false;
            guard.form = FormState::default();
            guard.validation_errors.clear();
        }
        let _ = self.events.send(ModuleEvent::FormClosed);
        let _ = self.events.send(ModuleEvent::FormCleared);
        let message = match form.form_method {
            FormMethod::Put => messages::UPDATE_SUCCESS,
            FormMethod::Post => messages::ADD_SUCCESS,
        };
        self.notify(Notification::success(message));
        Ok(())
    }

    /// Removes one record. Success refreshes the list and notifies; failure
    /// only notifies. Confirmation is the calling UI's concern.
    async fn handle_delete(self: &Arc<Self>, id: PermissionId) -> Result<()> {
        self.async_start().await;

        let result = async {
            let token = self.auth.token().await?;
            self.http
                .delete(self.api.permission(id))
                .bearer_auth(&token)
                .send()
                .await?
                .error_for_status()?;
            Ok::<_, anyhow::Error>(())
        }
        .await;

        match result {
            Ok(()) => {
                self.dispatch(Trigger::QueryPermissions).await;
                self.async_end().await;
                self.notify(Notification::success(messages::DELETE_SUCCESS));
            }
            Err(err) => {
                warn!(permission_id = id.0, "permission delete failed: {err}");
                self.async_end().await;
                self.notify(Notification::danger(messages::DELETE_ERROR));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

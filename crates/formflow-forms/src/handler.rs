//! The create/update form workflow.
//!
//! [`FormHandler`] builds a form for an entity with the right method and
//! action, processes the submission (persisting new entities, flushing, and
//! recording a flash message), and reports validation errors as a nested
//! [`ErrorReport`].

use std::fmt;
use std::sync::Arc;

use http::Method;

use formflow_core::{FormflowError, FormflowResult, Settings, SETTINGS};
use formflow_db::{Entity, ObjectManager};
use formflow_flash::{FlashHandler, FlashLevel, FlashParams};
use formflow_http::{HttpRequest, RouteParams, UrlGenerator};

use crate::errors::{flatten, ErrorReport};
use crate::form::{Form, FormFactory};
use crate::messages::FormMessages;
use crate::options::{FormOptions, ResolvedFormOptions};

/// Drives a form through creation, submission, persistence, and feedback.
///
/// The handler holds no per-request state, so one instance can serve every
/// request.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use formflow_db::MemoryObjectManager;
/// use formflow_flash::FlashBag;
/// use formflow_forms::{FieldForm, FieldSpec, FormHandler, FormRegistry};
/// use formflow_http::Router;
///
/// let router = Router::new()
///     .route("article_new", "/articles/new")
///     .unwrap();
/// let registry = FormRegistry::new().register("article", |data, options| {
///     Ok(Box::new(
///         FieldForm::new("article", vec![FieldSpec::new("title").required()], options)
///             .with_initial(data),
///     ))
/// });
///
/// let handler = FormHandler::new(
///     Arc::new(registry),
///     Arc::new(MemoryObjectManager::new()),
///     Arc::new(router),
///     Arc::new(FlashBag::new()),
/// );
/// assert_eq!(handler.default_entity_name(), "Record");
/// ```
pub struct FormHandler {
    form_factory: Arc<dyn FormFactory>,
    object_manager: Arc<dyn ObjectManager>,
    url_generator: Arc<dyn UrlGenerator>,
    flash_handler: Arc<dyn FlashHandler>,
    default_entity_name: String,
}

impl FormHandler {
    /// Creates a handler from its collaborators.
    ///
    /// The fallback entity name comes from the global settings.
    pub fn new(
        form_factory: Arc<dyn FormFactory>,
        object_manager: Arc<dyn ObjectManager>,
        url_generator: Arc<dyn UrlGenerator>,
        flash_handler: Arc<dyn FlashHandler>,
    ) -> Self {
        Self {
            form_factory,
            object_manager,
            url_generator,
            flash_handler,
            default_entity_name: SETTINGS.get_or_default().default_entity_name.clone(),
        }
    }

    /// Applies the settings relevant to the workflow.
    #[must_use]
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.default_entity_name.clone_from(&settings.default_entity_name);
        self
    }

    /// Returns the entity name used in flash messages when a caller passes an
    /// empty one.
    pub fn default_entity_name(&self) -> &str {
        &self.default_entity_name
    }

    /// Creates the form for `entity` and binds `request` to it.
    ///
    /// The form is built from the entity's data and the options produced by
    /// [`build_form_options`](Self::build_form_options).
    pub fn get_form(
        &self,
        form_type: &str,
        entity: &dyn Entity,
        request: &HttpRequest,
        options: FormOptions,
    ) -> FormflowResult<Box<dyn Form>> {
        let options = self.build_form_options(entity, request, options)?;
        let data = entity.to_data()?;

        let mut form = self.create_form(form_type, data, options)?;
        form.handle_request(request);
        Ok(form)
    }

    /// Fills in the options the caller left unset.
    ///
    /// - `method`: `POST` for a new entity, `PUT` for an existing one.
    /// - `action`: the URL of the request's matched route, with the entity's
    ///   id as the `id` parameter when the entity exists.
    ///
    /// Caller-supplied values are kept as they are. A request without a
    /// matched route fails with [`FormflowError::MissingRoute`] unless the
    /// caller set the action.
    pub fn build_form_options(
        &self,
        entity: &dyn Entity,
        request: &HttpRequest,
        mut options: FormOptions,
    ) -> FormflowResult<ResolvedFormOptions> {
        let id = entity.id();

        if !options.has_method() {
            options.method = Some(if id.is_none() { Method::POST } else { Method::PUT });
        }

        if !options.has_action() {
            let route = request.route().ok_or(FormflowError::MissingRoute)?;
            let mut params = RouteParams::new();
            if let Some(id) = &id {
                params.insert("id".to_string(), id.to_string());
            }
            options.action = Some(Some(self.generate_url(route, &params)?));
        }

        let resolved = options.resolve();
        tracing::debug!(
            entity = entity.entity_type(),
            method = %resolved.method,
            action = resolved.action.as_deref().unwrap_or(""),
            "form options resolved"
        );
        Ok(resolved)
    }

    /// Processes a bound form.
    ///
    /// Returns `Ok(true)` once a submitted, valid form has been saved: a new
    /// entity is persisted, the object manager is flushed, and a success
    /// message is recorded. Returns `Ok(false)` when the form was not
    /// submitted (nothing happens) or did not validate (a warning is
    /// recorded).
    ///
    /// `object_manager` overrides the handler's own for this call. Persistence
    /// errors propagate and no message is recorded for them.
    ///
    /// `user_entity_name` fills the `%name%` parameter of the success message.
    /// Only an empty name is replaced: it falls back to
    /// [`default_entity_name`](Self::default_entity_name) rather than being
    /// passed through, so the message never renders with a blank name. Any
    /// other value, whitespace included, is used as given.
    pub async fn process_form(
        &self,
        form: &mut dyn Form,
        entity: &dyn Entity,
        user_entity_name: &str,
        object_manager: Option<&dyn ObjectManager>,
    ) -> FormflowResult<bool> {
        if !form.is_submitted() {
            tracing::debug!(form = form.name(), "form not submitted");
            return Ok(false);
        }

        if !form.is_valid().await {
            tracing::warn!(form = form.name(), "submitted form failed validation");
            self.flash_handler.add(
                FlashLevel::Warning,
                FormMessages::VALIDATION_ERRORS,
                &FlashParams::new(),
            );
            return Ok(false);
        }

        let object_manager = object_manager.unwrap_or(&*self.object_manager);
        let is_new = !object_manager.contains(entity);
        if is_new {
            object_manager.persist(entity)?;
        }
        object_manager.flush().await?;

        let name = if user_entity_name.is_empty() {
            self.default_entity_name.as_str()
        } else {
            user_entity_name
        };
        let key = if is_new {
            FormMessages::CREATED
        } else {
            FormMessages::UPDATED
        };
        let mut params = FlashParams::new();
        params.insert(FormMessages::NAME_PARAM.to_string(), name.to_string());
        self.flash_handler.add(FlashLevel::Success, key, &params);

        tracing::info!(
            form = form.name(),
            entity = entity.entity_type(),
            created = is_new,
            "entity saved"
        );
        Ok(true)
    }

    /// Returns the nested validation messages of `form`.
    pub fn get_form_errors(&self, form: &dyn Form) -> ErrorReport {
        flatten(&form.to_node())
    }

    fn create_form(
        &self,
        form_type: &str,
        data: serde_json::Value,
        options: ResolvedFormOptions,
    ) -> FormflowResult<Box<dyn Form>> {
        self.form_factory.create(form_type, data, options)
    }

    fn generate_url(&self, route: &str, params: &RouteParams) -> FormflowResult<String> {
        self.url_generator.generate(route, params)
    }
}

impl fmt::Debug for FormHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormHandler")
            .field("default_entity_name", &self.default_entity_name)
            .finish_non_exhaustive()
    }
}

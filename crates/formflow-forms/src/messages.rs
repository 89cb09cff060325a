//! Flash message keys recorded by the form workflow.

/// Message keys for the outcomes of [`FormHandler::process_form`](crate::FormHandler::process_form).
///
/// The keys resolve to text through a
/// [`MessageCatalog`](formflow_flash::MessageCatalog); the default templates
/// live in [`Settings::flash_messages`](formflow_core::Settings).
pub struct FormMessages;

impl FormMessages {
    /// An entity was created. Takes the `%name%` parameter.
    pub const CREATED: &'static str = "formflow.flash.created";
    /// An entity was updated. Takes the `%name%` parameter.
    pub const UPDATED: &'static str = "formflow.flash.updated";
    /// A submitted form did not validate.
    pub const VALIDATION_ERRORS: &'static str = "formflow.flash.validation_errors";

    /// The placeholder carrying the user-facing entity name.
    pub const NAME_PARAM: &'static str = "%name%";
}

//! Form session controller
//!
//! A [`FormSession`] owns the live values of one rendered form, keeps the
//! visible-field set in sync with them and drives submission:
//!
//! ```text
//! Idle --set_value--> Idle (visible set refreshed)
//! Idle --submit--> Validating --valid--> Submitting --done--> Idle
//!                             \-invalid-> Idle (error map filled)
//! ```
//!
//! The session is reusable for as long as the form is mounted.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::condition::{is_visible, visible_field_ids, VisibleFields};
use crate::config::{FormsConfig, RecomputeStrategy};
use crate::defaults::generate_default_values;
use crate::dependency::DependencyGraph;
use crate::error::{FormError, Result};
use crate::form::FormSchema;
use crate::validation::{FormValidator, ValidationErrors};
use crate::values::FormValues;

/// Where the session is in its submit cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Validating,
    Submitting,
}

/// Result of a submit attempt that did not fail outright
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Values passed validation; payload restricted to visible fields
    Submitted(FormValues),
    /// Validation failed; nothing was submitted
    Invalid(ValidationErrors),
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted(_))
    }
}

/// Live state of one form
#[derive(Debug)]
pub struct FormSession {
    schema: Arc<FormSchema>,
    validator: FormValidator,
    graph: DependencyGraph,
    recompute: RecomputeStrategy,
    initial: FormValues,
    values: FormValues,
    visible: VisibleFields,
    errors: BTreeMap<String, String>,
    state: SessionState,
}

impl FormSession {
    /// Start a session with default values, `overrides` taking precedence.
    ///
    /// Fails when the schema does not pass [`FormSchema::check`].
    pub fn new(schema: impl Into<Arc<FormSchema>>, overrides: Option<&FormValues>, config: &FormsConfig) -> Result<Self> {
        let schema = schema.into();
        schema.check()?;
        let validator = FormValidator::build(&schema.fields, None, &config.validation)?;
        let graph = schema.dependency_graph();
        let initial = generate_default_values(&schema.fields, overrides);
        let visible = visible_field_ids(&schema.fields, &initial);

        tracing::debug!(form = %schema.id, visible = visible.len(), "form session started");

        Ok(Self {
            schema,
            validator,
            graph,
            recompute: config.session.recompute,
            values: initial.clone(),
            initial,
            visible,
            errors: BTreeMap::new(),
            state: SessionState::Idle,
        })
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    /// The unrestricted validator built at session start
    pub fn validator(&self) -> &FormValidator {
        &self.validator
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, field_id: &str) -> Option<&Value> {
        self.values.get(field_id)
    }

    /// Change one field and refresh the visible set
    pub fn set_value(&mut self, field_id: &str, value: impl Into<Value>) -> Result<()> {
        if self.schema.field(field_id).is_none() {
            return Err(FormError::UnknownField(field_id.to_string()));
        }
        self.values.insert(field_id.to_string(), value.into());

        match self.recompute {
            RecomputeStrategy::Full => self.refresh_visible(),
            RecomputeStrategy::Incremental => {
                for id in self.graph.affected_by(field_id) {
                    let shown = self.schema.field(&id).is_some_and(|f| is_visible(f, &self.values));
                    if shown {
                        self.visible.insert(id);
                    } else {
                        self.visible.remove(&id);
                    }
                }
            }
        }

        tracing::debug!(field = field_id, visible = self.visible.len(), "field value changed");
        Ok(())
    }

    /// Replace several values at once; keys not in the schema are kept but
    /// never submitted
    pub fn set_values(&mut self, values: &FormValues) {
        for (key, value) in values {
            self.values.insert(key.clone(), value.clone());
        }
        self.refresh_visible();
    }

    fn refresh_visible(&mut self) {
        self.visible = visible_field_ids(&self.schema.fields, &self.values);
    }

    /// Whether a field is shown for the current values. Unknown ids are not.
    pub fn is_field_visible(&self, field_id: &str) -> bool {
        self.schema
            .field(field_id)
            .is_some_and(|f| is_visible(f, &self.values))
    }

    pub fn visible_field_ids(&self) -> &VisibleFields {
        &self.visible
    }

    /// Per-field messages from the last validation
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == SessionState::Submitting
    }

    /// Validate the current values against the visible set.
    ///
    /// On success returns the typed values of visible fields only.
    pub fn validate(&mut self) -> std::result::Result<FormValues, ValidationErrors> {
        let validator = self.validator.restrict_to(&self.visible);
        match validator.validate(&self.values) {
            Ok(mut typed) => {
                self.errors.clear();
                typed.retain(|key, _| self.visible.contains(key));
                Ok(typed)
            }
            Err(errors) => {
                self.errors = errors.to_map();
                Err(errors)
            }
        }
    }

    /// First half of a submission: validate and, when valid, enter
    /// [`SessionState::Submitting`]. Pair with [`FormSession::finish_submit`].
    pub fn begin_submit(&mut self) -> Result<SubmitOutcome> {
        if self.state == SessionState::Submitting {
            return Err(FormError::SubmitInProgress);
        }

        self.state = SessionState::Validating;
        match self.validate() {
            Ok(payload) => {
                self.state = SessionState::Submitting;
                Ok(SubmitOutcome::Submitted(payload))
            }
            Err(errors) => {
                tracing::debug!(form = %self.schema.id, errors = errors.len(), "submission rejected by validation");
                self.state = SessionState::Idle;
                Ok(SubmitOutcome::Invalid(errors))
            }
        }
    }

    /// Return to idle after the submit callback settled
    pub fn finish_submit(&mut self) {
        self.state = SessionState::Idle;
    }

    /// Validate, then hand the visible values to `on_submit`.
    ///
    /// A failing callback is returned as [`FormError::Submit`]. The session
    /// is idle again either way, including when this future is dropped
    /// before the callback settles.
    pub async fn submit<F, Fut>(&mut self, on_submit: F) -> Result<SubmitOutcome>
    where
        F: FnOnce(FormValues) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let payload = match self.begin_submit()? {
            SubmitOutcome::Submitted(payload) => payload,
            invalid => return Ok(invalid),
        };

        let result = {
            let _idle = IdleOnDrop(&mut self.state);
            on_submit(payload.clone()).await
        };

        match result {
            Ok(()) => {
                tracing::debug!(form = %self.schema.id, fields = payload.len(), "form submitted");
                Ok(SubmitOutcome::Submitted(payload))
            }
            Err(e) => {
                tracing::warn!(form = %self.schema.id, error = %e, "form submission failed");
                Err(FormError::Submit(e))
            }
        }
    }

    /// Restore the initial values and clear errors
    pub fn reset(&mut self) {
        self.values = self.initial.clone();
        self.errors.clear();
        self.state = SessionState::Idle;
        self.refresh_visible();
    }
}

/// Puts the session back to idle when the submit callback settles or its
/// future is dropped
struct IdleOnDrop<'a>(&'a mut SessionState);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        *self.0 = SessionState::Idle;
    }
}

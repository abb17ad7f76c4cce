use std::sync::Arc;

use shared::{
    domain::{calendar_date, Elector},
    error::ValidationError,
    protocol::CreateElectorRequest,
};
use tracing::warn;

use super::{describe_failure, FailureContext, PanelEvent, PanelStatus, UpdateNotifier};
use crate::{error::GatewayError, registry::ElectorRegistry};

/// Raw form input for a new elector, as typed by the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElectorForm {
    pub last_name: String,
    pub first_name: String,
    pub date_of_birth: String,
    pub secure_identifier: String,
}

impl ElectorForm {
    /// Every field is required; the birth date is normalized to `YYYY-MM-DD`.
    pub fn validate(&self) -> Result<CreateElectorRequest, ValidationError> {
        let last_name = required("last name", &self.last_name)?;
        let first_name = required("first name", &self.first_name)?;
        let raw_date = required("date of birth", &self.date_of_birth)?;
        let secure_identifier = required("secure identifier", &self.secure_identifier)?;

        let date_of_birth =
            calendar_date::parse(&raw_date).ok_or_else(|| ValidationError::InvalidDate {
                field: "date of birth",
                value: raw_date.clone(),
            })?;

        Ok(CreateElectorRequest {
            last_name,
            first_name,
            date_of_birth: Some(date_of_birth),
            secure_identifier,
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(value.to_string())
}

pub struct ElectorsController {
    registry: Arc<dyn ElectorRegistry>,
    notifier: UpdateNotifier,
    electors: Vec<Elector>,
    status: PanelStatus,
}

impl ElectorsController {
    pub fn new(registry: Arc<dyn ElectorRegistry>, notifier: UpdateNotifier) -> Self {
        Self {
            registry,
            notifier,
            electors: Vec::new(),
            status: PanelStatus::Idle,
        }
    }

    /// Creates the controller and issues its initial load.
    pub async fn mount(registry: Arc<dyn ElectorRegistry>, notifier: UpdateNotifier) -> Self {
        let mut controller = Self::new(registry, notifier);
        controller.load().await;
        controller
    }

    pub fn electors(&self) -> &[Elector] {
        &self.electors
    }

    pub fn status(&self) -> &PanelStatus {
        &self.status
    }

    pub async fn load(&mut self) {
        self.status = PanelStatus::Loading;
        match self.registry.list_electors().await {
            Ok(electors) => {
                self.electors = electors;
                self.status = PanelStatus::Ready;
            }
            Err(err) => self.fail(FailureContext::LoadElectors, &err),
        }
    }

    /// Submits the form. On success the list is reloaded and the parent
    /// notified; on failure the error is kept and the current list stays.
    pub async fn create_elector(&mut self, form: &ElectorForm) -> Option<Elector> {
        let request = match form.validate() {
            Ok(request) => request,
            Err(err) => {
                self.fail(FailureContext::CreateElector, &GatewayError::from(err));
                return None;
            }
        };

        match self.registry.create_elector(&request).await {
            Ok(created) => {
                self.load().await;
                self.notifier.notify(PanelEvent::ElectorCreated);
                Some(created)
            }
            Err(err) => {
                self.fail(FailureContext::CreateElector, &err);
                None
            }
        }
    }

    fn fail(&mut self, context: FailureContext, err: &GatewayError) {
        warn!(?context, "electors panel: {err}");
        self.status = PanelStatus::Error(describe_failure(context, err));
    }
}

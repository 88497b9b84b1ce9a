use crate::config::Settings;
use crate::portal::types::{ComputeType, JobObject, MachineImage};
use crate::portal::{PortalClient, PortalError};
use crate::wizard::state::WizardState;
use chrono::Local;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    Uninitialized,
    Initializing,
    Ready,
    Validating,
    Advanced,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Description,
    Toolbox,
    Resources,
    EmailNotification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Advanced,
    Rejected,
}

/// A queued popup for the host UI to render. The step never draws anything
/// itself; it records what should be shown and the front end drains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub detail: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("failed to load job {job_id}: {source}")]
    LoadException {
        job_id: i64,
        #[source]
        source: PortalError,
    },
    #[error("compute type `{0}` is not present in the loaded resource list")]
    LookupFailure(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
struct CarriedFields {
    id: Option<i64>,
    storage_provider: Option<String>,
    storage_endpoint: Option<String>,
    registered_url: Option<String>,
    vm_subset_file_path: Option<String>,
    vm_subset_url: Option<String>,
}

pub struct HelpInstruction {
    pub field: FormField,
    pub title: &'static str,
    pub description: &'static str,
}

/// The job-details wizard step. Collects name, description, toolbox,
/// compute resources and notification preference, persists them through the
/// portal and records the selections later steps depend on into
/// [`WizardState`].
pub struct JobObjectForm {
    client: PortalClient,
    compute_service_id: String,
    storage_service_id: String,

    name: String,
    description: String,
    email_notification: bool,
    compute_vm_id: Option<String>,
    toolbox_display: Option<String>,
    compute_type_id: Option<String>,
    carried: CarriedFields,

    images: Vec<MachineImage>,
    compute_types: Vec<ComputeType>,

    invalid: Vec<FormField>,
    notices: Vec<Notice>,
    phase: StepPhase,
}

impl JobObjectForm {
    /// Creates the step, fires the series creation for this wizard session
    /// and preloads the toolbox list. Neither failure blocks the step; both
    /// surface as notices.
    pub fn new(client: PortalClient, settings: &Settings, state: &mut WizardState) -> Self {
        let mut form = Self {
            client,
            compute_service_id: settings.compute_service_id.clone(),
            storage_service_id: settings.storage_service_id.clone(),
            name: format!("VGL Job - {}", Local::now().format("%Y-%m-%d %H:%M")),
            description: String::new(),
            email_notification: true,
            compute_vm_id: None,
            toolbox_display: None,
            compute_type_id: None,
            carried: CarriedFields::default(),
            images: Vec::new(),
            compute_types: Vec::new(),
            invalid: Vec::new(),
            notices: Vec::new(),
            phase: StepPhase::Uninitialized,
        };
        form.create_series(state);
        form.fetch_images();
        form
    }

    pub fn title(&self) -> &'static str {
        "Enter job details..."
    }

    fn create_series(&mut self, state: &mut WizardState) {
        match self.client.create_series() {
            Ok(series_id) => {
                state.set_series_id(series_id);
            }
            Err(PortalError::Application { msg, debug_info }) => {
                self.notices.push(Notice {
                    title: "Create new series".to_string(),
                    message: msg,
                    detail: debug_info,
                });
            }
            Err(_) => {
                self.notices.push(Notice {
                    title: "Create new series".to_string(),
                    message: "There was an internal error saving your series.".to_string(),
                    detail: Some(
                        "Please try again in a few minutes or report this error to the portal administrators."
                            .to_string(),
                    ),
                });
            }
        }
    }

    fn fetch_images(&mut self) {
        match self.client.vm_images(&self.compute_service_id) {
            Ok(images) => self.images = images,
            Err(err) => {
                self.images.clear();
                self.notices.push(Notice {
                    title: "Loading toolboxes".to_string(),
                    message: "Unable to load the toolbox list. Select a different compute location or try again."
                        .to_string(),
                    detail: Some(err.to_string()),
                });
            }
        }
    }

    /// Reloads the toolbox list, dropping both the toolbox and resource
    /// selections first.
    pub fn load_images(&mut self) {
        self.compute_vm_id = None;
        self.toolbox_display = None;
        self.compute_type_id = None;
        self.fetch_images();
    }

    /// Called when the wizard shows this step. Navigating back onto the step
    /// with a job already persisted reloads that job into the form; a fetch
    /// failure is fatal to the step's initialization.
    pub fn activate(&mut self, state: &mut WizardState) -> Result<(), StepError> {
        self.phase = StepPhase::Initializing;
        let Some(job_id) = state.job_id() else {
            // No job yet; one will be created on the first successful save.
            self.phase = StepPhase::Ready;
            return Ok(());
        };
        match self.client.get_job(job_id) {
            Ok(job) => {
                if let Some(id) = job.id {
                    state.set_job_id(id);
                }
                self.apply_job(job);
                self.phase = StepPhase::Ready;
                Ok(())
            }
            Err(source) => Err(StepError::LoadException { job_id, source }),
        }
    }

    fn apply_job(&mut self, job: JobObject) {
        self.name = job.name;
        self.description = job.description;
        self.email_notification = job.email_notification;
        self.compute_vm_id = Some(job.compute_vm_id).filter(|v| !v.is_empty());
        // The stored image id may no longer appear in the loaded image list;
        // fall back to showing the raw id.
        self.toolbox_display = self.compute_vm_id.as_ref().map(|vm_id| {
            self.images
                .iter()
                .find(|image| image.image_id == *vm_id)
                .map(|image| image.name.clone())
                .unwrap_or_else(|| vm_id.clone())
        });
        self.compute_type_id = Some(job.compute_type_id).filter(|v| !v.is_empty());
        self.carried = CarriedFields {
            id: job.id,
            storage_provider: job.storage_provider,
            storage_endpoint: job.storage_endpoint,
            registered_url: job.registered_url,
            vm_subset_file_path: job.vm_subset_file_path,
            vm_subset_url: job.vm_subset_url,
        };
    }

    /// Toolbox selection cascade. `None` (deselect) drops the toolbox
    /// selection and empties the resource list without touching the network,
    /// so a later submit fails local validation instead of persisting a
    /// phantom selection; choosing an image drops the current resource choice
    /// and reloads the resource list scoped to the image.
    pub fn select_image(&mut self, selection: Option<usize>) {
        let Some(index) = selection else {
            self.compute_vm_id = None;
            self.toolbox_display = None;
            self.compute_type_id = None;
            self.compute_types.clear();
            return;
        };
        let Some(image) = self.images.get(index) else {
            return;
        };
        self.compute_vm_id = Some(image.image_id.clone());
        self.toolbox_display = Some(image.name.clone());
        self.compute_type_id = None;
        match self
            .client
            .vm_types(&self.compute_service_id, &image.image_id)
        {
            Ok(types) => self.compute_types = types,
            Err(err) => {
                self.compute_types.clear();
                self.notices.push(Notice {
                    title: "Loading resources".to_string(),
                    message: "Unable to load resource configurations for the selected toolbox."
                        .to_string(),
                    detail: Some(err.to_string()),
                });
            }
        }
    }

    pub fn select_compute_type(&mut self, index: usize) {
        if let Some(compute_type) = self.compute_types.get(index) {
            self.compute_type_id = Some(compute_type.id.clone());
        }
    }

    pub fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn set_description(&mut self, description: String) {
        self.description = description;
    }

    pub fn toggle_email_notification(&mut self) {
        self.email_notification = !self.email_notification;
    }

    fn form_values(&self) -> JobObject {
        JobObject {
            id: self.carried.id,
            name: self.name.clone(),
            description: self.description.clone(),
            compute_service_id: self.compute_service_id.clone(),
            storage_service_id: self.storage_service_id.clone(),
            compute_vm_id: self.compute_vm_id.clone().unwrap_or_default(),
            compute_type_id: self.compute_type_id.clone().unwrap_or_default(),
            email_notification: self.email_notification,
            storage_provider: self.carried.storage_provider.clone(),
            storage_endpoint: self.carried.storage_endpoint.clone(),
            registered_url: self.carried.registered_url.clone(),
            vm_subset_file_path: self.carried.vm_subset_file_path.clone(),
            vm_subset_url: self.carried.vm_subset_url.clone(),
        }
    }

    /// Runs the full validation sequence. `confirm` answers the yes/no
    /// missing-data question when it is needed; it is not called otherwise.
    ///
    /// A rejected validation leaves prior writes (including a job id from an
    /// earlier successful save) in place so the user resumes where they left
    /// off.
    pub fn validate(
        &mut self,
        state: &mut WizardState,
        confirm: &mut dyn FnMut(&str) -> bool,
    ) -> Result<Outcome, StepError> {
        self.phase = StepPhase::Validating;

        let num_download_requests = match self.client.num_download_requests() {
            Ok(count) => count,
            Err(err) => {
                self.notices.push(Notice {
                    title: "Checking captured data".to_string(),
                    message:
                        "There was an unexpected error when checking this session's captured data. Please try again in a few minutes."
                            .to_string(),
                    detail: Some(err.to_string()),
                });
                self.phase = StepPhase::Rejected;
                return Ok(Outcome::Rejected);
            }
        };

        // Local validation never reaches the network and never shows a
        // dialog; the highlighted fields are the only feedback.
        self.invalid.clear();
        if self.compute_vm_id.is_none() {
            self.invalid.push(FormField::Toolbox);
        }
        if self.compute_type_id.is_none() {
            self.invalid.push(FormField::Resources);
        }
        let (Some(toolbox_display), Some(compute_type_id)) =
            (self.toolbox_display.clone(), self.compute_type_id.clone())
        else {
            self.phase = StepPhase::Rejected;
            return Ok(Outcome::Rejected);
        };

        let job_id = match self
            .client
            .update_or_create_job(&self.form_values(), state.series_id())
        {
            Ok(job_id) => job_id,
            Err(PortalError::Application { msg, debug_info }) => {
                let detail = match debug_info {
                    Some(debug_info) => format!("{msg}\n{debug_info}"),
                    None => msg,
                };
                self.notices.push(Notice {
                    title: "Error saving details".to_string(),
                    message:
                        "There was an unexpected error when attempting to save the details on this form."
                            .to_string(),
                    detail: Some(detail),
                });
                self.phase = StepPhase::Rejected;
                return Ok(Outcome::Rejected);
            }
            Err(_) => {
                self.notices.push(Notice {
                    title: "Error saving details".to_string(),
                    message:
                        "There was an unexpected error when attempting to save the details on this form. Please try again in a few minutes."
                            .to_string(),
                    detail: None,
                });
                self.phase = StepPhase::Rejected;
                return Ok(Outcome::Rejected);
            }
        };

        self.carried.id = Some(job_id);
        state.set_job_id(job_id);
        // The selected toolbox drives which script templates the next step
        // offers; the resource numbers bound the generated scripts.
        state.set_toolbox(toolbox_display);
        let Some(compute_type) = self
            .compute_types
            .iter()
            .find(|candidate| candidate.id == compute_type_id)
        else {
            self.phase = StepPhase::Rejected;
            return Err(StepError::LookupFailure(compute_type_id));
        };
        state.set_resources(compute_type.vcpus, compute_type.ram_mb);

        if num_download_requests == 0 && !state.skip_confirm_popup() {
            if confirm("No data set has been captured. Do you want to continue?") {
                state.set_skip_confirm_popup();
                self.phase = StepPhase::Advanced;
                Ok(Outcome::Advanced)
            } else {
                self.phase = StepPhase::Rejected;
                Ok(Outcome::Rejected)
            }
        } else {
            self.phase = StepPhase::Advanced;
            Ok(Outcome::Advanced)
        }
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn email_notification(&self) -> bool {
        self.email_notification
    }

    pub fn toolbox_display(&self) -> Option<&str> {
        self.toolbox_display.as_deref()
    }

    pub fn compute_type_display(&self) -> Option<&str> {
        let compute_type_id = self.compute_type_id.as_deref()?;
        match self
            .compute_types
            .iter()
            .find(|candidate| candidate.id == compute_type_id)
        {
            Some(compute_type) => Some(&compute_type.long_description),
            None => Some(compute_type_id),
        }
    }

    pub fn images(&self) -> &[MachineImage] {
        &self.images
    }

    pub fn compute_types(&self) -> &[ComputeType] {
        &self.compute_types
    }

    pub fn invalid_fields(&self) -> &[FormField] {
        &self.invalid
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn has_notices(&self) -> bool {
        !self.notices.is_empty()
    }

    pub fn help_instructions() -> [HelpInstruction; 5] {
        [
            HelpInstruction {
                field: FormField::Name,
                title: "Name your job",
                description: "Every job requires a name. Names don't have to be unique but it's recommended you choose something meaningful as it will be the primary way to identify this job in the future.",
            },
            HelpInstruction {
                field: FormField::Description,
                title: "Describe your job",
                description: "Enter an optional description for your job here.",
            },
            HelpInstruction {
                field: FormField::Toolbox,
                title: "Toolbox",
                description: "A toolbox is a collection of software packages that will be made available to your job when it starts processing. Some toolboxes are restricted to authorised users for licensing reasons.",
            },
            HelpInstruction {
                field: FormField::Resources,
                title: "Resources",
                description: "Select the compute resources your job will run with. The CPU and memory numbers of the chosen configuration bound what your processing scripts can use.",
            },
            HelpInstruction {
                field: FormField::EmailNotification,
                title: "Job completion email notification",
                description: "An email notification will be sent to your address upon job completion. Untick the checkbox if you don't want to receive it.",
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Construction against an unroutable portal: both startup requests fail
    // softly and the step stays usable.
    fn offline_form(state: &mut WizardState) -> JobObjectForm {
        let settings = Settings::default();
        JobObjectForm::new(PortalClient::new("http://127.0.0.1:9"), &settings, state)
    }

    #[test]
    fn startup_failures_are_notices_not_errors() {
        let mut state = WizardState::default();
        let mut form = offline_form(&mut state);
        assert_eq!(form.phase(), StepPhase::Uninitialized);
        let notices = form.take_notices();
        assert!(notices.iter().any(|n| n.title == "Create new series"));
        assert!(state.series_id().is_none());
        assert!(!form.has_notices());
    }

    #[test]
    fn default_values_match_a_fresh_job() {
        let mut state = WizardState::default();
        let form = offline_form(&mut state);
        assert!(form.name().starts_with("VGL Job - "));
        assert!(form.description().is_empty());
        assert!(form.email_notification());
        assert!(form.toolbox_display().is_none());
    }

    #[test]
    fn activation_without_job_id_is_a_no_op() {
        let mut state = WizardState::default();
        let mut form = offline_form(&mut state);
        form.activate(&mut state).expect("activate fresh step");
        assert_eq!(form.phase(), StepPhase::Ready);
    }

    #[test]
    fn deselecting_image_clears_selection_without_network() {
        let mut state = WizardState::default();
        let mut form = offline_form(&mut state);
        form.take_notices();
        form.select_image(None);
        assert!(form.compute_types().is_empty());
        assert!(form.toolbox_display().is_none());
        // No network attempt, so no new failure notice either.
        assert!(!form.has_notices());
    }

    #[test]
    fn help_instructions_cover_every_visible_field() {
        let help = JobObjectForm::help_instructions();
        for field in [
            FormField::Name,
            FormField::Description,
            FormField::Toolbox,
            FormField::Resources,
            FormField::EmailNotification,
        ] {
            assert!(
                help.iter().any(|h| h.field == field),
                "missing help for {field:?}"
            );
        }
        assert!(help.iter().all(|h| !h.description.is_empty()));
    }
}

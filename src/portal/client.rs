use super::types::{ComputeType, CountEnvelope, Envelope, IdRecord, JobObject, MachineImage};
use super::PortalError;
use serde::Deserialize;

/// Blocking client for the portal's job-wizard endpoints. Each call is a
/// single request with a single completion; callers sequence them explicitly.
#[derive(Debug, Clone)]
pub struct PortalClient {
    base_url: String,
}

impl PortalClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, PortalError> {
        let mut url = self.endpoint(path);
        if !query.is_empty() {
            let encoded = query
                .iter()
                .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&");
            url = format!("{url}?{encoded}");
        }

        let response = ureq::get(&url)
            .call()
            .map_err(|e| PortalError::Transport(e.to_string()))?;
        response
            .into_json::<T>()
            .map_err(|e| PortalError::Decode(e.to_string()))
    }

    fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<T, PortalError> {
        let url = self.endpoint(path);
        let pairs: Vec<(&str, &str)> = form.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let response = ureq::post(&url)
            .send_form(&pairs)
            .map_err(|e| PortalError::Transport(e.to_string()))?;
        response
            .into_json::<T>()
            .map_err(|e| PortalError::Decode(e.to_string()))
    }

    fn require_success<T>(
        envelope: Envelope<T>,
        context: &'static str,
    ) -> Result<Vec<T>, PortalError> {
        if !envelope.success {
            return Err(PortalError::Application {
                msg: envelope.msg.unwrap_or_else(|| format!("{context} failed")),
                debug_info: envelope.debug_info,
            });
        }
        Ok(envelope.data)
    }

    /// Creates the grouping record jobs are filed under. One per wizard
    /// session; failure is non-fatal to the wizard itself.
    pub fn create_series(&self) -> Result<i64, PortalError> {
        let envelope: Envelope<IdRecord> = self.get("secure/createSeries.do", &[])?;
        let data = Self::require_success(envelope, "createSeries")?;
        data.first()
            .map(|record| record.id)
            .ok_or(PortalError::MissingData("createSeries.do"))
    }

    pub fn get_job(&self, job_id: i64) -> Result<JobObject, PortalError> {
        let envelope: Envelope<JobObject> =
            self.get("getJobObject.do", &[("jobId", job_id.to_string())])?;
        let mut data = Self::require_success(envelope, "getJobObject")?;
        if data.is_empty() {
            return Err(PortalError::MissingData("getJobObject.do"));
        }
        Ok(data.remove(0))
    }

    /// Upserts the job record and returns the persisted id.
    pub fn update_or_create_job(
        &self,
        job: &JobObject,
        series_id: Option<i64>,
    ) -> Result<i64, PortalError> {
        let mut form: Vec<(&str, String)> = Vec::new();
        if let Some(id) = job.id {
            form.push(("id", id.to_string()));
        }
        if let Some(series_id) = series_id {
            form.push(("seriesId", series_id.to_string()));
        }
        form.push(("name", job.name.clone()));
        form.push(("description", job.description.clone()));
        form.push(("computeServiceId", job.compute_service_id.clone()));
        form.push(("storageServiceId", job.storage_service_id.clone()));
        form.push(("computeVmId", job.compute_vm_id.clone()));
        form.push(("computeTypeId", job.compute_type_id.clone()));
        form.push(("emailNotification", job.email_notification.to_string()));
        for (key, value) in [
            ("storageProvider", &job.storage_provider),
            ("storageEndpoint", &job.storage_endpoint),
            ("registeredUrl", &job.registered_url),
            ("vmSubsetFilePath", &job.vm_subset_file_path),
            ("vmSubsetUrl", &job.vm_subset_url),
        ] {
            if let Some(value) = value {
                form.push((key, value.clone()));
            }
        }

        let envelope: Envelope<IdRecord> = self.post_form("updateOrCreateJob.do", &form)?;
        let data = Self::require_success(envelope, "updateOrCreateJob")?;
        data.first()
            .map(|record| record.id)
            .ok_or(PortalError::MissingData("updateOrCreateJob.do"))
    }

    pub fn vm_images(&self, compute_service_id: &str) -> Result<Vec<MachineImage>, PortalError> {
        let envelope: Envelope<MachineImage> = self.get(
            "getVmImagesForComputeService.do",
            &[("computeServiceId", compute_service_id.to_string())],
        )?;
        Self::require_success(envelope, "getVmImagesForComputeService")
    }

    pub fn vm_types(
        &self,
        compute_service_id: &str,
        machine_image_id: &str,
    ) -> Result<Vec<ComputeType>, PortalError> {
        let envelope: Envelope<ComputeType> = self.get(
            "getVmTypesForComputeService.do",
            &[
                ("computeServiceId", compute_service_id.to_string()),
                ("machineImageId", machine_image_id.to_string()),
            ],
        )?;
        Self::require_success(envelope, "getVmTypesForComputeService")
    }

    /// Count of download requests captured earlier in the session. The
    /// validation flow awaits this before deciding whether to warn about a
    /// missing data set.
    pub fn num_download_requests(&self) -> Result<u64, PortalError> {
        let envelope: CountEnvelope = self.get("getNumDownloadRequests.do", &[])?;
        Ok(envelope.data)
    }
}

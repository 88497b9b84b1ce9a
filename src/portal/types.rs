use serde::{Deserialize, Serialize};

/// Standard portal response envelope: `{success, data: [...], msg?, debugInfo?}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    // An explicit default path keeps serde from requiring `T: Default`.
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default, rename = "debugInfo")]
    pub debug_info: Option<String>,
}

/// `getNumDownloadRequests.do` is the one endpoint whose `data` is a bare
/// integer rather than an array of records.
#[derive(Debug, Clone, Deserialize)]
pub struct CountEnvelope {
    pub data: u64,
}

/// Records that only matter for the `id` they carry back from an upsert.
#[derive(Debug, Clone, Deserialize)]
pub struct IdRecord {
    pub id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobObject {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub compute_service_id: String,
    pub storage_service_id: String,
    pub compute_vm_id: String,
    pub compute_type_id: String,
    pub email_notification: bool,
    // Pass-through fields owned by the backend; carried so a resubmission
    // does not wipe them.
    pub storage_provider: Option<String>,
    pub storage_endpoint: Option<String>,
    pub registered_url: Option<String>,
    pub vm_subset_file_path: Option<String>,
    pub vm_subset_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineImage {
    pub id: i64,
    pub image_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeType {
    pub id: String,
    pub vcpus: u32,
    #[serde(rename = "ramMB")]
    pub ram_mb: u64,
    pub long_description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_defaults_optional_fields() {
        let envelope: Envelope<IdRecord> =
            serde_json::from_str(r#"{"success":true,"data":[{"id":42}]}"#).expect("decode");
        assert!(envelope.success);
        assert_eq!(envelope.data[0].id, 42);
        assert!(envelope.msg.is_none());
        assert!(envelope.debug_info.is_none());
    }

    #[test]
    fn envelope_failure_carries_msg_and_debug_info() {
        let envelope: Envelope<IdRecord> = serde_json::from_str(
            r#"{"success":false,"msg":"series exists","debugInfo":"duplicate row"}"#,
        )
        .expect("decode");
        assert!(!envelope.success);
        assert!(envelope.data.is_empty());
        assert_eq!(envelope.msg.as_deref(), Some("series exists"));
        assert_eq!(envelope.debug_info.as_deref(), Some("duplicate row"));
    }

    #[test]
    fn envelope_data_defaults_for_records_without_defaults() {
        // Failure envelopes omit `data` entirely; the record types inside the
        // envelope carry no Default of their own.
        let envelope: Envelope<ComputeType> =
            serde_json::from_str(r#"{"success":false,"msg":"no types"}"#).expect("decode");
        assert!(envelope.data.is_empty());
        let envelope: Envelope<MachineImage> =
            serde_json::from_str(r#"{"success":false}"#).expect("decode");
        assert!(envelope.data.is_empty());
    }

    #[test]
    fn count_envelope_reads_bare_integer_data() {
        let envelope: CountEnvelope =
            serde_json::from_str(r#"{"success":true,"data":3}"#).expect("decode");
        assert_eq!(envelope.data, 3);
    }

    #[test]
    fn compute_type_uses_wire_field_names() {
        let compute_type: ComputeType = serde_json::from_str(
            r#"{"id":"m1.large","vcpus":4,"ramMB":16384,"longDescription":"4 vCPUs / 16GB"}"#,
        )
        .expect("decode");
        assert_eq!(compute_type.vcpus, 4);
        assert_eq!(compute_type.ram_mb, 16384);
    }

    #[test]
    fn job_object_round_trips_camel_case() {
        let job: JobObject = serde_json::from_str(
            r#"{"id":7,"name":"n","description":"d","computeServiceId":"aws-ec2-compute",
                "storageServiceId":"amazon-aws-storage-sydney","computeVmId":"ami-1",
                "computeTypeId":"m1.small","emailNotification":true,
                "storageProvider":"swift"}"#,
        )
        .expect("decode");
        assert_eq!(job.id, Some(7));
        assert_eq!(job.compute_vm_id, "ami-1");
        assert_eq!(job.storage_provider.as_deref(), Some("swift"));
        let value = serde_json::to_value(&job).expect("encode");
        assert_eq!(value["computeTypeId"], "m1.small");
    }
}

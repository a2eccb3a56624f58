use crate::error::{Error, Result};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use json_patch::Patch;
use serde::{Deserialize, Serialize};

pub const ADMISSION_API_VERSION: &str = "admission.k8s.io/v1";
pub const JSON_PATCH_TYPE: &str = "JSONPatch";

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AdmissionReview<T> {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub request: Option<AdmissionRequest<T>>,
    pub response: Option<AdmissionResponse>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupVersionResource {
    #[serde(default)]
    pub group: String,
    pub version: String,
    pub resource: String,
}

impl GroupVersionResource {
    pub fn new(group: &str, version: &str, resource: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            resource: resource.to_string(),
        }
    }
}

/// Request half of an admission review. The object is kept undecoded until the
/// resource kind is known.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRequest<T> {
    pub uid: String,
    pub resource: GroupVersionResource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub operation: String,
    pub object: Option<T>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    pub uid: String,
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// Base64 encoded JSON Patch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_type: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub message: String,
}

impl AdmissionResponse {
    pub fn allow(uid: String) -> Self {
        Self {
            uid,
            allowed: true,
            status: None,
            patch: None,
            patch_type: None,
        }
    }

    pub fn deny(uid: String, message: impl Into<String>) -> Self {
        Self {
            allowed: false,
            ..Self::allow(uid).with_message(message)
        }
    }

    /// Attach a diagnostic message without changing the admission decision.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.status = Some(Status {
            message: message.into(),
        });
        self
    }

    pub fn with_patch(mut self, patch: &Patch) -> Result<Self> {
        let patch_bytes = serde_json::to_vec(patch)
            .map_err(|e| Error::SerializationError("failed to serialize patch".to_string(), e))?;
        self.patch = Some(STANDARD.encode(patch_bytes));
        self.patch_type = Some(JSON_PATCH_TYPE.to_string());
        Ok(self)
    }

    /// Decode the JSON Patch carried by this response, if any.
    pub fn decoded_patch(&self) -> Option<Patch> {
        self.patch
            .as_ref()
            .and_then(|encoded| STANDARD.decode(encoded).ok())
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
    }
}

impl<T> AdmissionReview<T> {
    pub fn response(self, response: AdmissionResponse) -> AdmissionReview<()> {
        AdmissionReview {
            api_version: ADMISSION_API_VERSION.to_string(),
            kind: "AdmissionReview".to_string(),
            request: None,
            response: Some(response),
        }
    }
}

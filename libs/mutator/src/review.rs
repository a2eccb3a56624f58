use crate::admission::{AdmissionRequest, AdmissionResponse};
use crate::config::{FailurePolicy, MutatorConfig};
use crate::error::Result;
use crate::workload::{Workload, WorkloadKind};

use dtw_k8s_util::tolerations::merge_toleration;

use std::sync::Arc;

use json_patch::Patch;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Pod;
use serde_json::Value;
use tracing::{debug, error, info, instrument, trace};

const MUTATED_OPERATIONS: [&str; 2] = ["CREATE", "UPDATE"];

/// Decides whether an admitted workload needs the configured toleration and computes
/// the patch that adds it.
///
/// Holds no per-request state: one instance is shared by every request handler.
#[derive(Debug, Clone)]
pub struct Reviewer {
    config: Arc<MutatorConfig>,
}

impl Reviewer {
    pub fn new(config: Arc<MutatorConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MutatorConfig {
        &self.config
    }

    #[instrument(skip_all, fields(uid = %request.uid, operation = %request.operation))]
    pub fn review(&self, request: &AdmissionRequest<Value>) -> AdmissionResponse {
        let uid = request.uid.clone();

        let Some(kind) = WorkloadKind::from_resource(&request.resource) else {
            debug!(
                msg = "no opinion on unsupported resource",
                group = %request.resource.group,
                version = %request.resource.version,
                resource = %request.resource.resource
            );
            return AdmissionResponse::allow(uid);
        };

        if !MUTATED_OPERATIONS.contains(&request.operation.as_str())
            || request.sub_resource.as_deref().is_some_and(|s| !s.is_empty())
        {
            trace!(msg = "skipping operation", ?kind, sub_resource = ?request.sub_resource);
            return AdmissionResponse::allow(uid);
        }

        let Some(raw) = request.object.as_ref() else {
            debug!(msg = "request carries no object", ?kind);
            return AdmissionResponse::allow(uid);
        };

        let patch = match kind {
            WorkloadKind::Pod => self.mutate::<Pod>(raw),
            WorkloadKind::Deployment => self.mutate::<Deployment>(raw),
        };

        match patch.and_then(|patch| match patch {
            Some(patch) => AdmissionResponse::allow(uid.clone()).with_patch(&patch),
            None => Ok(AdmissionResponse::allow(uid.clone())),
        }) {
            Ok(response) => response,
            Err(e) => self.failed(uid, e.to_string()),
        }
    }

    /// Response for a request the webhook could not process, following the failure policy.
    pub fn failed(&self, uid: String, message: String) -> AdmissionResponse {
        error!(msg = "failed to review object", %uid, error = %message);
        match self.config.failure_policy {
            FailurePolicy::Open => AdmissionResponse::allow(uid).with_message(message),
            FailurePolicy::Closed => AdmissionResponse::deny(uid, message),
        }
    }

    /// Returns the patch that applies the configured toleration to `raw`, or `None` when the
    /// object must be left as it is.
    pub fn mutate<W: Workload>(&self, raw: &Value) -> Result<Option<Patch>> {
        let original = W::decode(raw)?;
        let name = original.name_any();
        let namespace = original.namespace().unwrap_or_default();

        if original.is_mirror() {
            debug!(msg = "skipping mirror object", kind = W::KIND, %namespace, %name);
            return Ok(None);
        }

        if !self.config.matcher.matches_any(original.labels().iter()) {
            trace!(msg = "no matching label", kind = W::KIND, %namespace, %name);
            return Ok(None);
        }

        let (tolerations, changed) =
            merge_toleration(original.tolerations(), &self.config.toleration);
        if !changed {
            debug!(msg = "toleration already present", kind = W::KIND, %namespace, %name);
            return Ok(None);
        }

        let mut working = original.clone();
        working.set_tolerations(tolerations);

        let patch = json_patch::diff(&original.encode()?, &working.encode()?);
        if patch.0.is_empty() {
            return Ok(None);
        }

        info!(
            msg = "applied dedicated toleration",
            kind = W::KIND,
            %namespace,
            %name,
            toleration = self.config.toleration.key.as_deref().unwrap_or_default()
        );
        Ok(Some(patch))
    }
}

use crate::admission::GroupVersionResource;
use crate::error::{Error, Result};

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Pod, PodSpec, Toleration};
use kube::ResourceExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Annotation set by the kubelet on pods it creates from static manifests.
pub const MIRROR_POD_ANNOTATION: &str = "kubernetes.io/config.mirror";

/// Resource kinds the webhook knows how to mutate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadKind {
    Pod,
    Deployment,
}

impl WorkloadKind {
    pub fn from_resource(resource: &GroupVersionResource) -> Option<Self> {
        match (
            resource.group.as_str(),
            resource.version.as_str(),
            resource.resource.as_str(),
        ) {
            ("", "v1", "pods") => Some(Self::Pod),
            ("apps", "v1", "deployments") => Some(Self::Deployment),
            _ => None,
        }
    }
}

/// An object carrying a pod template whose tolerations can be mutated.
pub trait Workload:
    k8s_openapi::Resource + ResourceExt + Clone + Serialize + DeserializeOwned
{
    fn tolerations(&self) -> &[Toleration];

    fn set_tolerations(&mut self, tolerations: Vec<Toleration>);

    /// Objects owned by a node-local agent rather than the control plane.
    fn is_mirror(&self) -> bool {
        false
    }

    fn decode(raw: &Value) -> Result<Self> {
        Self::deserialize(raw)
            .map_err(|e| Error::DecodeError(format!("failed to decode {}", Self::KIND), e))
    }

    fn encode(&self) -> Result<Value> {
        serde_json::to_value(self)
            .map_err(|e| Error::SerializationError(format!("failed to encode {}", Self::KIND), e))
    }
}

impl Workload for Pod {
    fn tolerations(&self) -> &[Toleration] {
        self.spec
            .as_ref()
            .and_then(|spec| spec.tolerations.as_deref())
            .unwrap_or_default()
    }

    fn set_tolerations(&mut self, tolerations: Vec<Toleration>) {
        self.spec.get_or_insert_with(PodSpec::default).tolerations = Some(tolerations);
    }

    fn is_mirror(&self) -> bool {
        self.annotations().contains_key(MIRROR_POD_ANNOTATION)
    }
}

impl Workload for Deployment {
    fn tolerations(&self) -> &[Toleration] {
        self.spec
            .as_ref()
            .and_then(|spec| spec.template.spec.as_ref())
            .and_then(|spec| spec.tolerations.as_deref())
            .unwrap_or_default()
    }

    fn set_tolerations(&mut self, tolerations: Vec<Toleration>) {
        self.spec
            .get_or_insert_with(Default::default)
            .template
            .spec
            .get_or_insert_with(PodSpec::default)
            .tolerations = Some(tolerations);
    }
}

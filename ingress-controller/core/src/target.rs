use crate::{IngressConfigs, IngressKey, ServiceRef};
use alb_ingress_controller_k8s_api::{self as k8s, annotations};
use anyhow::Result;

/// How load balancer targets are registered for an ingress.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TargetMode {
    /// Targets are nodes; traffic enters through node ports.
    #[default]
    Instance,

    /// Targets are pod IPs.
    Ip,
}

/// An ingress's target mode along with whatever is needed to evaluate it against node changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Instance,

    /// Backend services in declaration order.
    Ip(Vec<ServiceRef>),
}

#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid target type {0:?}; expected \"instance\" or \"ip\"")]
pub struct InvalidTargetMode(String);

/// Reads an ingress's target mode and, in IP mode, extracts its backend services.
pub async fn classify<C>(configs: &C, key: &IngressKey, ingress: &k8s::Ingress) -> Result<Target>
where
    C: IngressConfigs + ?Sized,
{
    match configs.target_mode(key).await? {
        TargetMode::Instance => Ok(Target::Instance),
        TargetMode::Ip => Ok(Target::Ip(backend_refs(ingress))),
    }
}

/// Lists the services an ingress routes to.
///
/// The default backend comes first, followed by rule backends in declaration order. Each service
/// is listed once. Resource backends and `use-annotation` action placeholders are skipped.
pub fn backend_refs(ingress: &k8s::Ingress) -> Vec<ServiceRef> {
    let Some(namespace) = ingress.metadata.namespace.as_deref() else {
        return Vec::new();
    };
    let Some(spec) = ingress.spec.as_ref() else {
        return Vec::new();
    };

    let rule_backends = spec
        .rules
        .iter()
        .flatten()
        .filter_map(|rule| rule.http.as_ref())
        .flat_map(|http| http.paths.iter())
        .map(|path| &path.backend);

    let mut refs = Vec::<ServiceRef>::new();
    for backend in spec.default_backend.iter().chain(rule_backends) {
        let Some(svc) = backend.service.as_ref() else {
            continue;
        };
        if is_action_placeholder(svc) {
            continue;
        }
        let svc = ServiceRef::new(namespace, svc.name.clone());
        if !refs.contains(&svc) {
            refs.push(svc);
        }
    }
    refs
}

fn is_action_placeholder(svc: &k8s::IngressServiceBackend) -> bool {
    svc.port
        .as_ref()
        .and_then(|port| port.name.as_deref())
        .map(|name| name == annotations::USE_ANNOTATION)
        .unwrap_or(false)
}

// === impl TargetMode ===

impl TargetMode {
    /// Reads the target-type annotation, if the ingress sets one.
    pub fn from_annotations(ingress: &k8s::Ingress) -> Result<Option<Self>, InvalidTargetMode> {
        ingress
            .metadata
            .annotations
            .as_ref()
            .and_then(|annos| annos.get(annotations::TARGET_TYPE))
            .map(|v| v.parse())
            .transpose()
    }
}

impl std::str::FromStr for TargetMode {
    type Err = InvalidTargetMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "instance" => Ok(Self::Instance),
            "ip" => Ok(Self::Ip),
            s => Err(InvalidTargetMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for TargetMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Instance => "instance".fmt(f),
            Self::Ip => "ip".fmt(f),
        }
    }
}

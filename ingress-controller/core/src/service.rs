use alb_ingress_controller_k8s_api as k8s;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ServiceType {
    #[default]
    ClusterIP,
    NodePort,
    LoadBalancer,
    ExternalName,
}

#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown service type {0:?}")]
pub struct InvalidServiceType(String);

// === impl ServiceType ===

impl ServiceType {
    /// Reads a service's type. Services that omit `spec.type` are `ClusterIP`.
    pub fn of(service: &k8s::Service) -> Result<Self, InvalidServiceType> {
        match service.spec.as_ref().and_then(|spec| spec.type_.as_deref()) {
            Some(ty) => ty.parse(),
            None => Ok(Self::default()),
        }
    }

    /// Node-port services route through node identity regardless of the ingress target mode.
    pub fn is_node_port(&self) -> bool {
        matches!(self, Self::NodePort)
    }
}

impl std::str::FromStr for ServiceType {
    type Err = InvalidServiceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "ClusterIP" => Ok(Self::ClusterIP),
            "NodePort" => Ok(Self::NodePort),
            "LoadBalancer" => Ok(Self::LoadBalancer),
            "ExternalName" => Ok(Self::ExternalName),
            s => Err(InvalidServiceType(s.to_string())),
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClusterIP => "ClusterIP".fmt(f),
            Self::NodePort => "NodePort".fmt(f),
            Self::LoadBalancer => "LoadBalancer".fmt(f),
            Self::ExternalName => "ExternalName".fmt(f),
        }
    }
}

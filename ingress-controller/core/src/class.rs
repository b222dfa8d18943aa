use alb_ingress_controller_k8s_api::{self as k8s, annotations};

/// The ingress class managed by this controller.
///
/// When no class is configured, ingresses without a class and ingresses of the default `alb`
/// class are claimed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngressClass(Option<String>);

// === impl IngressClass ===

impl IngressClass {
    pub fn new(class: impl Into<String>) -> Self {
        let class = class.into();
        if class.is_empty() {
            return Self(None);
        }
        Self(Some(class))
    }

    pub fn owns(&self, ingress: &k8s::Ingress) -> bool {
        let actual = class_of(ingress).unwrap_or_default();
        match self.0.as_deref() {
            Some(expected) => actual == expected,
            None => actual.is_empty() || actual == annotations::DEFAULT_INGRESS_CLASS,
        }
    }
}

impl std::str::FromStr for IngressClass {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl std::fmt::Display for IngressClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_deref().unwrap_or(""))
    }
}

fn class_of(ingress: &k8s::Ingress) -> Option<&str> {
    let annotated = ingress
        .metadata
        .annotations
        .as_ref()
        .and_then(|annos| annos.get(annotations::INGRESS_CLASS));
    annotated
        .or_else(|| ingress.spec.as_ref()?.ingress_class_name.as_ref())
        .map(String::as_str)
}

//! Well-known annotation keys read from `Ingress` resources.

/// The legacy ingress class annotation. Takes precedence over
/// `spec.ingressClassName` when both are set.
pub const INGRESS_CLASS: &str = "kubernetes.io/ingress.class";

/// The class claimed by this controller when no class is configured.
pub const DEFAULT_INGRESS_CLASS: &str = "alb";

/// Selects how load balancer targets are registered: `instance` or `ip`.
pub const TARGET_TYPE: &str = "alb.ingress.kubernetes.io/target-type";

/// A backend port name marking an action placeholder rather than a real service port.
pub const USE_ANNOTATION: &str = "use-annotation";

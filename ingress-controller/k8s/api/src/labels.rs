//! Node labels that exclude a node from load balancer target groups.

pub const NODE_ROLE_MASTER: &str = "node-role.kubernetes.io/master";

pub const EXCLUDE_FROM_EXTERNAL_LOAD_BALANCERS: &str =
    "node.kubernetes.io/exclude-from-external-load-balancers";

pub const ALPHA_EXCLUDE_BALANCER: &str = "alpha.service-controller.kubernetes.io/exclude-balancer";

pub const EXCLUDED_NODE_LABELS: [&str; 3] = [
    NODE_ROLE_MASTER,
    EXCLUDE_FROM_EXTERNAL_LOAD_BALANCERS,
    ALPHA_EXCLUDE_BALANCER,
];

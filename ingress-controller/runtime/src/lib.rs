#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use alb_ingress_controller_core as core;
pub use alb_ingress_controller_k8s_api as k8s;
pub use alb_ingress_controller_k8s_index as index;
pub use alb_ingress_controller_resolver as resolver;

mod args;
pub mod queue;

pub use self::args::Args;

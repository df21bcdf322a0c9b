pub mod config;
pub mod dependency_graph;
pub mod host;
pub mod linkage;
pub mod trigger;

pub use config::{Config, DatabaseConfig, LogFormat, LoggingConfig, RotationPolicy};
pub use dependency_graph::{depth_first_path, DependencyGraph, TriggerNode};
pub use host::{Host, HostKind};
pub use linkage::LinkageIndex;
pub use trigger::{DependencyEdge, Trigger, TriggerSeverity};

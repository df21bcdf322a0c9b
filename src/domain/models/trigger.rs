//! Trigger domain model.
//!
//! Triggers are named monitoring conditions owned by a host or a template.
//! Dependencies between triggers form a directed acyclic graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity of a trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSeverity {
    #[default]
    NotClassified,
    Information,
    Warning,
    Average,
    High,
    Disaster,
}

impl TriggerSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotClassified => "not_classified",
            Self::Information => "information",
            Self::Warning => "warning",
            Self::Average => "average",
            Self::High => "high",
            Self::Disaster => "disaster",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "not_classified" | "not-classified" | "none" => Some(Self::NotClassified),
            "information" | "info" => Some(Self::Information),
            "warning" | "warn" => Some(Self::Warning),
            "average" => Some(Self::Average),
            "high" => Some(Self::High),
            "disaster" => Some(Self::Disaster),
            _ => None,
        }
    }
}

/// A monitoring trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub id: Uuid,
    /// Host or template that owns this trigger
    pub owner_id: Uuid,
    /// Human-readable name, unique per owner
    pub name: String,
    pub expression: String,
    pub severity: TriggerSeverity,
    /// Triggers this one depends on, in insertion order
    pub depends_on: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Trigger {
    pub fn new(owner_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            expression: String::new(),
            severity: TriggerSeverity::default(),
            depends_on: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = expression.into();
        self
    }

    pub fn with_severity(mut self, severity: TriggerSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Record an outgoing dependency. Returns false if it was already present.
    pub fn add_dependency(&mut self, depends_on: Uuid) -> bool {
        if self.depends_on.contains(&depends_on) {
            return false;
        }
        self.depends_on.push(depends_on);
        true
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Trigger name cannot be empty".to_string());
        }
        Ok(())
    }
}

/// A directed "must not fire while" relationship: `trigger_id` depends on `depends_on_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub trigger_id: Uuid,
    pub depends_on_id: Uuid,
}

impl DependencyEdge {
    pub fn new(trigger_id: Uuid, depends_on_id: Uuid) -> Self {
        Self {
            trigger_id,
            depends_on_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_round_trip_names() {
        assert_eq!(TriggerSeverity::from_str("HIGH"), Some(TriggerSeverity::High));
        assert_eq!(TriggerSeverity::from_str("info"), Some(TriggerSeverity::Information));
        assert_eq!(TriggerSeverity::from_str("bogus"), None);
        assert_eq!(TriggerSeverity::Disaster.as_str(), "disaster");
    }

    #[test]
    fn test_default_severity_is_not_classified() {
        assert_eq!(TriggerSeverity::default(), TriggerSeverity::NotClassified);
        assert_eq!(Trigger::new(Uuid::new_v4(), "Apache: has been restarted").severity.as_str(), "not_classified");
    }

    #[test]
    fn test_add_dependency_is_idempotent() {
        let mut trigger = Trigger::new(Uuid::new_v4(), "Apache: Service is down");
        let other = Uuid::new_v4();

        assert!(trigger.add_dependency(other));
        assert!(!trigger.add_dependency(other));
        assert_eq!(trigger.depends_on, vec![other]);
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let trigger = Trigger::new(Uuid::new_v4(), "   ");
        assert!(trigger.validate().is_err());
    }
}

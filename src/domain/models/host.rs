//! Host and template domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether an entity is a monitored host or a reusable template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostKind {
    Host,
    Template,
}

impl HostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Template => "template",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "host" => Some(Self::Host),
            "template" => Some(Self::Template),
            _ => None,
        }
    }
}

/// A host or template together with its directly linked templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    pub id: Uuid,
    pub name: String,
    pub kind: HostKind,
    /// Directly linked templates, in link order
    pub templates: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Host {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name, HostKind::Host)
    }

    pub fn template(name: impl Into<String>) -> Self {
        Self::with_kind(name, HostKind::Template)
    }

    fn with_kind(name: impl Into<String>, kind: HostKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            templates: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_template(&self) -> bool {
        self.kind == HostKind::Template
    }

    pub fn with_template(mut self, template_id: Uuid) -> Self {
        if !self.templates.contains(&template_id) {
            self.templates.push(template_id);
        }
        self
    }

    /// Human-readable label used in messages: "host" or "template".
    pub fn label(&self) -> &'static str {
        self.kind.as_str()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err(format!("{} name cannot be empty", self.label()));
        }
        if self.templates.contains(&self.id) {
            return Err(format!("{} \"{}\" cannot be linked to itself", self.label(), self.name));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_template_dedups() {
        let template = Host::template("Apache by HTTP");
        let host = Host::new("Test host")
            .with_template(template.id)
            .with_template(template.id);

        assert_eq!(host.templates, vec![template.id]);
        assert!(!host.is_template());
        assert!(template.is_template());
    }

    #[test]
    fn test_validate_self_link() {
        let mut template = Host::template("Zabbix agent");
        template.templates.push(template.id);
        assert!(template.validate().is_err());
    }
}

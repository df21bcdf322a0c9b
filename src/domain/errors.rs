//! Domain errors for trigdep.

use thiserror::Error;
use uuid::Uuid;

/// Format a path of names as `"A" -> "B" -> "A"`.
fn format_quoted_path(path: &[String]) -> String {
    path.iter()
        .map(|name| format!("\"{name}\""))
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Reasons a proposed dependency edge is rejected.
///
/// Both variants are permanent for the current graph state: retrying the same
/// request without changing linkage or dependencies fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyValidationError {
    /// The depended-on trigger belongs to a template that is not linked to
    /// the dependent trigger's host.
    #[error(
        "Trigger \"{dependent}\" cannot depend on the trigger \"{depends_on}\", because the template \"{template}\" is not linked to the host \"{host}\"."
    )]
    Linkage {
        dependent_id: Uuid,
        dependent: String,
        depends_on_id: Uuid,
        depends_on: String,
        template_id: Uuid,
        template: String,
        host_id: Uuid,
        host: String,
    },

    /// Adding the edge would close a cycle. `cycle` starts and ends at the
    /// same trigger, in traversal order.
    #[error(
        "Trigger \"{dependent}\" cannot depend on the trigger \"{depends_on}\", because a circular linkage ({}) would occur.",
        format_quoted_path(.cycle)
    )]
    CircularDependency {
        dependent_id: Uuid,
        dependent: String,
        depends_on_id: Uuid,
        depends_on: String,
        cycle_ids: Vec<Uuid>,
        cycle: Vec<String>,
    },
}

impl DependencyValidationError {
    /// Rendered cycle path, e.g. `"A" -> "B" -> "A"`, for circular errors.
    pub fn cycle_path(&self) -> Option<String> {
        match self {
            Self::CircularDependency { cycle, .. } => Some(format_quoted_path(cycle)),
            Self::Linkage { .. } => None,
        }
    }
}

/// Domain-level errors that can occur in trigdep.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Trigger not found: {0}")]
    TriggerNotFound(Uuid),

    #[error("Host not found: {0}")]
    HostNotFound(Uuid),

    #[error(transparent)]
    DependencyRejected(#[from] DependencyValidationError),

    #[error("Cannot link \"{template}\" to \"{host}\": {reason}")]
    InvalidLink {
        host: String,
        template: String,
        reason: String,
    },

    #[error("Circular template linkage would occur: {}", format_quoted_path(.0))]
    CircularTemplateLinkage(Vec<String>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return DomainError::Conflict(db_err.message().to_string());
            }
        }
        DomainError::DatabaseError(err.to_string())
    }
}

//! SQLite implementation of the TriggerRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::HashMap;
use uuid::Uuid;

use super::{parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{DependencyEdge, Trigger, TriggerSeverity};
use crate::domain::ports::{TriggerFilter, TriggerRepository};

#[derive(Clone)]
pub struct SqliteTriggerRepository {
    pool: SqlitePool,
}

impl SqliteTriggerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TriggerRepository for SqliteTriggerRepository {
    async fn create(&self, trigger: &Trigger) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO triggers (id, owner_id, name, expression, severity, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#
        )
        .bind(trigger.id.to_string())
        .bind(trigger.owner_id.to_string())
        .bind(&trigger.name)
        .bind(&trigger.expression)
        .bind(trigger.severity.as_str())
        .bind(trigger.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        for dep_id in &trigger.depends_on {
            sqlx::query(
                "INSERT OR IGNORE INTO trigger_depends (trigger_id, depends_on_id) VALUES (?, ?)"
            )
            .bind(trigger.id.to_string())
            .bind(dep_id.to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Trigger>> {
        let row: Option<TriggerRow> = sqlx::query_as("SELECT * FROM triggers WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        self.hydrate(row).await
    }

    async fn get_by_name(&self, owner_id: Uuid, name: &str) -> DomainResult<Option<Trigger>> {
        let row: Option<TriggerRow> = sqlx::query_as(
            "SELECT * FROM triggers WHERE owner_id = ? AND name = ?"
        )
        .bind(owner_id.to_string())
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        self.hydrate(row).await
    }

    async fn list(&self, filter: TriggerFilter) -> DomainResult<Vec<Trigger>> {
        let mut query = String::from("SELECT * FROM triggers WHERE 1=1");
        if filter.owner_id.is_some() {
            query.push_str(" AND owner_id = ?");
        }
        query.push_str(" ORDER BY rowid");
        if filter.limit.is_some() {
            query.push_str(" LIMIT ?");
        }

        let mut q = sqlx::query_as::<_, TriggerRow>(&query);
        if let Some(owner_id) = filter.owner_id {
            q = q.bind(owner_id.to_string());
        }
        if let Some(limit) = filter.limit {
            q = q.bind(limit);
        }

        let rows = q.fetch_all(&self.pool).await?;

        let mut depends_on: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for edge in self.list_dependency_edges().await? {
            depends_on
                .entry(edge.trigger_id)
                .or_default()
                .push(edge.depends_on_id);
        }

        rows.into_iter()
            .map(|row| -> DomainResult<Trigger> {
                let mut trigger: Trigger = row.try_into()?;
                trigger.depends_on = depends_on.remove(&trigger.id).unwrap_or_default();
                Ok(trigger)
            })
            .collect()
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM triggers WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::TriggerNotFound(id));
        }

        Ok(())
    }

    async fn add_dependency(&self, trigger_id: Uuid, depends_on: Uuid) -> DomainResult<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO trigger_depends (trigger_id, depends_on_id) VALUES (?, ?)"
        )
        .bind(trigger_id.to_string())
        .bind(depends_on.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_dependency(&self, trigger_id: Uuid, depends_on: Uuid) -> DomainResult<bool> {
        let result = sqlx::query(
            "DELETE FROM trigger_depends WHERE trigger_id = ? AND depends_on_id = ?"
        )
        .bind(trigger_id.to_string())
        .bind(depends_on.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_dependency_edges(&self) -> DomainResult<Vec<DependencyEdge>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT trigger_id, depends_on_id FROM trigger_depends ORDER BY seq"
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(from, to)| -> DomainResult<DependencyEdge> {
                Ok(DependencyEdge::new(parse_uuid(&from)?, parse_uuid(&to)?))
            })
            .collect()
    }

    async fn get_dependencies(&self, trigger_id: Uuid) -> DomainResult<Vec<Trigger>> {
        let rows: Vec<TriggerRow> = sqlx::query_as(
            r#"SELECT t.* FROM triggers t
               INNER JOIN trigger_depends d ON t.id = d.depends_on_id
               WHERE d.trigger_id = ?
               ORDER BY d.seq"#
        )
        .bind(trigger_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn get_dependents(&self, trigger_id: Uuid) -> DomainResult<Vec<Trigger>> {
        let rows: Vec<TriggerRow> = sqlx::query_as(
            r#"SELECT t.* FROM triggers t
               INNER JOIN trigger_depends d ON t.id = d.trigger_id
               WHERE d.depends_on_id = ?
               ORDER BY d.seq"#
        )
        .bind(trigger_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }
}

impl SqliteTriggerRepository {
    async fn hydrate(&self, row: Option<TriggerRow>) -> DomainResult<Option<Trigger>> {
        match row {
            Some(r) => {
                let mut trigger: Trigger = r.try_into()?;
                self.load_dependencies(&mut trigger).await?;
                Ok(Some(trigger))
            }
            None => Ok(None),
        }
    }

    async fn load_dependencies(&self, trigger: &mut Trigger) -> DomainResult<()> {
        let deps: Vec<(String,)> = sqlx::query_as(
            "SELECT depends_on_id FROM trigger_depends WHERE trigger_id = ? ORDER BY seq"
        )
        .bind(trigger.id.to_string())
        .fetch_all(&self.pool)
        .await?;

        trigger.depends_on = deps
            .iter()
            .map(|(id,)| parse_uuid(id))
            .collect::<DomainResult<_>>()?;

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct TriggerRow {
    id: String,
    owner_id: String,
    name: String,
    expression: String,
    severity: String,
    created_at: String,
}

impl TryFrom<TriggerRow> for Trigger {
    type Error = DomainError;

    fn try_from(row: TriggerRow) -> Result<Self, Self::Error> {
        let severity = TriggerSeverity::from_str(&row.severity)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid severity: {}", row.severity)))?;

        Ok(Trigger {
            id: parse_uuid(&row.id)?,
            owner_id: parse_uuid(&row.owner_id)?,
            name: row.name,
            expression: row.expression,
            severity,
            depends_on: Vec::new(), // Loaded separately
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

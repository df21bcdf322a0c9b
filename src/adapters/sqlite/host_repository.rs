//! SQLite implementation of the TemplateLinkageRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::HashMap;
use uuid::Uuid;

use super::{parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Host, HostKind};
use crate::domain::ports::TemplateLinkageRepository;

#[derive(Clone)]
pub struct SqliteTemplateLinkageRepository {
    pool: SqlitePool,
}

impl SqliteTemplateLinkageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateLinkageRepository for SqliteTemplateLinkageRepository {
    async fn create_host(&self, host: &Host) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO hosts (id, name, kind, created_at) VALUES (?, ?, ?, ?)")
            .bind(host.id.to_string())
            .bind(&host.name)
            .bind(host.kind.as_str())
            .bind(host.created_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;

        for template_id in &host.templates {
            sqlx::query("INSERT OR IGNORE INTO host_templates (host_id, template_id) VALUES (?, ?)")
                .bind(host.id.to_string())
                .bind(template_id.to_string())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_host(&self, id: Uuid) -> DomainResult<Option<Host>> {
        let row: Option<HostRow> = sqlx::query_as("SELECT * FROM hosts WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        self.hydrate(row).await
    }

    async fn get_host_by_name(&self, name: &str) -> DomainResult<Option<Host>> {
        let row: Option<HostRow> = sqlx::query_as("SELECT * FROM hosts WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        self.hydrate(row).await
    }

    async fn list_hosts(&self) -> DomainResult<Vec<Host>> {
        let rows: Vec<HostRow> = sqlx::query_as("SELECT * FROM hosts ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;

        let links: Vec<(String, String)> = sqlx::query_as(
            "SELECT host_id, template_id FROM host_templates ORDER BY seq"
        )
        .fetch_all(&self.pool)
        .await?;

        let mut templates: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for (host_id, template_id) in links {
            templates
                .entry(parse_uuid(&host_id)?)
                .or_default()
                .push(parse_uuid(&template_id)?);
        }

        rows.into_iter()
            .map(|row| -> DomainResult<Host> {
                let mut host: Host = row.try_into()?;
                host.templates = templates.remove(&host.id).unwrap_or_default();
                Ok(host)
            })
            .collect()
    }

    async fn delete_host(&self, id: Uuid) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM hosts WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::HostNotFound(id));
        }

        Ok(())
    }

    async fn link_template(&self, host_id: Uuid, template_id: Uuid) -> DomainResult<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO host_templates (host_id, template_id) VALUES (?, ?)"
        )
        .bind(host_id.to_string())
        .bind(template_id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn unlink_template(&self, host_id: Uuid, template_id: Uuid) -> DomainResult<bool> {
        let result = sqlx::query(
            "DELETE FROM host_templates WHERE host_id = ? AND template_id = ?"
        )
        .bind(host_id.to_string())
        .bind(template_id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl SqliteTemplateLinkageRepository {
    async fn hydrate(&self, row: Option<HostRow>) -> DomainResult<Option<Host>> {
        let Some(row) = row else {
            return Ok(None);
        };
        let mut host: Host = row.try_into()?;

        let links: Vec<(String,)> = sqlx::query_as(
            "SELECT template_id FROM host_templates WHERE host_id = ? ORDER BY seq"
        )
        .bind(host.id.to_string())
        .fetch_all(&self.pool)
        .await?;

        host.templates = links
            .iter()
            .map(|(id,)| parse_uuid(id))
            .collect::<DomainResult<_>>()?;

        Ok(Some(host))
    }
}

#[derive(sqlx::FromRow)]
struct HostRow {
    id: String,
    name: String,
    kind: String,
    created_at: String,
}

impl TryFrom<HostRow> for Host {
    type Error = DomainError;

    fn try_from(row: HostRow) -> Result<Self, Self::Error> {
        let kind = HostKind::from_str(&row.kind)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid host kind: {}", row.kind)))?;

        Ok(Host {
            id: parse_uuid(&row.id)?,
            name: row.name,
            kind,
            templates: Vec::new(), // Loaded separately
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;

    async fn setup_test_repo() -> SqliteTemplateLinkageRepository {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteTemplateLinkageRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_get_host_with_links() {
        let repo = setup_test_repo().await;
        let agent = Host::template("Zabbix agent");
        let apache = Host::template("Apache by HTTP");
        let host = Host::new("Test host").with_template(agent.id).with_template(apache.id);

        repo.create_host(&agent).await.unwrap();
        repo.create_host(&apache).await.unwrap();
        repo.create_host(&host).await.unwrap();

        let retrieved = repo.get_host(host.id).await.unwrap().unwrap();
        assert_eq!(retrieved.kind, HostKind::Host);
        assert_eq!(retrieved.templates, vec![agent.id, apache.id]);

        let by_name = repo.get_host_by_name("Zabbix agent").await.unwrap().unwrap();
        assert!(by_name.is_template());
    }

    #[tokio::test]
    async fn test_link_and_unlink_report_changes() {
        let repo = setup_test_repo().await;
        let freebsd = Host::template("FreeBSD by Zabbix agent");
        let host = Host::new("Test host");
        repo.create_host(&freebsd).await.unwrap();
        repo.create_host(&host).await.unwrap();

        assert!(repo.link_template(host.id, freebsd.id).await.unwrap());
        assert!(!repo.link_template(host.id, freebsd.id).await.unwrap());

        let hosts = repo.list_hosts().await.unwrap();
        let listed = hosts.iter().find(|h| h.id == host.id).unwrap();
        assert_eq!(listed.templates, vec![freebsd.id]);

        assert!(repo.unlink_template(host.id, freebsd.id).await.unwrap());
        assert!(!repo.unlink_template(host.id, freebsd.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_host_name_is_conflict() {
        let repo = setup_test_repo().await;
        repo.create_host(&Host::new("Test host")).await.unwrap();

        let err = repo.create_host(&Host::template("Test host")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_host_cascades_links() {
        let repo = setup_test_repo().await;
        let template = Host::template("Apache by HTTP");
        let host = Host::new("Test host").with_template(template.id);
        repo.create_host(&template).await.unwrap();
        repo.create_host(&host).await.unwrap();

        repo.delete_host(template.id).await.unwrap();

        let host = repo.get_host(host.id).await.unwrap().unwrap();
        assert!(host.templates.is_empty());
        assert!(matches!(
            repo.delete_host(template.id).await.unwrap_err(),
            DomainError::HostNotFound(_)
        ));
    }
}

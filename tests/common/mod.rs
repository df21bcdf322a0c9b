//! Common test utilities for integration tests
//!
//! Provides the monitoring fixture shared by the integration test files.

#![allow(dead_code)]

use std::sync::Arc;

use trigdep::adapters::sqlite::{
    create_migrated_test_pool, SqliteTemplateLinkageRepository, SqliteTriggerRepository,
};
use trigdep::{DependencyService, Host, Trigger, TriggerSeverity};

pub type Service = DependencyService<SqliteTriggerRepository, SqliteTemplateLinkageRepository>;

/// Service backed by a fresh in-memory database.
pub async fn setup_service() -> Service {
    let pool = create_migrated_test_pool()
        .await
        .expect("Failed to create test pool");
    DependencyService::new(
        Arc::new(SqliteTriggerRepository::new(pool.clone())),
        Arc::new(SqliteTemplateLinkageRepository::new(pool)),
    )
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub async fn add_trigger(service: &Service, owner: &Host, name: &str) -> Trigger {
    service
        .create_trigger(owner.id, name.to_string(), None, TriggerSeverity::Average)
        .await
        .expect("Failed to create trigger")
}

/// Templates "Zabbix agent", "Apache by HTTP" and "FreeBSD by Zabbix agent";
/// "Test host" links "Zabbix agent" only.
pub struct MonitoringFixture {
    pub service: Service,
    pub agent: Host,
    pub apache: Host,
    pub freebsd: Host,
    pub host: Host,
    pub agent_unavailable: Trigger,
    pub passwd_changed: Trigger,
    pub service_down: Trigger,
    pub response_slow: Trigger,
    pub restarted: Trigger,
}

impl MonitoringFixture {
    pub async fn new() -> Self {
        let service = setup_service().await;

        let agent = service.create_template("Zabbix agent").await.unwrap();
        let apache = service.create_template("Apache by HTTP").await.unwrap();
        let freebsd = service.create_template("FreeBSD by Zabbix agent").await.unwrap();
        let host = service.create_host("Test host").await.unwrap();
        service.link_template(host.id, agent.id).await.unwrap();

        let agent_unavailable = add_trigger(&service, &agent, "Zabbix agent is not available").await;
        let passwd_changed =
            add_trigger(&service, &freebsd, "/etc/passwd has been changed on {HOST.NAME}").await;
        let service_down = add_trigger(&service, &apache, "Apache: Service is down").await;
        let response_slow =
            add_trigger(&service, &apache, "Apache: Service response time is too high").await;
        let restarted = add_trigger(&service, &apache, "Apache: has been restarted").await;

        service
            .add_dependency(response_slow.id, service_down.id)
            .await
            .unwrap();

        Self {
            service,
            agent,
            apache,
            freebsd,
            host,
            agent_unavailable,
            passwd_changed,
            service_down,
            response_slow,
            restarted,
        }
    }
}

//! End-to-end dependency rules over the SQLite-backed service.

mod common;

use std::sync::Arc;

use common::{add_trigger, setup_service, MonitoringFixture};
use trigdep::{DependencyValidationError, DomainError, TriggerFilter};

#[tokio::test]
async fn test_dependency_within_linked_template_succeeds() {
    let f = MonitoringFixture::new().await;

    let added = f
        .service
        .add_dependency(f.restarted.id, f.service_down.id)
        .await
        .unwrap();
    assert!(added);

    let deps = f.service.dependencies_of(f.restarted.id).await.unwrap();
    assert_eq!(deps.iter().map(|t| t.id).collect::<Vec<_>>(), vec![f.service_down.id]);
}

#[tokio::test]
async fn test_dependency_on_unlinked_template_names_inheriting_host() {
    let f = MonitoringFixture::new().await;

    let err = f
        .service
        .add_dependency(f.agent_unavailable.id, f.passwd_changed.id)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Trigger \"Zabbix agent is not available\" cannot depend on the trigger \
         \"/etc/passwd has been changed on {HOST.NAME}\", because the template \
         \"FreeBSD by Zabbix agent\" is not linked to the host \"Test host\"."
    );
    assert!(f
        .service
        .dependencies_of(f.agent_unavailable.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_host_trigger_on_unlinked_template_names_the_host() {
    let f = MonitoringFixture::new().await;
    let local = add_trigger(&f.service, &f.host, "Local check").await;

    let err = f
        .service
        .add_dependency(local.id, f.passwd_changed.id)
        .await
        .unwrap_err();

    match err {
        DomainError::DependencyRejected(DependencyValidationError::Linkage { host, template, .. }) => {
            assert_eq!(host, "Test host");
            assert_eq!(template, "FreeBSD by Zabbix agent");
        }
        other => panic!("Expected linkage error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_linking_into_the_owning_template_lifts_the_restriction() {
    let f = MonitoringFixture::new().await;

    // Linking FreeBSD to the host is not enough: the agent template itself lacks it.
    f.service.link_template(f.host.id, f.freebsd.id).await.unwrap();
    let err = f
        .service
        .add_dependency(f.agent_unavailable.id, f.passwd_changed.id)
        .await
        .unwrap_err();
    match err {
        DomainError::DependencyRejected(DependencyValidationError::Linkage { host, .. }) => {
            assert_eq!(host, "Zabbix agent");
        }
        other => panic!("Expected linkage error, got {other:?}"),
    }

    f.service.link_template(f.agent.id, f.freebsd.id).await.unwrap();
    assert!(f
        .service
        .add_dependency(f.agent_unavailable.id, f.passwd_changed.id)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_reverse_edge_reports_two_cycle() {
    let f = MonitoringFixture::new().await;

    let err = f
        .service
        .add_dependency(f.service_down.id, f.response_slow.id)
        .await
        .unwrap_err();

    match err {
        DomainError::DependencyRejected(ref inner @ DependencyValidationError::CircularDependency { .. }) => {
            assert_eq!(
                inner.cycle_path().as_deref(),
                Some(
                    "\"Apache: Service response time is too high\" -> \"Apache: Service is down\" -> \
                     \"Apache: Service response time is too high\""
                )
            );
        }
        other => panic!("Expected circular dependency, got {other:?}"),
    }
}

#[tokio::test]
async fn test_three_cycle_path_in_traversal_order() {
    let service = setup_service().await;
    let template = service.create_template("Apache by HTTP").await.unwrap();
    let a = add_trigger(&service, &template, "A").await;
    let b = add_trigger(&service, &template, "B").await;
    let c = add_trigger(&service, &template, "C").await;

    service.add_dependency(a.id, b.id).await.unwrap();
    service.add_dependency(b.id, c.id).await.unwrap();

    let err = service.add_dependency(c.id, a.id).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Trigger \"C\" cannot depend on the trigger \"A\", because a circular linkage \
         (\"A\" -> \"B\" -> \"C\" -> \"A\") would occur."
    );
}

#[tokio::test]
async fn test_repeated_insert_leaves_single_edge() {
    let f = MonitoringFixture::new().await;

    assert!(!f
        .service
        .add_dependency(f.response_slow.id, f.service_down.id)
        .await
        .unwrap());

    let report = f.service.audit().await.unwrap();
    assert_eq!(report.edge_count, 1);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_deleting_template_cascades_triggers_and_edges() {
    let f = MonitoringFixture::new().await;
    f.service.link_template(f.host.id, f.apache.id).await.unwrap();
    f.service
        .add_dependency(f.restarted.id, f.service_down.id)
        .await
        .unwrap();

    // A host trigger depending on an Apache trigger keeps the template in use.
    let local = add_trigger(&f.service, &f.host, "Local check").await;
    f.service.add_dependency(local.id, f.service_down.id).await.unwrap();

    // Deleting the template removes the depended-on trigger as well, so nothing is orphaned.
    f.service.delete_host(f.apache.id).await.unwrap();

    let remaining = f
        .service
        .list_triggers(TriggerFilter::default())
        .await
        .unwrap();
    assert!(remaining.iter().all(|t| t.owner_id != f.apache.id));
    assert!(f.service.dependencies_of(local.id).await.unwrap().is_empty());
    assert_eq!(f.service.audit().await.unwrap().edge_count, 0);
}

#[tokio::test]
async fn test_deleting_intermediate_template_is_rejected_when_it_breaks_linkage() {
    let service = setup_service().await;
    let base = service.create_template("Base").await.unwrap();
    let middle = service.create_template("Middle").await.unwrap();
    let host = service.create_host("Test host").await.unwrap();
    service.link_template(middle.id, base.id).await.unwrap();
    service.link_template(host.id, middle.id).await.unwrap();

    let base_trigger = add_trigger(&service, &base, "Base trigger").await;
    let host_trigger = add_trigger(&service, &host, "Host trigger").await;
    service.add_dependency(host_trigger.id, base_trigger.id).await.unwrap();

    let err = service.delete_host(middle.id).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::DependencyRejected(DependencyValidationError::Linkage { .. })
    ));
    assert!(service.get_host(middle.id).await.is_ok());
}

#[tokio::test]
async fn test_unlink_reports_first_edge_in_insertion_order() {
    let f = MonitoringFixture::new().await;
    f.service.link_template(f.host.id, f.apache.id).await.unwrap();
    let first = add_trigger(&f.service, &f.host, "First").await;
    let second = add_trigger(&f.service, &f.host, "Second").await;
    f.service.add_dependency(second.id, f.restarted.id).await.unwrap();
    f.service.add_dependency(first.id, f.service_down.id).await.unwrap();

    let err = f.service.unlink_template(f.host.id, f.apache.id).await.unwrap_err();
    match err {
        DomainError::DependencyRejected(DependencyValidationError::Linkage { dependent, depends_on, .. }) => {
            assert_eq!(dependent, "Second");
            assert_eq!(depends_on, "Apache: has been restarted");
        }
        other => panic!("Expected linkage error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_concurrent_opposing_inserts_keep_graph_acyclic() {
    let service = Arc::new(setup_service().await);
    let template = service.create_template("Apache by HTTP").await.unwrap();
    let a = add_trigger(&service, &template, "A").await;
    let b = add_trigger(&service, &template, "B").await;
    let (a, b) = (a.id, b.id);

    let forward = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.add_dependency(a, b).await })
    };
    let backward = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.add_dependency(b, a).await })
    };

    let results = [forward.await.unwrap(), backward.await.unwrap()];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);

    let report = service.audit().await.unwrap();
    assert_eq!(report.edge_count, 1);
    assert!(report.cycle.is_none());
}

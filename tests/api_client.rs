//! Runs the real HTTP client and dashboard against an in-process fake service.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use cinderdash::api::{ApiClient, ClientConfig, ClientError, CommandRequest, DashboardApi};
use cinderdash::dashboard::commands::{Command, CommandOutcome};
use cinderdash::dashboard::state::Banner;
use cinderdash::dashboard::{Dashboard, DashboardConfig};

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    body: String,
}

#[derive(Default)]
struct Inner {
    routes: HashMap<(Method, String), (StatusCode, String)>,
    requests: Vec<Recorded>,
}

/// Canned responses keyed by method and raw request path.
#[derive(Clone, Default)]
struct FakeService {
    inner: Arc<Mutex<Inner>>,
}

impl FakeService {
    fn with_sample_data() -> Self {
        let service = Self::default();
        service.route(
            Method::GET,
            "/api/health",
            StatusCode::OK,
            json!({"status": "healthy", "volume_count": 2, "openstack_version": "2024.1"}),
        );
        service.route(
            Method::GET,
            "/api/volumes",
            StatusCode::OK,
            json!([
                {"id": "v1", "name": "db", "size": 10, "status": "available", "backupable": true},
                {"id": "v2", "name": "logs", "size": 5, "status": "in-use", "backupable": true}
            ]),
        );
        service.route(
            Method::GET,
            "/api/backups",
            StatusCode::OK,
            json!({
                "full_backups": [
                    {"id": "b1", "volume_id": "v1", "status": "available", "created_at": "2026-01-01T02:00:00Z"}
                ],
                "incremental_backups": [
                    {"id": "b2", "volume_id": "v1", "status": "creating"}
                ],
                "all_backups": []
            }),
        );
        service.route(Method::GET, "/api/schedules", StatusCode::OK, json!([]));
        service.route(Method::GET, "/api/server-snapshots", StatusCode::OK, json!([]));
        service.route(Method::GET, "/api/volume-snapshots", StatusCode::OK, json!([]));
        service.route(
            Method::GET,
            "/api/servers",
            StatusCode::OK,
            json!([{"id": "srv1", "name": "web", "status": "ACTIVE"}]),
        );
        service
    }

    fn route(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.route_raw(method, path, status, body.to_string());
    }

    fn route_raw(&self, method: Method, path: &str, status: StatusCode, body: impl Into<String>) {
        self.inner
            .lock()
            .unwrap()
            .routes
            .insert((method, path.to_string()), (status, body.into()));
    }

    fn requests(&self) -> Vec<Recorded> {
        self.inner.lock().unwrap().requests.clone()
    }

    async fn spawn(self) -> String {
        let app = Router::new().fallback(respond).with_state(self);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }
}

async fn respond(
    State(service): State<FakeService>,
    method: Method,
    uri: Uri,
    body: String,
) -> Response {
    let mut inner = service.inner.lock().unwrap();
    let path = uri.path().to_string();
    inner.requests.push(Recorded {
        method: method.clone(),
        path: path.clone(),
        body,
    });

    match inner.routes.get(&(method, path)) {
        Some((status, body)) => (
            *status,
            [(header::CONTENT_TYPE, "application/json")],
            body.clone(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}

fn client(url: &str) -> ApiClient {
    ApiClient::new(&ClientConfig {
        server_url: url.to_string(),
        timeout: Some(Duration::from_secs(5)),
    })
    .unwrap()
}

fn fast_config() -> DashboardConfig {
    DashboardConfig {
        poll_interval: Duration::from_secs(30),
        settle_short: Duration::from_millis(20),
        settle_long: Duration::from_millis(40),
        health_interval: None,
    }
}

#[tokio::test]
async fn test_list_endpoints_decode() {
    let service = FakeService::with_sample_data();
    let url = service.clone().spawn().await;
    let api = client(&url);

    let volumes = api.volumes().await.unwrap();
    assert_eq!(volumes.len(), 2);
    assert!(volumes[0].backupable);

    let backups = api.backups().await.unwrap().into_backups();
    let ids: Vec<&str> = backups.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["b1", "b2"]);

    let servers = api.servers().await.unwrap();
    assert_eq!(servers[0].id, "srv1");
}

#[tokio::test]
async fn test_full_backup_flow_refreshes_after_settle() {
    let service = FakeService::with_sample_data();
    service.route(
        Method::POST,
        "/api/backup/full",
        StatusCode::OK,
        json!({"success": true, "message": "Backup started for 2 volumes"}),
    );
    let url = service.clone().spawn().await;

    let mut dashboard = Dashboard::new(client(&url), fast_config());
    let report = dashboard.start().await;
    assert!(report.is_complete());
    assert!(dashboard.state().banner.is_healthy());

    dashboard.state_mut().toggle_volume("v1").unwrap();
    dashboard.state_mut().toggle_volume("v2").unwrap();
    let before = service.requests().len();

    let outcome = dashboard
        .dispatch(&Command::CreateBackup {
            kind: cinderdash::api::BackupKind::Full,
            name: Some("nightly".into()),
        })
        .await;

    match outcome {
        CommandOutcome::Succeeded {
            message,
            refresh_after,
            ..
        } => {
            assert_eq!(message, "Backup started for 2 volumes");
            assert_eq!(refresh_after, Duration::from_millis(40));
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(dashboard.state().selected_volumes().is_empty());

    let requests = service.requests();
    let sent = &requests[before];
    assert_eq!(sent.method, Method::POST);
    assert_eq!(sent.path, "/api/backup/full");
    let body: Value = serde_json::from_str(&sent.body).unwrap();
    assert_eq!(body["volume_ids"], json!(["v1", "v2"]));
    assert_eq!(body["name"], json!("nightly"));

    tokio::time::sleep(Duration::from_millis(60)).await;
    let report = dashboard.tick().await.expect("settle refresh due");
    assert!(report.is_complete());

    let gets = service.requests()[before + 1..]
        .iter()
        .filter(|r| r.method == Method::GET)
        .count();
    assert_eq!(gets, 6);
}

#[tokio::test]
async fn test_unhealthy_health_body_on_500() {
    let service = FakeService::with_sample_data();
    service.route(
        Method::GET,
        "/api/health",
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"status": "unhealthy", "error": "Keystone unreachable", "openstack_connected": false}),
    );
    let url = service.spawn().await;

    let mut dashboard = Dashboard::new(client(&url), fast_config());
    dashboard.check_health().await;

    assert_eq!(
        dashboard.state().banner,
        Banner::Unhealthy {
            reason: "Keystone unreachable".into()
        }
    );
}

#[tokio::test]
async fn test_error_envelope_on_500_is_decoded() {
    let service = FakeService::with_sample_data();
    service.route(
        Method::POST,
        "/api/schedules/s1/toggle",
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"success": false, "error": "Schedule s1 is locked"}),
    );
    let url = service.spawn().await;

    let mut dashboard = Dashboard::new(client(&url), fast_config());
    let outcome = dashboard
        .dispatch(&Command::ToggleSchedule {
            schedule_id: "s1".into(),
        })
        .await;

    assert_eq!(
        outcome,
        CommandOutcome::Failed {
            message: "Schedule s1 is locked".into()
        }
    );
}

#[tokio::test]
async fn test_non_json_command_response_is_an_error() {
    let service = FakeService::with_sample_data();
    service.route_raw(
        Method::DELETE,
        "/api/schedules/s1",
        StatusCode::BAD_GATEWAY,
        "<html>Bad Gateway</html>",
    );
    let url = service.spawn().await;
    let api = client(&url);

    let result = api
        .execute(&CommandRequest::delete(["api", "schedules", "s1"]))
        .await;

    match result {
        Err(ClientError::Status { status, message }) => {
            assert_eq!(status, 502);
            assert_eq!(message, "<html>Bad Gateway</html>");
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[tokio::test]
async fn test_read_endpoint_failure_is_isolated() {
    let service = FakeService::with_sample_data();
    service.route_raw(
        Method::GET,
        "/api/servers",
        StatusCode::INTERNAL_SERVER_ERROR,
        "",
    );
    let url = service.spawn().await;

    let mut dashboard = Dashboard::new(client(&url), fast_config());
    let report = dashboard.refresh().await;

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.refreshed.len(), 5);
    assert_eq!(dashboard.state().volumes.len(), 2);
    assert!(dashboard.state().servers.is_empty());
}

#[tokio::test]
async fn test_ids_are_percent_encoded() {
    let service = FakeService::with_sample_data();
    service.route(
        Method::DELETE,
        "/api/backup/a%2Fb%20c",
        StatusCode::OK,
        json!({"success": true, "message": "Backup deletion started"}),
    );
    let url = service.clone().spawn().await;

    let mut dashboard = Dashboard::new(client(&url), fast_config());
    let outcome = dashboard
        .dispatch(&Command::DeleteBackup {
            backup_id: "a/b c".into(),
        })
        .await;

    assert!(outcome.is_success());
    let last = service.requests().pop().unwrap();
    assert_eq!(last.method, Method::DELETE);
    assert_eq!(last.path, "/api/backup/a%2Fb%20c");
}

#[tokio::test]
async fn test_backup_status_export_and_import() {
    let service = FakeService::with_sample_data();
    service.route(
        Method::GET,
        "/api/backup/b1/status",
        StatusCode::OK,
        json!({
            "id": "b1", "name": "db-nightly", "status": "available",
            "is_incremental": false, "size": 10, "created_at": "2026-01-01T02:00:00Z"
        }),
    );
    service.route(
        Method::GET,
        "/api/backup/gone/status",
        StatusCode::NOT_FOUND,
        json!({"error": "Backup not found"}),
    );
    service.route(
        Method::GET,
        "/api/backup/b1/export",
        StatusCode::OK,
        json!({"backup_service": "cinder.backup.drivers.swift", "backup_url": "eyJ9"}),
    );
    service.route(
        Method::POST,
        "/api/backup/import",
        StatusCode::OK,
        json!({"success": true, "message": "Backup imported", "backup_id": "b9"}),
    );
    let url = service.clone().spawn().await;

    let mut dashboard = Dashboard::new(client(&url), fast_config());

    let status = dashboard.backup_status("b1").await.unwrap();
    assert_eq!(status.status, "available");
    assert_eq!(status.size, Some(10));

    match dashboard.backup_status("gone").await {
        Err(ClientError::Status { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Backup not found");
        }
        other => panic!("unexpected result {:?}", other),
    }

    let export = dashboard.export_backup("b1").await.unwrap();
    assert_eq!(export.backup_url, "eyJ9");

    let outcome = dashboard
        .dispatch(&Command::ImportBackup {
            backup_service: export.backup_service,
            backup_url: export.backup_url,
            name: None,
        })
        .await;
    match outcome {
        CommandOutcome::Succeeded {
            message,
            refresh_after,
            ..
        } => {
            assert_eq!(message, "Backup imported");
            assert_eq!(refresh_after, Duration::from_millis(40));
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    let sent = service.requests().pop().unwrap();
    assert_eq!(sent.method, Method::POST);
    assert_eq!(sent.path, "/api/backup/import");
    let body: Value = serde_json::from_str(&sent.body).unwrap();
    assert_eq!(
        body,
        json!({"backup_service": "cinder.backup.drivers.swift", "backup_url": "eyJ9"})
    );
}

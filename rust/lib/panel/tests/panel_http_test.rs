//! Panel driven over real HTTP against the fake equipment server.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use equipment_client::HttpEquipmentApi;
use equipment_core::{EquipmentFields, ALERT_MESSAGE};
use equipment_panel::{AlertSink, EquipmentPanel, PanelConfig, PanelError};
use equipment_testkit::FakeServer;

#[derive(Default)]
struct Alerts(Mutex<Vec<String>>);

impl Alerts {
    fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

impl AlertSink for Alerts {
    fn alert(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
}

fn at(t: f64, p: f64, ts: &str) -> EquipmentFields {
    EquipmentFields::new(t, p, ts)
}

fn panel_for(server: &FakeServer, config: PanelConfig) -> (EquipmentPanel, Arc<Alerts>) {
    let alerts = Arc::new(Alerts::default());
    let api = Arc::new(HttpEquipmentApi::new(server.base_url()));
    (EquipmentPanel::new(api, alerts.clone(), config), alerts)
}

#[tokio::test]
async fn mount_renders_chart_in_server_order() {
    let server = FakeServer::with_records(vec![
        at(60.0, 120.0, "2024-01-15T10:00:00Z"),
        at(65.0, 125.0, "2024-01-15T11:30:00Z"),
    ])
    .await;
    let (panel, alerts) = panel_for(&server, PanelConfig::default());

    assert_eq!(panel.mount().await.unwrap(), 2);

    let chart = panel.chart_in(&Utc);
    assert_eq!(chart.labels, vec!["1/15/2024, 10:00:00 AM", "1/15/2024, 11:30:00 AM"]);
    assert_eq!(chart.temperatures, vec![60.0, 65.0]);
    assert_eq!(chart.pressures, vec![120.0, 125.0]);
    assert!(!panel.is_violating());
    assert_eq!(alerts.count(), 0);
}

#[tokio::test]
async fn create_edit_delete_round() {
    let server = FakeServer::start().await;
    let (panel, alerts) = panel_for(&server, PanelConfig::default());
    panel.mount().await.unwrap();

    // Create.
    panel.open_create();
    panel
        .edit_form(|f| {
            f.set_temperature(72.0);
            f.set_pressure(110.0);
            f.set_timestamp("2024-03-01T12:00:00Z");
        })
        .unwrap();
    panel.submit().await.unwrap();
    assert!(panel.form().is_none());

    let records = panel.records();
    assert_eq!(records.len(), 1);
    let id = records[0].id.clone().unwrap();
    assert_eq!(server.records().len(), 1);

    // Edit into violation.
    panel.open_edit(&id).unwrap();
    panel.edit_form(|f| f.set_temperature(81.0)).unwrap();
    panel.submit().await.unwrap();
    assert_eq!(panel.records().find(&id).unwrap().temperature, 81.0);
    assert!(panel.is_violating());
    assert_eq!(alerts.count(), 1);
    assert_eq!(alerts.0.lock().unwrap()[0], ALERT_MESSAGE);

    // Delete clears the violation.
    panel.delete(&id).await.unwrap();
    assert!(panel.records().is_empty());
    assert!(!panel.is_violating());
    assert!(server.records().is_empty());
}

#[tokio::test]
async fn outage_keeps_form_and_store() {
    let server = FakeServer::with_records(vec![at(70.0, 100.0, "2024-01-01T00:00:00Z")]).await;
    let (panel, alerts) = panel_for(&server, PanelConfig::default());
    panel.mount().await.unwrap();
    let before = panel.records();

    panel.open_create();
    let form = panel.edit_form(|f| f.set_pressure(200.0)).unwrap();

    server.set_failing(true);
    let err = panel.submit().await.unwrap_err();
    assert!(matches!(err, PanelError::Transport(_)));
    assert_eq!(panel.form(), Some(form));
    assert_eq!(panel.records().revision(), before.revision());
    assert_eq!(alerts.count(), 0);

    server.set_failing(false);
    panel.submit().await.unwrap();
    assert_eq!(panel.records().len(), 2);
    assert_eq!(alerts.count(), 1);
}

#[tokio::test]
async fn edit_of_record_deleted_elsewhere_fails() {
    let server = FakeServer::start().await;
    let id = server.seed(at(70.0, 100.0, "2024-01-01T00:00:00Z"));
    let (panel, _alerts) = panel_for(&server, PanelConfig::default());
    panel.mount().await.unwrap();

    panel.open_edit(&id).unwrap();

    // Another client removes it.
    let other = HttpEquipmentApi::new(server.base_url());
    equipment_client::EquipmentApi::delete(&other, &id).await.unwrap();

    assert!(panel.submit().await.is_err());
    assert!(panel.form().is_some());
    // Store still shows the stale record until the next refresh.
    assert!(panel.records().find(&id).is_some());

    panel.refresh().await.unwrap();
    assert!(panel.records().is_empty());
}

#[tokio::test]
async fn serialized_panel_issues_one_request_at_a_time() {
    let server = FakeServer::with_records(vec![
        at(70.0, 100.0, "2024-01-01T00:00:00Z"),
        at(71.0, 101.0, "2024-01-01T01:00:00Z"),
    ])
    .await;
    let (panel, _alerts) = panel_for(
        &server,
        PanelConfig {
            serialize_mutations: true,
            ..Default::default()
        },
    );
    panel.mount().await.unwrap();
    let ids: Vec<_> = panel.records().iter().filter_map(|r| r.id.clone()).collect();

    let (a, b) = tokio::join!(panel.delete(&ids[0]), panel.delete(&ids[1]));
    a.unwrap();
    b.unwrap();

    assert!(panel.records().is_empty());
    // mount + 2 x (delete + refetch)
    assert_eq!(server.request_count(), 5);
}

//! Record commands: list, chart, check, create, update, delete, watch.
//!
//! Each command builds an [`EquipmentPanel`], mounts it and drives it the
//! way the interactive panel would.

use std::future::Future;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::Result;
use equipment_client::HttpEquipmentApi;
use equipment_core::{is_valid_timestamp, violations, RecordId};
use equipment_panel::{AlertSink, EquipmentPanel};
use tracing::{error, info, warn};

use super::render;
use crate::config::ClientConfig;

/// Alert sink for the terminal: one `!! <message>` line per alert.
pub struct TerminalAlert<W> {
    out: Mutex<W>,
}

impl TerminalAlert<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write + Send + 'static> TerminalAlert<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }
}

impl<W: Write + Send + 'static> AlertSink for TerminalAlert<W> {
    fn alert(&self, message: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(out, "!! {}", message);
        let _ = out.flush();
    }
}

/// Field overrides from the command line.
#[derive(Debug, Default, Clone)]
pub struct FieldArgs {
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub timestamp: Option<String>,
}

/// Build a panel for the resolved server. Not yet mounted.
pub fn connect(client_config_path: &Path, server_override: Option<&str>) -> Result<EquipmentPanel> {
    let config = ClientConfig::load(client_config_path)?;
    let target = config.target(server_override);
    info!(server = %target.server, "connecting");

    let api = match target.timeout {
        Some(timeout) => HttpEquipmentApi::with_timeout(&target.server, timeout)?,
        None => HttpEquipmentApi::new(&target.server),
    };
    Ok(EquipmentPanel::new(Arc::new(api), Arc::new(TerminalAlert::stderr()), config.panel))
}

pub async fn list(panel: &EquipmentPanel, json: bool) -> Result<()> {
    panel.mount().await?;
    let records = panel.records();
    if json {
        println!("{}", serde_json::to_string_pretty(records.records())?);
    } else {
        print!("{}", render::records_table(&records));
    }
    Ok(())
}

pub async fn chart(panel: &EquipmentPanel, json: bool) -> Result<()> {
    panel.mount().await?;
    let series = panel.chart();
    if json {
        println!("{}", serde_json::to_string_pretty(&series)?);
    } else {
        print!("{}", render::chart(&series));
    }
    Ok(())
}

/// Print every breaching record. Returns true if any record breaches.
pub async fn check(panel: &EquipmentPanel, json: bool) -> Result<bool> {
    panel.mount().await?;
    let records = panel.records();
    let found = violations(&records);

    if json {
        let rows: Vec<_> = found
            .iter()
            .map(|(index, r, b)| {
                serde_json::json!({
                    "index": index,
                    "id": r.id,
                    "temperature": r.temperature,
                    "pressure": r.pressure,
                    "breach": b.describe(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else if found.is_empty() {
        println!("All {} records within limits.", records.len());
    } else {
        for (index, r, b) in &found {
            let id = r.id.as_ref().map(|id| id.as_str()).unwrap_or("-");
            println!("#{} id={} {} (temperature {}, pressure {})", index, id, b.describe(), r.temperature, r.pressure);
        }
    }

    Ok(!found.is_empty())
}

pub async fn create(panel: &EquipmentPanel, temperature: f64, pressure: f64, timestamp: Option<String>) -> Result<()> {
    if let Some(ts) = &timestamp {
        check_timestamp(ts);
    }
    panel.mount().await?;
    panel.open_create();
    panel.edit_form(|f| {
        f.set_temperature(temperature);
        f.set_pressure(pressure);
        if let Some(ts) = timestamp {
            f.set_timestamp(ts);
        }
    })?;
    panel.submit().await?;
    println!("Equipment created. {} records.", panel.records().len());
    Ok(())
}

pub async fn update(panel: &EquipmentPanel, id: &str, args: FieldArgs) -> Result<()> {
    if let Some(ts) = &args.timestamp {
        check_timestamp(ts);
    }
    let id = RecordId::from(id);
    panel.mount().await?;
    panel.open_edit(&id)?;
    panel.edit_form(|f| {
        if let Some(t) = args.temperature {
            f.set_temperature(t);
        }
        if let Some(p) = args.pressure {
            f.set_pressure(p);
        }
        if let Some(ts) = args.timestamp {
            f.set_timestamp(ts);
        }
    })?;
    panel.submit().await?;
    println!("Equipment {} updated.", id);
    Ok(())
}

pub async fn delete(panel: &EquipmentPanel, id: &str) -> Result<()> {
    let id = RecordId::from(id);
    panel.delete(&id).await?;
    println!("Equipment {} deleted.", id);
    Ok(())
}

/// Refresh every `interval` and redraw the chart until Ctrl-C.
pub async fn watch(panel: &EquipmentPanel, interval: Duration) -> Result<()> {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("cannot listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };
    watch_until(panel, interval, ctrl_c).await
}

/// Refresh every `interval` and redraw the chart until `stop` completes.
///
/// `stop` is polled for the whole run, including while a refresh is in
/// flight. Failed refreshes are logged and the previous chart stays on screen.
pub async fn watch_until<F>(panel: &EquipmentPanel, interval: Duration, stop: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    if interval.is_zero() {
        anyhow::bail!("Interval must be at least one second.");
    }

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    tokio::pin!(stop);

    'watch: loop {
        tokio::select! {
            _ = ticker.tick() => {
                tokio::select! {
                    result = panel.refresh() => match result {
                        Ok(_) => print!("{}", render::chart(&panel.chart())),
                        Err(e) => error!("refresh failed: {e}"),
                    },
                    _ = &mut stop => break 'watch,
                }
            }
            _ = &mut stop => break 'watch,
        }
    }

    info!("watch stopped");
    Ok(())
}

fn check_timestamp(raw: &str) {
    if !is_valid_timestamp(raw) {
        warn!("timestamp {raw:?} is not a recognizable date; it will be labelled Invalid Date");
    }
}

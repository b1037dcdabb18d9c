//! Rows mirrored from the upstream `getMonitors` payload, plus the
//! extraction that pulls them out of the raw (pre-mapping) JSON.

use serde_json::Value;

/// Subset of an upstream monitor that gets mirrored. Created on first
/// observation, never updated or deleted by this system.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorRecord {
    pub id: i64,
    pub friendly_name: Option<String>,
    pub url: Option<String>,
}

/// One append-only log row for a monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorLogRecord {
    pub id: i64,
    pub monitor_id: i64,
    pub log_type: Option<i32>,
    pub datetime: Option<i64>,
    pub duration: Option<i32>,
    pub reason_code: Option<String>,
    pub reason_detail: Option<String>,
}

fn string_field(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(str::to_string)
}

impl MonitorRecord {
    /// Extracts a record from one raw monitor object. Returns `None` when
    /// the id is missing or non-numeric; such entries cannot be mirrored.
    pub fn from_json(monitor: &Value) -> Option<Self> {
        Some(Self {
            id: monitor.get("id")?.as_i64()?,
            friendly_name: string_field(monitor, "friendly_name"),
            url: string_field(monitor, "url"),
        })
    }
}

impl MonitorLogRecord {
    pub fn from_json(monitor_id: i64, log: &Value) -> Option<Self> {
        // The upstream nests the outage reason as {code, detail}.
        let reason = log.get("reason");
        Some(Self {
            id: log.get("id")?.as_i64()?,
            monitor_id,
            log_type: log.get("type").and_then(Value::as_i64).map(|v| v as i32),
            datetime: log.get("datetime").and_then(Value::as_i64),
            duration: log.get("duration").and_then(Value::as_i64).map(|v| v as i32),
            reason_code: reason.and_then(|r| {
                r.get("code")
                    .map(|c| c.as_str().map(str::to_string).unwrap_or_else(|| c.to_string()))
            }),
            reason_detail: reason.and_then(|r| string_field(r, "detail")),
        })
    }
}

/// Pulls every mirrorable monitor and log row out of a raw `getMonitors`
/// response body.
pub fn extract_mirror_records(body: &Value) -> (Vec<MonitorRecord>, Vec<MonitorLogRecord>) {
    let mut monitors = Vec::new();
    let mut logs = Vec::new();

    if let Some(Value::Array(raw_monitors)) = body.get("monitors") {
        for raw in raw_monitors {
            let Some(monitor) = MonitorRecord::from_json(raw) else {
                continue;
            };
            if let Some(Value::Array(raw_logs)) = raw.get("logs") {
                logs.extend(
                    raw_logs
                        .iter()
                        .filter_map(|log| MonitorLogRecord::from_json(monitor.id, log)),
                );
            }
            monitors.push(monitor);
        }
    }

    (monitors, logs)
}

//! Translation tables for the numeric enum codes the upstream API returns.
//!
//! Codes follow https://uptimerobot.com/api/#parameters. A code missing
//! from its table passes through unchanged, as do fields that are not
//! numbers; fields are only touched when present on the record.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::Value;

type CodeTable = HashMap<i64, &'static str>;

pub static MONITOR_TYPES: Lazy<CodeTable> = Lazy::new(|| {
    HashMap::from([
        (1, "HTTP(s)"),
        (2, "Keyword"),
        (3, "Ping"),
        (4, "Port"),
        (5, "Heartbeat"),
    ])
});

pub static MONITOR_SUB_TYPES: Lazy<CodeTable> = Lazy::new(|| {
    HashMap::from([
        (1, "HTTP (80)"),
        (2, "HTTPS (443)"),
        (3, "FTP (21)"),
        (4, "SMTP (25)"),
        (5, "POP3 (110)"),
        (6, "IMAP (143)"),
        (99, "Custom Port"),
    ])
});

pub static MONITOR_STATUSES: Lazy<CodeTable> = Lazy::new(|| {
    HashMap::from([
        (0, "paused"),
        (1, "not checked yet"),
        (2, "up"),
        (8, "seems down"),
        (9, "down"),
    ])
});

pub static KEYWORD_TYPES: Lazy<CodeTable> =
    Lazy::new(|| HashMap::from([(1, "exists"), (2, "not exists")]));

pub static KEYWORD_CASE_TYPES: Lazy<CodeTable> =
    Lazy::new(|| HashMap::from([(0, "case sensitive"), (1, "case insensitive")]));

pub static HTTP_AUTH_TYPES: Lazy<CodeTable> =
    Lazy::new(|| HashMap::from([(1, "HTTP Basic Auth"), (2, "Digest")]));

pub static HTTP_METHODS: Lazy<CodeTable> = Lazy::new(|| {
    HashMap::from([
        (1, "HEAD"),
        (2, "GET"),
        (3, "POST"),
        (4, "PUT"),
        (5, "PATCH"),
        (6, "DELETE"),
        (7, "OPTIONS"),
    ])
});

pub static POST_TYPES: Lazy<CodeTable> =
    Lazy::new(|| HashMap::from([(1, "key-value"), (2, "raw data")]));

pub static POST_CONTENT_TYPES: Lazy<CodeTable> =
    Lazy::new(|| HashMap::from([(0, "text/html"), (1, "application/json")]));

pub static ALERT_CONTACT_TYPES: Lazy<CodeTable> = Lazy::new(|| {
    HashMap::from([
        (1, "sms"),
        (2, "e-mail"),
        (3, "x (twitter)"),
        (5, "webhook"),
        (6, "pushbullet"),
        (7, "zapier"),
        (8, "pro-sms"),
        (9, "pushover"),
        (11, "slack"),
        (14, "voice-call"),
        (15, "splunk"),
        (16, "pagerduty"),
        (17, "opsgenie"),
        (20, "ms-teams"),
        (21, "google-chat"),
        (23, "discord"),
    ])
});

pub static ALERT_CONTACT_STATUSES: Lazy<CodeTable> =
    Lazy::new(|| HashMap::from([(0, "not activated"), (1, "paused"), (2, "active")]));

pub static MWINDOW_TYPES: Lazy<CodeTable> = Lazy::new(|| {
    HashMap::from([(1, "Once"), (2, "Daily"), (3, "Weekly"), (4, "Monthly")])
});

pub static MWINDOW_STATUSES: Lazy<CodeTable> =
    Lazy::new(|| HashMap::from([(0, "paused"), (1, "active")]));

pub static PSP_SORTS: Lazy<CodeTable> = Lazy::new(|| {
    HashMap::from([
        (1, "friendly name (a-z)"),
        (2, "friendly name (z-a)"),
        (3, "status (up-down-paused)"),
        (4, "status (down-up-paused)"),
    ])
});

pub static PSP_STATUSES: Lazy<CodeTable> =
    Lazy::new(|| HashMap::from([(0, "paused"), (1, "active")]));

/// Replaces a numeric field with its display string in place. Missing
/// fields, non-numeric values and unknown codes are left untouched.
fn map_field(record: &mut Value, field: &str, table: &CodeTable) {
    let Some(value) = record.get_mut(field) else {
        return;
    };
    if let Some(code) = value.as_i64() {
        if let Some(label) = table.get(&code) {
            *value = Value::String((*label).to_string());
        }
    }
}

fn map_each<F: Fn(&mut Value)>(records: Option<&mut Value>, map_record: F) {
    if let Some(Value::Array(records)) = records {
        for record in records {
            map_record(record);
        }
    }
}

fn map_monitor(monitor: &mut Value) {
    map_field(monitor, "type", &MONITOR_TYPES);
    map_field(monitor, "sub_type", &MONITOR_SUB_TYPES);
    map_field(monitor, "status", &MONITOR_STATUSES);
    map_field(monitor, "keyword_type", &KEYWORD_TYPES);
    map_field(monitor, "keyword_case_type", &KEYWORD_CASE_TYPES);
    map_field(monitor, "http_auth_type", &HTTP_AUTH_TYPES);
    map_field(monitor, "http_method", &HTTP_METHODS);
    map_field(monitor, "post_type", &POST_TYPES);
    map_field(monitor, "post_content_type", &POST_CONTENT_TYPES);
    map_each(monitor.get_mut("alert_contacts"), |contact| {
        map_field(contact, "type", &ALERT_CONTACT_TYPES);
        map_field(contact, "status", &ALERT_CONTACT_STATUSES);
    });
    map_each(monitor.get_mut("mwindows"), |window| {
        map_field(window, "type", &MWINDOW_TYPES);
        map_field(window, "status", &MWINDOW_STATUSES);
    });
}

/// Maps the enum fields of every monitor in a `getMonitors` response body.
pub fn map_monitors_response(body: &mut Value) {
    map_each(body.get_mut("monitors"), map_monitor);
    // Single-monitor detail responses from the status-page API nest the
    // record under "monitor" instead.
    if let Some(monitor) = body.get_mut("monitor") {
        if monitor.is_object() {
            map_monitor(monitor);
        }
    }
}

/// Maps the enum fields of every public status page in a `getPSPs` response.
pub fn map_psps_response(body: &mut Value) {
    map_each(body.get_mut("psps"), |psp| {
        map_field(psp, "sort", &PSP_SORTS);
        map_field(psp, "status", &PSP_STATUSES);
    });
}

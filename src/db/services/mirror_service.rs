//! Best-effort mirroring of fetched monitors and logs.
//!
//! This is a cache-warming side channel, not a transactional system:
//! partial writes are expected, every failure is logged and swallowed, and
//! nothing here ever affects an HTTP response.

use std::collections::HashSet;

use sqlx::{PgPool, Row};
use tracing::{debug, warn};

use crate::db::models::{MonitorLogRecord, MonitorRecord};

/// Inserts monitors not yet present in the mirror. Existing rows are never
/// touched; the primary key plus `ON CONFLICT DO NOTHING` keeps the
/// operation idempotent even when two requests race.
pub async fn mirror_monitors(pool: &PgPool, monitors: &[MonitorRecord]) {
    if monitors.is_empty() {
        return;
    }

    let existing: HashSet<i64> = match sqlx::query("SELECT id FROM monitors")
        .fetch_all(pool)
        .await
    {
        Ok(rows) => rows.iter().map(|row| row.get::<i64, _>("id")).collect(),
        Err(err) => {
            warn!(error = %err, "failed to read mirrored monitor ids, skipping mirror pass");
            return;
        }
    };

    let mut inserted = 0usize;
    for monitor in monitors.iter().filter(|m| !existing.contains(&m.id)) {
        let result = sqlx::query(
            "INSERT INTO monitors (id, friendly_name, url) VALUES ($1, $2, $3)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(monitor.id)
        .bind(&monitor.friendly_name)
        .bind(&monitor.url)
        .execute(pool)
        .await;

        match result {
            Ok(_) => inserted += 1,
            Err(err) => {
                warn!(monitor_id = monitor.id, error = %err, "failed to mirror monitor")
            }
        }
    }

    if inserted > 0 {
        debug!(inserted, "mirrored new monitors");
    }
}

/// Inserts log rows not yet present for their monitor. Logs are append-only
/// and deduplicated by primary key against previously stored rows.
pub async fn mirror_monitor_logs(pool: &PgPool, logs: &[MonitorLogRecord]) {
    let monitor_ids: HashSet<i64> = logs.iter().map(|log| log.monitor_id).collect();

    for monitor_id in monitor_ids {
        let existing: HashSet<i64> =
            match sqlx::query("SELECT id FROM monitor_logs WHERE monitor_id = $1")
                .bind(monitor_id)
                .fetch_all(pool)
                .await
            {
                Ok(rows) => rows.iter().map(|row| row.get::<i64, _>("id")).collect(),
                Err(err) => {
                    warn!(monitor_id, error = %err,
                        "failed to read mirrored log ids, skipping this monitor");
                    continue;
                }
            };

        for log in logs
            .iter()
            .filter(|log| log.monitor_id == monitor_id && !existing.contains(&log.id))
        {
            let result = sqlx::query(
                "INSERT INTO monitor_logs (id, monitor_id, type, datetime, duration, reason_code, reason_detail)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 ON CONFLICT (id) DO NOTHING",
            )
            .bind(log.id)
            .bind(log.monitor_id)
            .bind(log.log_type)
            .bind(log.datetime)
            .bind(log.duration)
            .bind(&log.reason_code)
            .bind(&log.reason_detail)
            .execute(pool)
            .await;

            if let Err(err) = result {
                warn!(log_id = log.id, monitor_id, error = %err, "failed to mirror monitor log");
            }
        }
    }
}

/// Runs a full mirror pass: monitors first so the log rows' foreign keys
/// resolve, then logs.
pub async fn mirror_fetched_monitors(
    pool: PgPool,
    monitors: Vec<MonitorRecord>,
    logs: Vec<MonitorLogRecord>,
) {
    mirror_monitors(&pool, &monitors).await;
    mirror_monitor_logs(&pool, &logs).await;
}

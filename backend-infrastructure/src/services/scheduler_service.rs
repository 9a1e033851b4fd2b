use std::time::Duration;

use chrono::{DateTime, Local, TimeZone, Utc};
use tracing::{info, warn};

use backend_application::commands::detect_commands;
use backend_application::AppState;
use backend_domain::RuntimeConfig;

/// Daily SILENT_LEAK scan over every owner at `leak_scan_hour:leak_scan_minute`
/// local time.
pub async fn schedule_leak_scans(state: AppState) {
    loop {
        let now = Local::now();
        let Some(next) = next_scan_time(&state.config, now) else {
            warn!("leak scan time cannot be scheduled, scans disabled");
            return;
        };
        let sleep_ms = next.signed_duration_since(now).num_milliseconds().max(0) as u64;
        tokio::time::sleep(Duration::from_millis(sleep_ms)).await;

        let created = detect_commands::detect_leaks_for_all_owners(&state, Utc::now()).await;
        info!("scheduled leak scan finished, {} anomalies created", created);
    }
}

/// Drains the audit retry buffer every `audit_retry_seconds`.
pub async fn schedule_audit_retries(state: AppState) {
    let period = Duration::from_secs(state.config.audit_retry_seconds.max(1));
    let mut interval = tokio::time::interval(period);
    interval.tick().await;
    loop {
        interval.tick().await;
        if state.audit.pending_len().await == 0 {
            continue;
        }
        let remaining = state.audit.flush_pending().await;
        if remaining > 0 {
            warn!("{} audit entries still waiting for the store", remaining);
        } else {
            info!("audit retry buffer drained");
        }
    }
}

pub fn next_scan_time<Tz: TimeZone>(config: &RuntimeConfig, now: DateTime<Tz>) -> Option<DateTime<Tz>> {
    let timezone = now.timezone();
    let today = now.date_naive();
    for day in [Some(today), today.succ_opt(), today.succ_opt().and_then(|d| d.succ_opt())] {
        let target = day?.and_hms_opt(config.leak_scan_hour, config.leak_scan_minute, 0)?;
        // skipped local times (DST gaps) fall through to the next day
        if let Some(candidate) = timezone.from_local_datetime(&target).earliest() {
            if candidate > now {
                return Some(candidate);
            }
        }
    }
    None
}

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    transactions: AtomicU64,
    transaction_errors: AtomicU64,
    detection_runs: AtomicU64,
    rule_failures: AtomicU64,
    anomalies: AtomicU64,
    resolutions: AtomicU64,
    resolution_conflicts: AtomicU64,
    audit_failures: AtomicU64,
}

impl Metrics {
    pub fn record_transactions(&self, count: usize) {
        self.transactions.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_transaction_error(&self) {
        self.transaction_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_detection(&self, rule_failures: usize, anomalies: usize) {
        self.detection_runs.fetch_add(1, Ordering::Relaxed);
        self.rule_failures
            .fetch_add(rule_failures as u64, Ordering::Relaxed);
        self.anomalies.fetch_add(anomalies as u64, Ordering::Relaxed);
    }

    pub fn record_resolution(&self) {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_resolution_conflict(&self) {
        self.resolution_conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_audit_failure(&self) {
        self.audit_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn audit_failures(&self) -> u64 {
        self.audit_failures.load(Ordering::Relaxed)
    }

    pub fn render_prometheus(&self) -> String {
        let counters = [
            ("ledgerguard_transactions_total", &self.transactions),
            ("ledgerguard_transaction_errors_total", &self.transaction_errors),
            ("ledgerguard_detection_runs_total", &self.detection_runs),
            ("ledgerguard_rule_failures_total", &self.rule_failures),
            ("ledgerguard_anomalies_total", &self.anomalies),
            ("ledgerguard_resolutions_total", &self.resolutions),
            ("ledgerguard_resolution_conflicts_total", &self.resolution_conflicts),
            ("ledgerguard_audit_failures_total", &self.audit_failures),
        ];
        let mut out = String::new();
        for (name, counter) in counters {
            out.push_str(&format!(
                "# TYPE {name} counter\n{name} {}\n",
                counter.load(Ordering::Relaxed)
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prometheus_output_lists_counters() {
        let metrics = Metrics::default();
        metrics.record_transactions(3);
        metrics.record_detection(1, 2);
        let text = metrics.render_prometheus();
        assert!(text.contains("ledgerguard_transactions_total 3\n"));
        assert!(text.contains("ledgerguard_rule_failures_total 1\n"));
        assert!(text.contains("ledgerguard_anomalies_total 2\n"));
        assert!(text.contains("# TYPE ledgerguard_audit_failures_total counter\n"));
    }
}

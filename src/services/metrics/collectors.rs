use std::sync::Arc;

use super::MetricsRegistry;
use crate::services::notify::Channel;

/// Records search traffic
pub struct SearchMetricsCollector {
    metrics: Arc<MetricsRegistry>,
}

impl SearchMetricsCollector {
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self { metrics }
    }

    pub fn record_search(&self, filtered: bool, results: usize) {
        self.metrics
            .search_requests_total
            .with_label_values(&[if filtered { "true" } else { "false" }])
            .inc();
        self.metrics.search_results.observe(results as f64);
    }
}

/// Records reminder poller activity
pub struct ReminderMetricsCollector {
    metrics: Arc<MetricsRegistry>,
}

impl ReminderMetricsCollector {
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self { metrics }
    }

    pub fn record_tick(&self, ok: bool, selected: usize) {
        let outcome = if ok { "ok" } else { "error" };
        self.metrics.reminder_ticks_total.with_label_values(&[outcome]).inc();
        if ok {
            self.metrics.reminder_last_tick_selected.set(selected as f64);
        }
    }

    pub fn record_dispatch(&self, channel: Channel, outcome: &str) {
        self.metrics
            .reminder_dispatch_total
            .with_label_values(&[channel.as_str(), outcome])
            .inc();
    }
}

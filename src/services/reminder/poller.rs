use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;

use super::{ReminderError, ReminderStore};
use crate::config::ReminderConfig;
use crate::modules::property::model::Property;
use crate::services::metrics::{MetricsRegistry, ReminderMetricsCollector};
use crate::services::notify::{templates, Notifier};

/// Counts for one pass over stale listings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub selected: usize,
    pub notified: usize,
    pub failed: usize,
    pub skipped: usize,
    pub stamped: usize,
}

enum Dispatch {
    Sent,
    Failed,
    Skipped,
}

/// Periodically reminds owners whose listings are still awaiting verification.
pub struct ReminderPoller {
    store: Arc<dyn ReminderStore>,
    notifier: Arc<dyn Notifier>,
    config: ReminderConfig,
    metrics: Option<ReminderMetricsCollector>,
}

impl ReminderPoller {
    pub fn new(
        store: Arc<dyn ReminderStore>,
        notifier: Arc<dyn Notifier>,
        config: ReminderConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(ReminderMetricsCollector::new(metrics));
        self
    }

    /// Start the background loop. Never returns.
    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            staleness_secs = self.config.staleness.num_seconds(),
            channel = %self.notifier.channel(),
            "🔔 Verification reminder poller started"
        );

        loop {
            interval.tick().await;

            if let Err(e) = self.tick(Utc::now()).await {
                tracing::error!("Reminder tick abandoned: {}", e);
            }
        }
    }

    /// One pass: select stale pending listings, notify each owner and stamp
    /// `last_checked = now`. A failed scan aborts the tick; per-listing
    /// failures are logged and counted.
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<TickReport, ReminderError> {
        let cutoff = match self.cutoff(now) {
            Ok(cutoff) => cutoff,
            Err(e) => {
                if let Some(m) = &self.metrics {
                    m.record_tick(false, 0);
                }
                return Err(e);
            }
        };
        tracing::debug!(%cutoff, "Reminder tick");

        let stale = match self.store.find_stale_pending(cutoff).await {
            Ok(stale) => stale,
            Err(e) => {
                if let Some(m) = &self.metrics {
                    m.record_tick(false, 0);
                }
                return Err(e);
            }
        };

        let mut report = TickReport {
            selected: stale.len(),
            ..TickReport::default()
        };

        if stale.is_empty() {
            tracing::info!("No listings awaiting a verification reminder");
            if let Some(m) = &self.metrics {
                m.record_tick(true, 0);
            }
            return Ok(report);
        }

        let outcomes = join_all(stale.iter().map(|p| self.remind(p, now))).await;

        for (dispatch, stamped) in outcomes {
            match dispatch {
                Dispatch::Sent => report.notified += 1,
                Dispatch::Failed => report.failed += 1,
                Dispatch::Skipped => report.skipped += 1,
            }
            if stamped {
                report.stamped += 1;
            }
        }

        if let Some(m) = &self.metrics {
            m.record_tick(true, report.selected);
        }

        tracing::info!(
            selected = report.selected,
            notified = report.notified,
            failed = report.failed,
            skipped = report.skipped,
            stamped = report.stamped,
            "Reminder tick complete"
        );

        Ok(report)
    }

    /// `now - staleness`; the window must be positive and the result representable.
    fn cutoff(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, ReminderError> {
        let staleness = self.config.staleness;
        if staleness <= chrono::Duration::zero() {
            return Err(ReminderError::InvalidWindow(format!(
                "staleness must be positive (got {}s)",
                staleness.num_seconds()
            )));
        }
        now.checked_sub_signed(staleness).ok_or_else(|| {
            ReminderError::InvalidWindow(format!(
                "{}s before {} is out of range",
                staleness.num_seconds(),
                now
            ))
        })
    }

    async fn remind(&self, property: &Property, now: DateTime<Utc>) -> (Dispatch, bool) {
        // Stamped whatever the dispatch outcome, without waiting on the send.
        tokio::join!(self.dispatch(property), self.stamp(property, now))
    }

    async fn dispatch(&self, property: &Property) -> Dispatch {
        let channel = self.notifier.channel();

        let dispatch = match templates::owner_destination(property, channel) {
            None => {
                tracing::warn!(property_id = %property.id, %channel, "Listing owner has no contact for channel");
                Dispatch::Skipped
            }
            Some(to) => {
                let notification = templates::verification_reminder(property, to);
                match self.notifier.send(&notification).await {
                    Ok(()) => {
                        tracing::info!(property_id = %property.id, to = %notification.to, "Reminder dispatched");
                        Dispatch::Sent
                    }
                    Err(e) => {
                        tracing::error!(property_id = %property.id, "Reminder dispatch failed: {}", e);
                        Dispatch::Failed
                    }
                }
            }
        };

        if let Some(m) = &self.metrics {
            let outcome = match dispatch {
                Dispatch::Sent => "sent",
                Dispatch::Failed => "failed",
                Dispatch::Skipped => "skipped",
            };
            m.record_dispatch(channel, outcome);
        }

        dispatch
    }

    async fn stamp(&self, property: &Property, now: DateTime<Utc>) -> bool {
        match self.store.mark_checked(&property.id, now).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(property_id = %property.id, "Failed to stamp last_checked: {}", e);
                false
            }
        }
    }
}

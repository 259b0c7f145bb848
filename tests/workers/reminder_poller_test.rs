use chrono::{Duration, Utc};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use estate_pro::config::ReminderConfig;
use estate_pro::modules::property::model::{ListingStatus, Property};
use estate_pro::services::metrics::MetricsRegistry;
use estate_pro::services::reminder::{ReminderError, ReminderPoller, TickReport};

use crate::common::{GatedNotifier, MemoryStore, RecordingNotifier};

fn config(staleness: Duration) -> ReminderConfig {
    ReminderConfig {
        enabled: true,
        interval: std::time::Duration::from_secs(60),
        staleness,
    }
}

fn listing(phone: &str, status: ListingStatus, checked_ago: Duration) -> Property {
    let now = Utc::now();
    let mut p = Property::new_listing("owner-1", "owner@example.com", "Meena", now - checked_ago);
    p.phone = Some(phone.to_string());
    p.house_no = Some("4".to_string());
    p.street = Some("Temple St".to_string());
    p.city = Some("Chennai".to_string());
    p.status = status.as_str().to_string();
    p
}

fn poller(store: Arc<MemoryStore>, notifier: Arc<RecordingNotifier>, staleness: Duration) -> ReminderPoller {
    ReminderPoller::new(store, notifier, config(staleness))
}

#[tokio::test]
async fn stale_pending_listing_is_reminded_and_stamped() {
    let p = listing("9000000001", ListingStatus::PendingVerification, Duration::minutes(10));
    let id = p.id.clone();
    let store = Arc::new(MemoryStore::with(vec![p]));
    let notifier = Arc::new(RecordingNotifier::default());

    let now = Utc::now();
    let report = poller(store.clone(), notifier.clone(), Duration::minutes(3))
        .tick(now)
        .await
        .unwrap();

    assert_eq!(
        report,
        TickReport {
            selected: 1,
            notified: 1,
            failed: 0,
            skipped: 0,
            stamped: 1
        }
    );
    let sent = notifier.sent_to("9000000001");
    assert_eq!(sent.len(), 1);
    assert!(sent[0].body.contains("Hello Meena"));
    assert!(sent[0].body.contains("4, Temple St, Chennai"));
    assert_eq!(store.last_checked(&id), now);
}

#[tokio::test]
async fn verified_listing_is_never_selected() {
    let store = Arc::new(MemoryStore::with(vec![
        listing("9000000001", ListingStatus::Verified, Duration::days(365)),
        listing("9000000002", ListingStatus::Pending, Duration::days(365)),
        listing("9000000003", ListingStatus::Rented, Duration::days(365)),
    ]));
    let notifier = Arc::new(RecordingNotifier::default());

    let report = poller(store, notifier.clone(), Duration::minutes(3))
        .tick(Utc::now())
        .await
        .unwrap();

    assert_eq!(report.selected, 0);
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn recently_checked_listing_waits_for_threshold() {
    let store = Arc::new(MemoryStore::with(vec![listing(
        "9000000001",
        ListingStatus::PendingVerification,
        Duration::minutes(2),
    )]));
    let notifier = Arc::new(RecordingNotifier::default());

    let report = poller(store, notifier.clone(), Duration::minutes(3))
        .tick(Utc::now())
        .await
        .unwrap();

    assert_eq!(report, TickReport::default());
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn second_tick_within_window_dispatches_nothing() {
    let store = Arc::new(MemoryStore::with(vec![
        listing("9000000001", ListingStatus::PendingVerification, Duration::minutes(10)),
        listing("9000000002", ListingStatus::PendingVerification, Duration::hours(2)),
    ]));
    let notifier = Arc::new(RecordingNotifier::default());
    let poller = poller(store, notifier.clone(), Duration::minutes(3));

    let now = Utc::now();
    let first = poller.tick(now).await.unwrap();
    let second = poller.tick(now + Duration::minutes(1)).await.unwrap();

    assert_eq!(first.notified, 2);
    assert_eq!(second.selected, 0);
    assert_eq!(notifier.count(), 2);

    // Eligible again once a full window has passed.
    let third = poller.tick(now + Duration::minutes(4)).await.unwrap();
    assert_eq!(third.notified, 2);
}

#[tokio::test]
async fn failed_dispatch_is_stamped_and_does_not_stop_the_tick() {
    let failing = listing("9000000001", ListingStatus::PendingVerification, Duration::minutes(10));
    let failing_id = failing.id.clone();
    let store = Arc::new(MemoryStore::with(vec![
        failing,
        listing("9000000002", ListingStatus::PendingVerification, Duration::minutes(10)),
    ]));
    let notifier = Arc::new(RecordingNotifier::default());
    notifier.fail_for("9000000001");
    let poller = poller(store.clone(), notifier.clone(), Duration::minutes(3));

    let now = Utc::now();
    let report = poller.tick(now).await.unwrap();

    assert_eq!(report.selected, 2);
    assert_eq!(report.notified, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.stamped, 2);
    assert_eq!(notifier.sent_to("9000000002").len(), 1);
    assert_eq!(store.last_checked(&failing_id), now);

    // No retry inside the window.
    let again = poller.tick(now + Duration::minutes(1)).await.unwrap();
    assert_eq!(again.selected, 0);
}

#[tokio::test]
async fn listing_without_contact_is_skipped_but_stamped() {
    let mut p = listing("", ListingStatus::PendingVerification, Duration::minutes(10));
    p.phone = None;
    p.owner_email = String::new();
    let id = p.id.clone();
    let store = Arc::new(MemoryStore::with(vec![p]));
    let notifier = Arc::new(RecordingNotifier::default());

    let now = Utc::now();
    let report = poller(store.clone(), notifier.clone(), Duration::minutes(3))
        .tick(now)
        .await
        .unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.stamped, 1);
    assert_eq!(notifier.count(), 0);
    assert_eq!(store.last_checked(&id), now);
}

#[tokio::test]
async fn failed_scan_abandons_tick_and_next_tick_starts_fresh() {
    let store = Arc::new(MemoryStore::with(vec![listing(
        "9000000001",
        ListingStatus::PendingVerification,
        Duration::minutes(10),
    )]));
    let notifier = Arc::new(RecordingNotifier::default());
    let metrics = MetricsRegistry::new().unwrap();
    let poller = poller(store.clone(), notifier.clone(), Duration::minutes(3)).with_metrics(metrics.clone());

    store.fail_scan.store(true, Ordering::SeqCst);
    assert!(poller.tick(Utc::now()).await.is_err());
    assert_eq!(notifier.count(), 0);

    store.fail_scan.store(false, Ordering::SeqCst);
    let report = poller.tick(Utc::now()).await.unwrap();
    assert_eq!(report.notified, 1);

    assert_eq!(metrics.reminder_ticks_total.with_label_values(&["error"]).get(), 1.0);
    assert_eq!(metrics.reminder_ticks_total.with_label_values(&["ok"]).get(), 1.0);
    assert_eq!(
        metrics.reminder_dispatch_total.with_label_values(&["log", "sent"]).get(),
        1.0
    );
}

#[tokio::test]
async fn many_listings_are_all_dispatched_in_one_tick() {
    let rows: Vec<Property> = (0..25)
        .map(|i| {
            listing(
                &format!("90000000{:02}", i),
                ListingStatus::PendingVerification,
                Duration::days(6),
            )
        })
        .collect();
    let store = Arc::new(MemoryStore::with(rows));
    let notifier = Arc::new(RecordingNotifier::default());

    let report = poller(store, notifier.clone(), Duration::days(5))
        .tick(Utc::now())
        .await
        .unwrap();

    assert_eq!(report.selected, 25);
    assert_eq!(report.notified, 25);
    assert_eq!(notifier.count(), 25);
}

#[tokio::test]
async fn failed_stamp_is_counted_and_listing_is_selected_again() {
    let broken = listing("9000000001", ListingStatus::PendingVerification, Duration::minutes(10));
    let broken_id = broken.id.clone();
    let broken_checked = broken.last_checked;
    let healthy = listing("9000000002", ListingStatus::PendingVerification, Duration::minutes(10));
    let healthy_id = healthy.id.clone();
    let store = Arc::new(MemoryStore::with(vec![broken, healthy]));
    store.fail_stamp_for(&broken_id);
    let notifier = Arc::new(RecordingNotifier::default());
    let poller = poller(store.clone(), notifier.clone(), Duration::minutes(3));

    let now = Utc::now();
    let report = poller.tick(now).await.unwrap();

    assert_eq!(
        report,
        TickReport {
            selected: 2,
            notified: 2,
            failed: 0,
            skipped: 0,
            stamped: 1
        }
    );
    assert_eq!(store.last_checked(&healthy_id), now);
    assert_eq!(store.last_checked(&broken_id), broken_checked);

    // The unstamped listing is still stale on the next tick.
    let next = now + Duration::minutes(1);
    store.heal_stamp_for(&broken_id);
    let again = poller.tick(next).await.unwrap();
    assert_eq!(again.selected, 1);
    assert_eq!(again.stamped, 1);
    assert_eq!(notifier.sent_to("9000000001").len(), 2);
    assert_eq!(store.last_checked(&broken_id), next);
}

#[tokio::test]
async fn stamp_does_not_wait_for_a_slow_send() {
    let p = listing("9000000001", ListingStatus::PendingVerification, Duration::minutes(10));
    let id = p.id.clone();
    let store = Arc::new(MemoryStore::with(vec![p]));
    let notifier = Arc::new(GatedNotifier::closed());
    let poller = Arc::new(ReminderPoller::new(
        store.clone(),
        notifier.clone(),
        config(Duration::minutes(3)),
    ));

    let now = Utc::now();
    let tick = tokio::spawn({
        let poller = poller.clone();
        async move { poller.tick(now).await }
    });

    let mut stamped = false;
    for _ in 0..100 {
        if store.last_checked(&id) == now {
            stamped = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(stamped, "listing was not stamped while the send was held");
    assert_eq!(notifier.inner.count(), 0);

    notifier.release(1);
    let report = tick.await.unwrap().unwrap();
    assert_eq!(report.notified, 1);
    assert_eq!(report.stamped, 1);
    assert_eq!(notifier.inner.count(), 1);
}

#[tokio::test]
async fn non_positive_staleness_is_rejected_without_dispatching() {
    let store = Arc::new(MemoryStore::with(vec![listing(
        "9000000001",
        ListingStatus::PendingVerification,
        Duration::minutes(10),
    )]));
    let notifier = Arc::new(RecordingNotifier::default());
    let metrics = MetricsRegistry::new().unwrap();

    for staleness in [Duration::seconds(-600), Duration::zero()] {
        let poller = poller(store.clone(), notifier.clone(), staleness).with_metrics(metrics.clone());
        let err = poller.tick(Utc::now()).await.unwrap_err();
        assert!(matches!(err, ReminderError::InvalidWindow(_)));
    }

    assert_eq!(notifier.count(), 0);
    assert_eq!(metrics.reminder_ticks_total.with_label_values(&["error"]).get(), 2.0);
}

#[tokio::test]
async fn staleness_past_the_calendar_is_an_error_not_a_panic() {
    let store = Arc::new(MemoryStore::with(vec![listing(
        "9000000001",
        ListingStatus::PendingVerification,
        Duration::minutes(10),
    )]));
    let notifier = Arc::new(RecordingNotifier::default());
    let huge = Duration::try_seconds(1_000_000_000_000_000).unwrap();

    let err = poller(store, notifier.clone(), huge)
        .tick(Utc::now())
        .await
        .unwrap_err();

    assert!(matches!(err, ReminderError::InvalidWindow(_)));
    assert_eq!(notifier.count(), 0);
}

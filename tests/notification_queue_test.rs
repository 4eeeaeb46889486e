//! Integration tests for the notification queue

use bazaar::{
    NotificationAction, NotificationConfig, NotificationEvent, NotificationPatch,
    NotificationQueue, NotificationRequest, NotificationType, RemovalReason,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::time::sleep;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[tokio::test(start_paused = true)]
async fn test_expires_after_duration() {
    let queue = NotificationQueue::with_defaults();
    let id = queue.add_notification(
        NotificationRequest::new(NotificationType::Info, "x").duration(ms(1000)),
    );

    sleep(ms(500)).await;
    assert!(queue.get(id).is_some());

    sleep(ms(600)).await;
    assert!(queue.get(id).is_none());
    assert!(queue.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_timer_removes_without_reads() {
    let queue = NotificationQueue::with_defaults();
    let mut events = queue.subscribe();
    let id = queue.warning("Low stock", Some("Only 3 crates of mango left"), Some(ms(1000)));

    sleep(ms(1100)).await;

    assert!(matches!(
        events.try_recv(),
        Ok(NotificationEvent::Added { notification }) if notification.id == id
    ));
    assert!(matches!(
        events.try_recv(),
        Ok(NotificationEvent::Removed {
            id: removed,
            reason: RemovalReason::Expired,
        }) if removed == id
    ));
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test(start_paused = true)]
async fn test_default_durations_apply() {
    let queue = NotificationQueue::with_defaults();
    let info = queue.info("info", None, None);
    let error = queue.error("error", None, None);

    sleep(ms(4100)).await;
    assert!(queue.get(info).is_none());
    assert!(queue.get(error).is_some());

    sleep(ms(2000)).await;
    assert!(queue.get(error).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_persistent_never_expires() {
    let queue = NotificationQueue::with_defaults();
    let zero = queue.error("x", None, Some(Duration::ZERO));
    let pinned = queue.add_notification(
        NotificationRequest::new(NotificationType::Error, "y")
            .duration(ms(1000))
            .persistent(),
    );

    sleep(Duration::from_secs(3600)).await;
    assert_eq!(queue.len(), 2);

    assert!(queue.remove_notification(zero));
    assert!(queue.remove_notification(pinned));
    assert!(queue.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_hide_then_remove_after_delay() {
    let queue = NotificationQueue::with_defaults();
    let mut events = queue.subscribe();
    let id = queue.success("Vendor approved", None, None);
    let _ = events.try_recv();

    queue.hide_notification(id);

    assert!(queue.visible().is_empty());
    let all = queue.notifications();
    assert_eq!(all.len(), 1);
    assert!(!all[0].is_visible);
    assert!(matches!(
        events.try_recv(),
        Ok(NotificationEvent::Hidden { id: hidden }) if hidden == id
    ));

    sleep(ms(350)).await;
    assert!(queue.notifications().is_empty());
    assert!(matches!(
        events.try_recv(),
        Ok(NotificationEvent::Removed { reason: RemovalReason::Expired, .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_hide_keeps_earlier_expiry() {
    let queue = NotificationQueue::with_defaults();
    let id = queue.info("x", None, Some(ms(100)));

    queue.hide_notification(id);
    sleep(ms(150)).await;

    assert!(queue.get(id).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_hide_twice_and_missing_are_noops() {
    let queue = NotificationQueue::with_defaults();
    let mut events = queue.subscribe();
    let id = queue.info("x", None, Some(Duration::ZERO));
    let _ = events.try_recv();

    queue.hide_notification(id);
    queue.hide_notification(id);
    assert!(matches!(events.try_recv(), Ok(NotificationEvent::Hidden { .. })));
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    queue.remove_notification(id);
    queue.hide_notification(id);
    assert!(queue.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_manual_remove_races_expiry() {
    let queue = NotificationQueue::with_defaults();
    let mut events = queue.subscribe();
    let id = queue.info("x", None, Some(ms(1000)));
    let _ = events.try_recv();

    sleep(ms(200)).await;
    assert!(queue.remove_notification(id));
    assert!(!queue.remove_notification(id));

    sleep(ms(2000)).await;
    assert!(matches!(
        events.try_recv(),
        Ok(NotificationEvent::Removed { reason: RemovalReason::Dismissed, .. })
    ));
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test(start_paused = true)]
async fn test_update_does_not_reset_expiry() {
    let queue = NotificationQueue::with_defaults();
    let id = queue.info("Uploading", None, Some(ms(1000)));
    let created_at = queue.get(id).unwrap().created_at;

    sleep(ms(800)).await;
    assert!(queue.update_notification(
        id,
        NotificationPatch::default().title("Uploaded").message("invoice.pdf"),
    ));

    let updated = queue.get(id).unwrap();
    assert_eq!(updated.title, "Uploaded");
    assert_eq!(updated.message.as_deref(), Some("invoice.pdf"));
    assert_eq!(updated.created_at, created_at);
    assert_eq!(updated.notification_type, NotificationType::Info);

    sleep(ms(300)).await;
    assert!(queue.get(id).is_none());
    assert!(!queue.update_notification(id, NotificationPatch::default().title("late")));
}

#[tokio::test(start_paused = true)]
async fn test_eviction_order_and_events() {
    let config = NotificationConfig {
        max_notifications: 3,
        ..Default::default()
    };
    let queue = NotificationQueue::new(config);
    let mut events = queue.subscribe();

    let ids: Vec<_> = (1..=5)
        .map(|i| queue.info(format!("#{}", i), None, None))
        .collect();

    let titles: Vec<String> = queue.notifications().into_iter().map(|n| n.title).collect();
    assert_eq!(titles, vec!["#3", "#4", "#5"]);

    let mut evicted = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let NotificationEvent::Removed { id, reason } = event {
            assert_eq!(reason, RemovalReason::Evicted);
            evicted.push(id);
        }
    }
    assert_eq!(evicted, ids[..2].to_vec());
}

#[tokio::test(start_paused = true)]
async fn test_clear_all_with_pending_timers() {
    let queue = NotificationQueue::with_defaults();
    queue.info("a", None, Some(ms(500)));
    queue.error("b", None, None);

    queue.clear_all();
    assert!(queue.is_empty());

    let fresh = queue.info("c", None, Some(ms(2000)));
    sleep(ms(1000)).await;
    assert_eq!(queue.len(), 1);
    assert!(queue.get(fresh).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_clear_by_type_leaves_others() {
    let queue = NotificationQueue::with_defaults();
    queue.warning("w", None, None);
    let info = queue.info("i", None, None);
    queue.warning("w2", None, None);

    queue.clear_by_type(NotificationType::Warning);

    let remaining = queue.notifications();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, info);
}

#[tokio::test]
async fn test_action_survives_in_queue() {
    let queue = NotificationQueue::with_defaults();
    let clicked = Arc::new(AtomicBool::new(false));
    let flag = clicked.clone();

    let id = queue.add_notification(
        NotificationRequest::new(NotificationType::Error, "Upload failed")
            .message("Connection reset")
            .action(NotificationAction::new("Retry", move || {
                flag.store(true, Ordering::SeqCst)
            })),
    );

    let notification = queue.get(id).unwrap();
    notification.action.as_ref().unwrap().trigger();
    assert!(clicked.load(Ordering::SeqCst));

    queue.update_notification(id, NotificationPatch::default().clear_action());
    assert!(queue.get(id).unwrap().action.is_none());
}

#[tokio::test]
async fn test_ids_are_unique() {
    let queue = NotificationQueue::with_defaults();
    queue.set_max_notifications(100);

    let mut ids: Vec<_> = (0..50).map(|_| queue.info("x", None, None)).collect();
    ids.sort_by_key(|id| id.to_string());
    ids.dedup();
    assert_eq!(ids.len(), 50);
}

#[tokio::test(start_paused = true)]
async fn test_huge_duration_never_expires() {
    let queue = NotificationQueue::with_defaults();
    let id = queue.add_notification(
        NotificationRequest::new(NotificationType::Info, "long")
            .duration(Duration::from_secs(u64::MAX)),
    );
    let max = queue.warning("max", None, Some(Duration::MAX));

    sleep(Duration::from_secs(3600)).await;

    let entry = queue.get(id).unwrap();
    assert!(entry.auto_expires());
    assert!(!entry.will_expire());
    assert!(queue.get(max).is_some());

    // Hiding still schedules removal after the normal delay.
    queue.hide_notification(id);
    sleep(ms(350)).await;
    assert!(queue.get(id).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_huge_hide_delay_keeps_hidden_entry() {
    let config = NotificationConfig {
        hide_delay: Duration::MAX,
        ..Default::default()
    };
    let queue = NotificationQueue::new(config);
    let pinned = queue.error("pinned", None, Some(Duration::ZERO));
    let short = queue.info("short", None, Some(ms(500)));

    queue.hide_notification(pinned);
    queue.hide_notification(short);

    assert!(queue.visible().is_empty());
    assert_eq!(queue.len(), 2);

    // The pending expiry still applies to the entry that had one.
    sleep(ms(600)).await;
    let remaining = queue.notifications();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, pinned);
    assert!(!remaining[0].is_visible);
}

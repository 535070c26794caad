//! 管理器端到端测试 - 使用内存平台驱动完整流程

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use push_relay::{
    InteractionRoute, LifecycleState, MemoryPlatform, NotificationRecord, PushConfig,
    PushNotificationManager, RawPayload, RoutedAction,
};
use serde_json::json;

const DEFAULT_ACTION: &str = "com.apple.UNNotificationDefaultActionIdentifier";

fn payload(value: serde_json::Value) -> RawPayload {
    value.as_object().cloned().unwrap()
}

fn scenario() -> RawPayload {
    payload(json!({
        "data": "{\"title\":\"Hi\",\"messageBody\":\"Hello\"}",
        "aps": {"alert": {"title": "Sys", "body": "Banner"}}
    }))
}

fn build(platform: &Arc<MemoryPlatform>) -> PushNotificationManager {
    PushNotificationManager::builder()
        .platform(platform.clone())
        .build()
        .unwrap()
}

/// 记录回调收到的通知
fn capture() -> (
    Arc<Mutex<Vec<NotificationRecord>>>,
    impl Fn(&NotificationRecord) + Send + Sync + 'static,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (seen, move |record: &NotificationRecord| {
        sink.lock().unwrap().push(record.clone())
    })
}

#[test]
fn test_active_delivery_schedules_banner_only() {
    let platform = Arc::new(MemoryPlatform::new());
    let manager = build(&platform);
    let (taps, hook) = capture();
    manager.callbacks().set_on_tap(hook);

    let action = manager.handle_push_notification(LifecycleState::Active, &scenario());

    assert!(matches!(action, RoutedAction::ScheduleLocalAlert(_)));
    assert!(taps.lock().unwrap().is_empty());

    let pending = platform.pending_alerts();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].title, "Sys");
    assert_eq!(pending[0].body, "Banner");
    assert_eq!(pending[0].delay_secs, 5);
    assert_eq!(pending[0].identifier, "No Category Identifier founded");
    assert_eq!(pending[0].user_info, json!(scenario()));
}

#[test]
fn test_active_delivery_without_data_still_schedules() {
    let platform = Arc::new(MemoryPlatform::new());
    let manager = build(&platform);

    manager.handle_push_notification(LifecycleState::Active, &RawPayload::new());

    let pending = platform.pending_alerts();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].title, "");
    assert_eq!(pending[0].body, "");
}

#[test]
fn test_background_delivery_fires_tap_once() {
    let platform = Arc::new(MemoryPlatform::new());
    let manager = build(&platform);
    let (taps, hook) = capture();
    manager.callbacks().set_on_tap(hook);

    manager.handle_push_notification(LifecycleState::Background, &scenario());

    let taps = taps.lock().unwrap();
    assert_eq!(taps.len(), 1);
    assert_eq!(taps[0].title(), Some("Hi"));
    assert_eq!(taps[0].message_body(), Some("Hello"));
    assert_eq!(taps[0].id(), None);
    assert!(platform.pending_alerts().is_empty());
}

#[test]
fn test_inactive_delivery_without_data_is_dropped() {
    let platform = Arc::new(MemoryPlatform::new());
    let manager = build(&platform);
    let (taps, hook) = capture();
    manager.callbacks().set_on_tap(hook);

    let raw = payload(json!({"aps": {"alert": {"title": "Sys"}}}));
    let action = manager.handle_push_notification(LifecycleState::Inactive, &raw);

    assert_eq!(action, RoutedAction::Drop);
    assert!(taps.lock().unwrap().is_empty());
    assert!(platform.schedule_history().is_empty());
}

#[test]
fn test_repeated_active_delivery_replaces_pending_alert() {
    let platform = Arc::new(MemoryPlatform::new());
    let manager = build(&platform);

    let raw = payload(json!({
        "aps": {"alert": {"title": "First", "body": "a"}},
        "google.c.a.c_l": "promo"
    }));
    manager.handle_push_notification(LifecycleState::Active, &raw);

    let raw = payload(json!({
        "aps": {"alert": {"title": "Second", "body": "b"}},
        "google.c.a.c_l": "promo"
    }));
    manager.handle_push_notification(LifecycleState::Active, &raw);

    let pending = platform.pending_alerts();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].identifier, "promo");
    assert_eq!(pending[0].title, "Second");
    assert_eq!(platform.schedule_history().len(), 2);
}

#[test]
fn test_schedule_failure_is_not_fatal() {
    let platform = Arc::new(MemoryPlatform::new());
    platform.fail_schedule("center unavailable");
    let manager = build(&platform);

    let action = manager.handle_push_notification(LifecycleState::Active, &scenario());

    assert!(matches!(action, RoutedAction::ScheduleLocalAlert(_)));
    assert_eq!(platform.schedule_history().len(), 1);
    assert!(platform.pending_alerts().is_empty());
}

#[test]
fn test_interaction_resets_badge_and_completes_once() {
    let platform = Arc::new(MemoryPlatform::new());
    let manager = build(&platform);
    let (swipes, hook) = capture();
    manager.callbacks().set_on_swipe(hook);

    let completions = AtomicUsize::new(0);
    manager.handle_interaction(DEFAULT_ACTION, &scenario(), || {
        completions.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(completions.load(Ordering::SeqCst), 1);
    assert_eq!(platform.badge(), Some(0));
    assert_eq!(platform.badge_sets(), 1);
    assert_eq!(swipes.lock().unwrap().len(), 1);
}

#[test]
fn test_badge_is_reset_before_interaction_hooks() {
    let platform = Arc::new(MemoryPlatform::new());
    let manager = build(&platform);

    let observed = Arc::new(Mutex::new(Vec::new()));
    for (name, is_swipe) in [("swipe", true), ("show_more", false)] {
        let sink = observed.clone();
        let seen_by_hook = platform.clone();
        let hook = move |_: &NotificationRecord| {
            sink.lock()
                .unwrap()
                .push((name, seen_by_hook.badge(), seen_by_hook.badge_sets()));
        };
        if is_swipe {
            manager.callbacks().set_on_swipe(hook);
        } else {
            manager.callbacks().set_on_show_more(hook);
        }
    }

    manager.handle_interaction(DEFAULT_ACTION, &scenario(), || {});
    manager.handle_interaction("show", &scenario(), || {});

    assert_eq!(
        *observed.lock().unwrap(),
        vec![("swipe", Some(0), 1), ("show_more", Some(0), 2)]
    );
}

#[test]
fn test_completion_runs_after_badge_reset() {
    let platform = Arc::new(MemoryPlatform::new());
    let manager = build(&platform);

    let mut badge_at_completion = None;
    manager.handle_interaction("reply", &scenario(), || {
        badge_at_completion = Some((platform.badge(), platform.badge_sets()));
    });

    assert_eq!(badge_at_completion, Some((Some(0), 1)));
}

#[test]
fn test_show_is_show_more_with_custom_alias() {
    let platform = Arc::new(MemoryPlatform::new());
    let manager = PushNotificationManager::builder()
        .config(PushConfig {
            show_more_action: "details".to_string(),
            ..PushConfig::default()
        })
        .platform(platform.clone())
        .build()
        .unwrap();
    let (more, hook) = capture();
    manager.callbacks().set_on_show_more(hook);

    let raw = payload(json!({"data": "{\"id\":\"1\"}"}));
    for action in ["show", "details"] {
        let route = manager.handle_interaction(action, &raw, || {});
        assert!(matches!(route, InteractionRoute::ShowMore(_)), "action {}", action);
    }
    assert_eq!(more.lock().unwrap().len(), 2);
}

#[test]
fn test_register_marks_snapshot_registered() {
    let platform = Arc::new(MemoryPlatform::new());
    let manager = build(&platform);

    manager.register_for_push_notifications();

    assert!(manager.snapshot().is_registered);
}

#[test]
fn test_interaction_without_data_completes_without_hooks() {
    let platform = Arc::new(MemoryPlatform::new());
    let manager = build(&platform);
    let (swipes, swipe_hook) = capture();
    let (more, more_hook) = capture();
    manager.callbacks().set_on_swipe(swipe_hook);
    manager.callbacks().set_on_show_more(more_hook);

    let completions = AtomicUsize::new(0);
    for action in [DEFAULT_ACTION, "show"] {
        manager.handle_interaction(action, &RawPayload::new(), || {
            completions.fetch_add(1, Ordering::SeqCst);
        });
    }

    assert_eq!(completions.load(Ordering::SeqCst), 2);
    assert_eq!(platform.badge_sets(), 2);
    assert!(swipes.lock().unwrap().is_empty());
    assert!(more.lock().unwrap().is_empty());
}

#[test]
fn test_show_more_and_other_actions() {
    let platform = Arc::new(MemoryPlatform::new());
    let manager = build(&platform);
    let (swipes, swipe_hook) = capture();
    let (more, more_hook) = capture();
    manager.callbacks().set_on_swipe(swipe_hook);
    manager.callbacks().set_on_show_more(more_hook);

    manager.handle_interaction("show", &scenario(), || {});
    manager.handle_interaction("reply", &scenario(), || {});
    manager.handle_interaction("com.apple.UNNotificationDismissActionIdentifier", &scenario(), || {});

    assert!(swipes.lock().unwrap().is_empty());
    assert_eq!(more.lock().unwrap().len(), 1);
    assert_eq!(platform.badge_sets(), 3);
}

#[test]
fn test_register_requests_authorization_and_fires_permission_hook() {
    let platform = Arc::new(MemoryPlatform::new().with_provider_token("fcm-1"));
    let manager = build(&platform);

    let allowed = Arc::new(AtomicUsize::new(0));
    let counter = allowed.clone();
    manager.callbacks().set_on_permission_allowed(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    manager.register_for_push_notifications();

    assert!(platform.auto_init_enabled());
    assert_eq!(platform.authorization_requests().len(), 1);
    assert_eq!(platform.register_calls(), 1);
    assert_eq!(allowed.load(Ordering::SeqCst), 1);
    assert_eq!(manager.provider_token(), Some("fcm-1".to_string()));
}

#[test]
fn test_register_denied_skips_permission_hook() {
    let platform = Arc::new(MemoryPlatform::new().with_grant(false));
    let manager = build(&platform);

    let allowed = Arc::new(AtomicUsize::new(0));
    let counter = allowed.clone();
    manager.callbacks().set_on_permission_allowed(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    manager.register_for_push_notifications();

    assert_eq!(allowed.load(Ordering::SeqCst), 0);
    assert_eq!(platform.register_calls(), 1);
}

#[test]
fn test_deferred_authorization_fires_after_resolution() {
    let platform = Arc::new(MemoryPlatform::new().with_deferred_authorization());
    let manager = build(&platform);

    let allowed = Arc::new(AtomicUsize::new(0));
    let counter = allowed.clone();
    manager.callbacks().set_on_permission_allowed(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    manager.register_for_push_notifications();
    assert_eq!(allowed.load(Ordering::SeqCst), 0);

    assert_eq!(platform.resolve_authorizations(), 1);
    assert_eq!(allowed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_register_when_already_registered_only_enables_auto_init() {
    let platform = Arc::new(MemoryPlatform::new().with_registered(true));
    let manager = build(&platform);

    manager.register_for_push_notifications();

    assert!(platform.auto_init_enabled());
    assert!(platform.authorization_requests().is_empty());
    assert_eq!(platform.register_calls(), 0);
    assert!(manager.snapshot().is_registered);
}

#[test]
fn test_token_lifecycle() {
    let platform = Arc::new(MemoryPlatform::new());
    let manager = build(&platform);

    assert_eq!(manager.set_up_device_token(&[0x0a, 0xff]), "0aff");
    manager.on_token_issued_or_refreshed("fcm-1");
    platform.issue_provider_token("fcm-2");
    manager.update_push_token_if_needed();

    let snapshot = manager.snapshot();
    assert_eq!(snapshot.device_token, Some("0aff".to_string()));
    assert_eq!(snapshot.provider_token, Some("fcm-2".to_string()));

    let request = manager.subscription_request().unwrap();
    assert_eq!(request.device_token, "0aff");
    assert_eq!(request.fcm_token, "fcm-2");
}

#[test]
fn test_callbacks_keep_first_hook() {
    let platform = Arc::new(MemoryPlatform::new());
    let manager = build(&platform);
    let (first, first_hook) = capture();
    let (second, second_hook) = capture();

    assert!(manager.callbacks().set_on_tap(first_hook));
    assert!(!manager.callbacks().set_on_tap(second_hook));

    manager.handle_push_notification(LifecycleState::Background, &scenario());
    assert_eq!(first.lock().unwrap().len(), 1);
    assert!(second.lock().unwrap().is_empty());
}

#[test]
fn test_concurrent_deliveries() {
    let platform = Arc::new(MemoryPlatform::new());
    let manager = Arc::new(build(&platform));
    let taps = Arc::new(AtomicUsize::new(0));
    let counter = taps.clone();
    manager.callbacks().set_on_tap(move |_: &NotificationRecord| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let manager = manager.clone();
            std::thread::spawn(move || {
                manager.on_token_issued_or_refreshed(format!("fcm-{}", i));
                manager.handle_push_notification(LifecycleState::Background, &scenario());
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(taps.load(Ordering::SeqCst), 8);
    assert!(manager.provider_token().unwrap().starts_with("fcm-"));
}

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use tempfile::TempDir;
use weekly_trends::application::notify::{
    Announcement, DeliveryError, DispatcherConfig, NotificationDispatcher, NotifyService,
    PushTransport,
};
use weekly_trends::application::repos::SubscriptionsRepo;
use weekly_trends::application::subscriptions::SubscriptionService;
use weekly_trends::domain::subscriptions::{Subscription, SubscriptionDraft, SubscriptionKeysDraft};
use weekly_trends::infra::subscriptions::JsonSubscriptionStore;

struct RejectGone;

#[async_trait]
impl PushTransport for RejectGone {
    async fn deliver(
        &self,
        subscription: &Subscription,
        _payload: &[u8],
    ) -> Result<(), DeliveryError> {
        if subscription.endpoint.ends_with("gone") {
            Err(DeliveryError::Gone { status: 410 })
        } else {
            Ok(())
        }
    }
}

fn draft(endpoint: &str) -> SubscriptionDraft {
    SubscriptionDraft {
        endpoint: Some(endpoint.to_string()),
        keys: Some(SubscriptionKeysDraft {
            p256dh: Some("p256dh".to_string()),
            auth: Some("auth".to_string()),
        }),
    }
}

#[tokio::test]
async fn subscription_and_push_paths_emit_counters() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let dir = TempDir::new().expect("tempdir");
    let store: Arc<dyn SubscriptionsRepo> =
        Arc::new(JsonSubscriptionStore::new(dir.path().join("subscriptions.json")));
    let subscriptions = SubscriptionService::new(store.clone());

    for endpoint in [
        "https://push.example.com/ok",
        "https://push.example.com/gone",
        "https://push.example.com/leaving",
    ] {
        subscriptions.subscribe(draft(endpoint)).await.expect("subscribe");
    }
    subscriptions
        .unsubscribe("https://push.example.com/leaving")
        .await
        .expect("unsubscribe");

    let dispatcher = NotificationDispatcher::new(
        store.clone(),
        Some(Arc::new(RejectGone) as Arc<dyn PushTransport>),
        DispatcherConfig::default(),
    );
    let notify = NotifyService::new(Arc::new(dispatcher), store, true);
    let outcome = notify
        .announce(&Announcement {
            title: "New report".to_string(),
            body: "Week 48 is out".to_string(),
            url: None,
        })
        .await
        .expect("announce");
    assert_eq!(outcome.sent, 1);
    assert_eq!(outcome.pruned, 1);

    let counters: HashMap<String, u64> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter_map(|(composite_key, _, _, value)| match value {
            DebugValue::Counter(count) => Some((composite_key.key().name().to_string(), count)),
            _ => None,
        })
        .collect();

    let expected = [
        ("weekly_trends_subscriptions_added_total", 3),
        ("weekly_trends_subscriptions_removed_total", 1),
        ("weekly_trends_push_sent_total", 1),
        ("weekly_trends_push_failed_total", 1),
        ("weekly_trends_subscriptions_pruned_total", 1),
    ];
    for (name, count) in expected {
        assert_eq!(counters.get(name).copied(), Some(count), "metric {name}");
    }
}

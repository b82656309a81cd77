use std::sync::Arc;

use crate::application::subscriptions::SubscriptionService;

#[derive(Clone)]
pub struct ApiState {
    pub subscriptions: Arc<SubscriptionService>,
    /// VAPID application server key handed to browsers; `None` when push is unconfigured.
    pub vapid_public_key: Option<Arc<str>>,
}

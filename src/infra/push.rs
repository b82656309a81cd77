//! Web Push delivery with VAPID signing.

use async_trait::async_trait;
use web_push::{
    ContentEncoding, HyperWebPushClient, PartialVapidSignatureBuilder, SubscriptionInfo,
    URL_SAFE_NO_PAD, VapidSignatureBuilder, WebPushClient, WebPushError, WebPushMessageBuilder,
};

use crate::application::notify::{DeliveryError, PushTransport};
use crate::config::VapidSettings;
use crate::domain::subscriptions::Subscription;

use super::error::InfraError;

pub struct WebPushTransport {
    client: HyperWebPushClient,
    signer: PartialVapidSignatureBuilder,
    subject: String,
}

impl WebPushTransport {
    /// Fails when the private key is not an unpadded base64url P-256 scalar,
    /// the format browsers and `web-push generate-vapid-keys` produce.
    pub fn new(vapid: &VapidSettings) -> Result<Self, InfraError> {
        let signer =
            VapidSignatureBuilder::from_base64_no_sub(&vapid.private_key, URL_SAFE_NO_PAD)
                .map_err(|err| InfraError::push(format!("invalid VAPID private key: {err}")))?;

        Ok(Self {
            client: HyperWebPushClient::new(),
            signer,
            subject: vapid.subject.clone(),
        })
    }
}

#[async_trait]
impl PushTransport for WebPushTransport {
    async fn deliver(
        &self,
        subscription: &Subscription,
        payload: &[u8],
    ) -> Result<(), DeliveryError> {
        let info = SubscriptionInfo::new(
            &subscription.endpoint,
            &subscription.keys.p256dh,
            &subscription.keys.auth,
        );

        let mut signature = self.signer.clone().add_sub_info(&info);
        signature.add_claim("sub", self.subject.as_str());
        let signature = signature.build().map_err(delivery_error)?;

        let mut message = WebPushMessageBuilder::new(&info);
        message.set_payload(ContentEncoding::Aes128Gcm, payload);
        message.set_vapid_signature(signature);
        let message = message.build().map_err(delivery_error)?;

        self.client.send(message).await.map_err(delivery_error)
    }
}

fn delivery_error(err: WebPushError) -> DeliveryError {
    match err {
        WebPushError::EndpointNotValid { .. } => DeliveryError::Gone { status: 410 },
        WebPushError::EndpointNotFound { .. } => DeliveryError::Gone { status: 404 },
        other => DeliveryError::Rejected(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 32 bytes of `0x01`: a valid P-256 scalar.
    const PRIVATE_KEY: &str = "AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE";

    fn vapid(private_key: &str) -> VapidSettings {
        VapidSettings {
            public_key: "public".to_string(),
            private_key: private_key.to_string(),
            subject: "mailto:admin@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn accepts_url_safe_private_key() {
        let transport = WebPushTransport::new(&vapid(PRIVATE_KEY)).expect("valid key");
        assert_eq!(transport.subject, "mailto:admin@example.com");
    }

    #[tokio::test]
    async fn rejects_malformed_private_key() {
        let err = WebPushTransport::new(&vapid("not a key!")).err().expect("invalid key");
        assert!(matches!(err, InfraError::Push { .. }));
    }
}

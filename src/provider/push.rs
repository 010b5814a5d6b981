use std::{fmt, str::FromStr};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL, Engine};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client, Url,
};
use thiserror::Error;

use crate::{
    configuration::Config,
    model::Subscription,
    types::{Claims, PushHeader},
};

/// Per-recipient delivery failure. `Gone` marks an endpoint the push service
/// reports as permanently dead (subject of a future pruning pass); everything
/// else is transient from this system's point of view and is never retried
/// in-process.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("push endpoint gone ({status})")]
    Gone { status: u16 },

    #[error("push delivery failed: {0}")]
    Transient(String),

    #[error("push delivery timed out")]
    Timeout,
}

/// One delivery attempt against a push endpoint. Implemented by
/// [`PushClient`] in production and by mocks in dispatcher tests.
#[allow(async_fn_in_trait)]
pub trait Deliver: Sync {
    async fn send(
        &self,
        subscription: &Subscription,
        body: &[u8],
        header: &PushHeader,
    ) -> Result<(), DeliveryError>;
}

/// Web-push delivery client. The VAPID configuration is fixed at
/// construction for the process lifetime; no runtime mutation.
pub struct PushClient {
    config: Config,
    client: Client,
}

impl fmt::Debug for PushClient {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PushClient").finish_non_exhaustive()
    }
}

impl PushClient {
    pub fn new(config: Config) -> PushClient {
        PushClient {
            config,
            client: Client::new(),
        }
    }

    fn vapid_token(&self, endpoint: &Url, ttl: i64) -> Result<String, DeliveryError> {
        let scheme = endpoint.scheme();
        let host = endpoint
            .host()
            .ok_or_else(|| {
                DeliveryError::Transient(String::from("endpoint has no host"))
            })?
            .to_string();

        let claims = Claims {
            aud: format!("{}://{}", scheme, host),
            sub: format!("mailto:{}", &self.config.mail_to),
            exp: Utc::now().timestamp() + ttl,
        };

        let key = EncodingKey::from_ec_pem(&self.config.vapid_private_key)
            .map_err(|e| DeliveryError::Transient(e.to_string()))?;

        encode(&Header::new(Algorithm::ES256), &claims, &key)
            .map_err(|e| DeliveryError::Transient(e.to_string()))
    }

    fn headers(
        &self,
        token: &str,
        push_header: &PushHeader,
    ) -> Result<HeaderMap, DeliveryError> {
        let mut map = HeaderMap::new();
        let to_transient = |e: &dyn fmt::Display| {
            DeliveryError::Transient(e.to_string())
        };

        let pairs = [
            ("user-agent", String::from("notifier")),
            ("authorization", format!("WebPush {}", token)),
            ("content-encoding", String::from("aes128gcm")),
            ("ttl", push_header.ttl.to_string()),
            ("urgency", push_header.urgency.to_string()),
        ];

        for (name, value) in pairs {
            map.insert(
                HeaderName::from_str(name).map_err(|e| to_transient(&e))?,
                HeaderValue::from_str(value.as_str())
                    .map_err(|e| to_transient(&e))?,
            );
        }

        let vapid_pub_b64 =
            String::from_utf8(self.config.vapid_public_key.clone()).map_err(
                |_| {
                    DeliveryError::Transient(String::from(
                        "invalid VAPID public key",
                    ))
                },
            )?;
        map.insert(
            HeaderName::from_str("crypto-key")
                .map_err(|e| to_transient(&e))?,
            HeaderValue::from_str(
                format!("p256ecdsa={}", vapid_pub_b64.trim()).as_str(),
            )
            .map_err(|e| to_transient(&e))?,
        );

        Ok(map)
    }
}

impl Deliver for PushClient {
    async fn send(
        &self,
        subscription: &Subscription,
        body: &[u8],
        header: &PushHeader,
    ) -> Result<(), DeliveryError> {
        let endpoint = Url::parse(&subscription.endpoint)
            .map_err(|e| DeliveryError::Transient(e.to_string()))?;

        let token = self.vapid_token(&endpoint, header.ttl)?;

        let p256dh = BASE64_URL
            .decode(&subscription.p256dh)
            .map_err(|e| DeliveryError::Transient(e.to_string()))?;
        let auth = BASE64_URL
            .decode(&subscription.auth)
            .map_err(|e| DeliveryError::Transient(e.to_string()))?;

        let data = ece::encrypt(&p256dh, &auth, body)
            .map_err(|e| DeliveryError::Transient(e.to_string()))?;

        let response = self
            .client
            .post(endpoint)
            .headers(self.headers(&token, header)?)
            .body(data)
            .send()
            .await
            .map_err(|e| DeliveryError::Transient(e.to_string()))?;

        let status = response.status().as_u16();

        if response.status().is_success() {
            return Ok(());
        }

        if self.config.gone_status_codes.contains(&status) {
            return Err(DeliveryError::Gone { status });
        }

        Err(DeliveryError::Transient(format!(
            "push service responded with {}",
            status
        )))
    }
}

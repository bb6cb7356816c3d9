//! SNS topic publisher (query protocol, SigV4 signed).

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::{NoopNotifier, Notifier, NotifyError};
use crate::aws::{regional_host, AwsCredentials, SigV4Signer};
use crate::config::{AwsConfig, NotificationsConfig};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

static MESSAGE_ID: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"<MessageId>([^<]+)</MessageId>").ok());
static ERROR_MESSAGE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"<Message>([^<]*)</Message>").ok());

/// Publishes messages to one SNS topic
pub struct SnsNotifier {
    http_client: Client,
    endpoint: Url,
    topic_arn: String,
    signer: SigV4Signer,
}

impl SnsNotifier {
    pub fn new(endpoint: Url, topic_arn: impl Into<String>, signer: SigV4Signer) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            endpoint,
            topic_arn: topic_arn.into(),
            signer,
        })
    }

    /// Build from configuration; the topic ARN and credentials come from the environment
    pub fn from_config(config: &NotificationsConfig, aws: &AwsConfig) -> Result<Self> {
        let topic_arn = std::env::var(&config.topic_arn_env)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| anyhow!("{} environment variable not set", config.topic_arn_env))?;
        let credentials = AwsCredentials::from_env(aws)?;

        let endpoint = match &config.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://{}/", regional_host("sns", &config.region)),
        };
        let endpoint = Url::parse(&endpoint).with_context(|| format!("Invalid SNS endpoint '{}'", endpoint))?;

        Self::new(endpoint, topic_arn, SigV4Signer::new(credentials, &config.region, "sns"))
    }

    fn form_body(&self, message: &str) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("Action", "Publish")
            .append_pair("TopicArn", &self.topic_arn)
            .append_pair("Message", message)
            .append_pair("Version", "2010-03-31")
            .finish()
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn publish(&self, message: &str) -> Result<Option<String>, NotifyError> {
        let body = self.form_body(message);
        let auth_headers = self.signer.sign_headers(
            "POST",
            &self.endpoint,
            &[("content-type", FORM_CONTENT_TYPE)],
            body.as_bytes(),
            chrono::Utc::now(),
        );

        let mut request = self
            .http_client
            .post(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body);
        for (name, value) in auth_headers {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|e| NotifyError::Network(e.to_string()))?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let message = capture(&ERROR_MESSAGE, &text).unwrap_or_else(|| status.to_string());
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let message_id = capture(&MESSAGE_ID, &text);
        info!("📣 Published notification{}", message_id.as_deref().map(|id| format!(" ({})", id)).unwrap_or_default());
        Ok(message_id)
    }
}

fn capture(pattern: &Lazy<Option<Regex>>, text: &str) -> Option<String> {
    pattern
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// The configured notifier, or [`NoopNotifier`] when disabled or incomplete
pub fn create_notifier(config: &NotificationsConfig, aws: &AwsConfig) -> Arc<dyn Notifier> {
    if !config.enabled {
        return Arc::new(NoopNotifier);
    }
    match SnsNotifier::from_config(config, aws) {
        Ok(notifier) => Arc::new(notifier),
        Err(e) => {
            warn!("⚠️  Login notifications disabled: {:#}", e);
            Arc::new(NoopNotifier)
        }
    }
}

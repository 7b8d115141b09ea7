use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{
    ContactRequest, ContactResponse, NotificationResponse, RegistrationEnvelope,
    RegistrationResponse,
};
use url::Url;

/// HTTP boundary of the event site. Kept behind a trait so the form
/// controllers can be exercised against in-process fakes.
#[async_trait]
pub trait SiteApi: Send + Sync {
    async fn submit_registration(
        &self,
        envelope: &RegistrationEnvelope,
    ) -> Result<RegistrationResponse>;

    /// Best-effort side channel that triggers confirmation emails. Callers
    /// must never let its outcome gate the primary submission path.
    async fn notify_registration(
        &self,
        envelope: &RegistrationEnvelope,
    ) -> Result<NotificationResponse>;

    async fn send_contact(&self, request: &ContactRequest) -> Result<ContactResponse>;
}

pub struct HttpSiteApi {
    http: Client,
    api_base: String,
    notify_base: String,
}

impl HttpSiteApi {
    pub fn new(api_base: Url, notify_base: Url) -> Self {
        Self {
            http: Client::new(),
            api_base: base_string(api_base),
            notify_base: base_string(notify_base),
        }
    }

    pub fn from_urls(api_base: &str, notify_base: &str) -> Result<Self> {
        let api_base = Url::parse(api_base)
            .map_err(|err| anyhow!("invalid api base url '{api_base}': {err}"))?;
        let notify_base = Url::parse(notify_base)
            .map_err(|err| anyhow!("invalid notify base url '{notify_base}': {err}"))?;
        Ok(Self::new(api_base, notify_base))
    }
}

fn base_string(url: Url) -> String {
    url.as_str().trim_end_matches('/').to_string()
}

#[async_trait]
impl SiteApi for HttpSiteApi {
    async fn submit_registration(
        &self,
        envelope: &RegistrationEnvelope,
    ) -> Result<RegistrationResponse> {
        // The body shape, not the status line, decides acceptance for this
        // endpoint.
        let response = self
            .http
            .post(format!("{}/registrations", self.api_base))
            .json(envelope)
            .send()
            .await?
            .json()
            .await?;
        Ok(response)
    }

    async fn notify_registration(
        &self,
        envelope: &RegistrationEnvelope,
    ) -> Result<NotificationResponse> {
        let response = self
            .http
            .post(format!("{}/registrationsmail", self.notify_base))
            .json(envelope)
            .send()
            .await?
            .json()
            .await?;
        Ok(response)
    }

    async fn send_contact(&self, request: &ContactRequest) -> Result<ContactResponse> {
        let response = self
            .http
            .post(format!("{}/contact", self.api_base))
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body: ContactResponse = response.json().await?;
        if status.is_success() || body.error.is_some() {
            return Ok(body);
        }
        Err(anyhow!("contact request failed with status {status}"))
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;

use shared::protocol::ContactRequest;
use tracing::info;

use crate::{backend::SiteApi, error::ContactError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    pub fn to_request(&self) -> ContactRequest {
        ContactRequest {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            message: self.message.clone(),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Sends the form and clears it on success. Server-provided error text is
/// surfaced verbatim; transport failures collapse to a fixed message.
pub async fn send_contact(api: &dyn SiteApi, form: &mut ContactForm) -> Result<(), ContactError> {
    let outcome = api
        .send_contact(&form.to_request())
        .await
        .map_err(ContactError::Transport)?;
    if let Some(error) = outcome.error {
        return Err(ContactError::Server(error));
    }
    form.clear();
    info!("contact: message sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use async_trait::async_trait;
    use shared::protocol::{
        ContactResponse, NotificationResponse, RegistrationEnvelope, RegistrationResponse,
    };

    use super::*;

    struct StubApi {
        error: Option<String>,
        transport_failure: bool,
    }

    #[async_trait]
    impl SiteApi for StubApi {
        async fn submit_registration(
            &self,
            _envelope: &RegistrationEnvelope,
        ) -> anyhow::Result<RegistrationResponse> {
            unimplemented!("contact tests never submit registrations")
        }

        async fn notify_registration(
            &self,
            _envelope: &RegistrationEnvelope,
        ) -> anyhow::Result<NotificationResponse> {
            unimplemented!("contact tests never notify")
        }

        async fn send_contact(
            &self,
            _request: &ContactRequest,
        ) -> anyhow::Result<ContactResponse> {
            if self.transport_failure {
                return Err(anyhow!("connection reset"));
            }
            Ok(ContactResponse {
                error: self.error.clone(),
            })
        }
    }

    fn filled_form() -> ContactForm {
        ContactForm {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            message: "When does check-in open?".into(),
        }
    }

    #[tokio::test]
    async fn success_clears_the_form() {
        let api = StubApi {
            error: None,
            transport_failure: false,
        };
        let mut form = filled_form();
        send_contact(&api, &mut form).await.expect("send");
        assert_eq!(form, ContactForm::default());
    }

    #[tokio::test]
    async fn server_error_is_surfaced_verbatim_and_form_kept() {
        let api = StubApi {
            error: Some("invalid email".into()),
            transport_failure: false,
        };
        let mut form = filled_form();
        let err = send_contact(&api, &mut form).await.expect_err("rejected");
        assert_eq!(err.to_string(), "invalid email");
        assert_eq!(form, filled_form());
    }

    #[tokio::test]
    async fn transport_failure_uses_fixed_message() {
        let api = StubApi {
            error: None,
            transport_failure: true,
        };
        let mut form = filled_form();
        let err = send_contact(&api, &mut form).await.expect_err("failed");
        assert_eq!(err.to_string(), "Unable to send message.");
        assert_eq!(form, filled_form());
    }
}

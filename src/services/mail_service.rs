use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::models::ApiError;

/// Sends transactional mail through an external SMTP relay with
/// service-account credentials. Delivery failures are logged and surfaced
/// as a generic error; nothing is retried.
#[derive(Clone)]
pub struct MailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl MailService {
    pub fn new(relay: &str, user: &str, pass: &str) -> Result<Self, ApiError> {
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(relay)
            .map_err(|e| ApiError::MailError(format!("Invalid SMTP relay {}: {}", relay, e)))?
            .credentials(Credentials::new(user.to_string(), pass.to_string()))
            .build();

        Ok(MailService {
            mailer,
            from: format!("\"Your Brand\" <{}>", user),
        })
    }

    pub async fn send_welcome_email(
        &self,
        name: &str,
        email: &str,
        coupon_code: &str,
        payment_amount: f64,
    ) -> Result<(), ApiError> {
        let html = format!(
            r#"
        <h2>Thanks for joining, {name}!</h2>
        <p>You've successfully applied coupon <strong>{coupon_code}</strong>.</p>
        <p>Total payment: <strong>${payment_amount}</strong></p>
        <p>We'll be in touch soon!</p>
      "#
        );

        let message = Message::builder()
            .from(self
                .from
                .parse()
                .map_err(|e| ApiError::MailError(format!("Invalid sender address: {}", e)))?)
            .to(email
                .parse()
                .map_err(|_| ApiError::ValidationError("Invalid recipient address".to_string()))?)
            .subject(format!("🎉 Welcome, {}!", name))
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|e| ApiError::MailError(format!("Failed to build email: {}", e)))?;

        self.mailer.send(message).await.map_err(|e| {
            log::error!("Email send error: {}", e);
            ApiError::MailError("Failed to send email".to_string())
        })?;

        Ok(())
    }
}

//! OTP generation and email delivery.
//!
//! Delivery goes through an HTTP email API (Resend-compatible payload).
//! Without an API key the mailer logs the message and reports success,
//! which keeps local development working without credentials.

use rand::Rng;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("email request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("email provider returned {0}")]
    Provider(reqwest::StatusCode),
}

#[derive(Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

pub struct Mailer {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

impl Mailer {
    pub fn from_env() -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: std::env::var("EMAIL_API_URL")
                .unwrap_or_else(|_| "https://api.resend.com/emails".to_string()),
            api_key: std::env::var("EMAIL_API_KEY").ok(),
            from: std::env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "VitaGuide <noreply@vitaguide.local>".to_string()),
        }
    }

    pub async fn send(&self, to: &str, subject: &str, text: &str) -> Result<(), MailerError> {
        let Some(api_key) = &self.api_key else {
            tracing::info!("EMAIL_API_KEY not set; would send to {to}: {subject} - {text}");
            return Ok(());
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&EmailPayload {
                from: &self.from,
                to,
                subject,
                text,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MailerError::Provider(response.status()));
        }
        tracing::info!("email sent to {to}");
        Ok(())
    }
}

/// Six decimal digits, zero-padded.
pub fn generate_otp() -> String {
    let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{code:06}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..100 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }
}

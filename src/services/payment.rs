//! Client for the external payment webhook
//!
//! The webhook charges money for credit packages and answers with a payable
//! code. Settlement happens entirely on the processor's side; once it
//! credits the profile row, the new balance reaches the session through the
//! realtime credit feed.

use reqwest::Client;
use serde::Serialize;

use crate::models::{CreditPackage, PaymentResponse, UserProfile};

#[derive(Clone)]
pub struct PaymentClient {
    webhook_url: String,
    http: Client,
}

#[derive(Debug)]
pub enum PaymentError {
    Http(reqwest::Error),
    /// Non-success status or undecodable body from the webhook
    Api(String),
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentError::Http(e) => write!(f, "payment request failed: {}", e),
            PaymentError::Api(msg) => write!(f, "payment webhook error: {}", msg),
        }
    }
}

impl From<reqwest::Error> for PaymentError {
    fn from(e: reqwest::Error) -> Self {
        PaymentError::Http(e)
    }
}

/// Wire body the processor expects (legacy Portuguese field names)
#[derive(Debug, Serialize)]
struct ChargeRequest<'a> {
    #[serde(rename = "nome")]
    name: &'a str,
    email: &'a str,
    #[serde(rename = "doc")]
    tax_id: &'a str,
    #[serde(rename = "valor")]
    amount: f64,
    #[serde(rename = "quantidade")]
    credit_quantity: i64,
    #[serde(rename = "descrição")]
    description: &'a str,
    #[serde(rename = "telefone")]
    phone: &'a str,
    #[serde(rename = "id_user")]
    user_id: &'a str,
}

impl PaymentClient {
    pub fn new(webhook_url: &str) -> Self {
        Self {
            webhook_url: webhook_url.to_string(),
            http: Client::new(),
        }
    }

    /// Request a charge for `quantity` units of the given package.
    /// Errors are terminal for the attempt; nothing is retried.
    pub async fn charge(
        &self,
        profile: &UserProfile,
        package: &CreditPackage,
        quantity: i64,
    ) -> Result<PaymentResponse, PaymentError> {
        let body = ChargeRequest {
            name: &profile.display_name,
            email: profile.email.as_deref().unwrap_or(""),
            tax_id: profile.tax_id.as_deref().unwrap_or(""),
            amount: package.price * quantity as f64,
            credit_quantity: package.credits * quantity,
            description: &package.name,
            phone: profile.phone.as_deref().unwrap_or(""),
            user_id: &profile.id,
        };

        let resp = self.http.post(&self.webhook_url).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(PaymentError::Api(format!("{}: {}", status, text)));
        }

        let payment: PaymentResponse = resp
            .json()
            .await
            .map_err(|e| PaymentError::Api(e.to_string()))?;
        Ok(payment)
    }
}

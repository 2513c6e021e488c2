//! HTTP client for the payment provider's server-side API.
//!
//! Thin adapter over `reqwest`: each method maps one provider endpoint,
//! authenticating with the secret key as a bearer token and posting
//! form-encoded parameters, as the provider's API expects.

use reqwest::Client;

use super::types::{CheckoutSession, LineItem, PaymentIntent, ProviderRefund};
use crate::config::AppConfig;
use crate::error::ApiError;

/// Payment provider API client.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http: Client,
    api_url: String,
    secret_key: String,
}

impl ProviderClient {
    /// Creates a client from configuration.
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: Client::new(),
            api_url: config.provider_api_url.clone(),
            secret_key: config.provider_secret_key.clone(),
        }
    }

    /// Creates a payment intent for `amount_minor`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Provider`] on transport failure or a non-2xx
    /// provider response.
    pub async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        booking_id: &str,
    ) -> Result<PaymentIntent, ApiError> {
        let params = [
            ("amount", amount_minor.to_string()),
            ("currency", currency.to_string()),
            ("metadata[booking_id]", booking_id.to_string()),
        ];
        self.post_form("payment_intents", &params).await
    }

    /// Creates a hosted checkout session with the given line items.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Provider`] on transport failure or a non-2xx
    /// provider response.
    pub async fn create_checkout_session(
        &self,
        line_items: &[LineItem],
        booking_id: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, ApiError> {
        let mut params = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), success_url.to_string()),
            ("cancel_url".to_string(), cancel_url.to_string()),
            (
                "metadata[booking_id]".to_string(),
                booking_id.to_string(),
            ),
        ];
        for (i, item) in line_items.iter().enumerate() {
            params.push((
                format!("line_items[{i}][price_data][product_data][name]"),
                item.name.clone(),
            ));
            params.push((
                format!("line_items[{i}][price_data][unit_amount]"),
                item.amount_minor.to_string(),
            ));
            params.push((
                format!("line_items[{i}][price_data][currency]"),
                item.currency.clone(),
            ));
            params.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        }
        self.post_form("checkout/sessions", &params).await
    }

    /// Refunds `amount_minor` of a captured payment; `None` refunds the
    /// full remainder provider-side.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Provider`] on transport failure or a non-2xx
    /// provider response.
    pub async fn create_refund(
        &self,
        provider_payment_id: &str,
        amount_minor: Option<i64>,
    ) -> Result<ProviderRefund, ApiError> {
        let mut params = vec![("payment_intent".to_string(), provider_payment_id.to_string())];
        if let Some(amount) = amount_minor {
            params.push(("amount".to_string(), amount.to_string()));
        }
        self.post_form("refunds", &params).await
    }

    async fn post_form<T, P>(&self, path: &str, params: &[P]) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
        P: serde::Serialize,
    {
        let url = format!("{}/{path}", self.api_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(params)
            .send()
            .await
            .map_err(|e| ApiError::Provider(format!("request to {path} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Provider(format!(
                "{path} returned {status}: {body}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Provider(format!("decoding {path} response failed: {e}")))
    }
}

//! # Billing Configuration
//!
//! Knobs for the sale pipeline: gateway location, the country calling code
//! prepended to stored phone numbers, and the optional letterhead image
//! painted behind every invoice.

/// Configuration for the sale pipeline.
///
/// ## Example
/// ```rust,ignore
/// let config = BillingConfig::default()
///     .letterhead_url("https://files.example.shop/letterhead.png");
/// ```
#[derive(Debug, Clone)]
pub struct BillingConfig {
    /// Base URL of the WhatsApp messaging gateway.
    pub gateway_base_url: String,

    /// Country calling code prepended to customer phone numbers at send
    /// time. Phone numbers are stored as bare 10-digit strings.
    pub country_code: String,

    /// URL of the letterhead image (PNG) painted full-page behind the
    /// invoice. `None` renders invoices on a plain white page; a fetch
    /// failure is tolerated the same way.
    pub letterhead_url: Option<String>,
}

impl Default for BillingConfig {
    fn default() -> Self {
        BillingConfig {
            gateway_base_url: "https://wa.medblisss.com".to_string(),
            country_code: "91".to_string(),
            letterhead_url: None,
        }
    }
}

impl BillingConfig {
    /// Sets the messaging gateway base URL.
    pub fn gateway_base_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_base_url = url.into();
        self
    }

    /// Sets the country calling code.
    pub fn country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = code.into();
        self
    }

    /// Sets the letterhead image URL.
    pub fn letterhead_url(mut self, url: impl Into<String>) -> Self {
        self.letterhead_url = Some(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BillingConfig::default();
        assert_eq!(config.gateway_base_url, "https://wa.medblisss.com");
        assert_eq!(config.country_code, "91");
        assert!(config.letterhead_url.is_none());
    }

    #[test]
    fn test_builder() {
        let config = BillingConfig::default()
            .gateway_base_url("http://localhost:3000")
            .country_code("92")
            .letterhead_url("https://files.example.shop/letterhead.png");
        assert_eq!(config.gateway_base_url, "http://localhost:3000");
        assert_eq!(config.country_code, "92");
        assert_eq!(
            config.letterhead_url.as_deref(),
            Some("https://files.example.shop/letterhead.png")
        );
    }
}

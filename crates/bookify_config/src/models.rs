// --- File: crates/bookify_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Database Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. sqlite://data/bookify.db, loaded via BOOKIFY__DATABASE__URL
}

// --- Stripe Config ---
// Holds non-secret Stripe config. Secrets loaded directly from env vars:
// STRIPE_SECRET_KEY, STRIPE_WEBHOOK_SECRET
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StripeConfig {
    pub success_url: String, // Mandatory
    pub cancel_url: String,  // Mandatory
    pub default_currency: Option<String>,
    /// Minutes a hosted Checkout Session stays open before Stripe expires it.
    pub session_expiry_minutes: Option<i64>,
}

impl StripeConfig {
    pub fn session_expiry_minutes(&self) -> i64 {
        self.session_expiry_minutes.unwrap_or(30)
    }
}

// --- Booking Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BookingConfig {
    /// The bookable times of day, in order, as "HH:MM". Defaults to the
    /// standard schedule with a lunch gap between 12:00 and 14:00.
    #[serde(default = "default_slots")]
    pub slots: Vec<String>,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            slots: default_slots(),
        }
    }
}

fn default_slots() -> Vec<String> {
    ["09:00", "10:00", "11:00", "12:00", "14:00", "15:00", "16:00"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_stripe: bool,

    // --- Feature Configurations ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub stripe: Option<StripeConfig>,
    #[serde(default)]
    pub booking: BookingConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_slot_universe_has_lunch_gap() {
        let cfg = BookingConfig::default();
        assert_eq!(cfg.slots.len(), 7);
        assert!(!cfg.slots.contains(&"13:00".to_string()));
        assert_eq!(cfg.slots.first().map(String::as_str), Some("09:00"));
        assert_eq!(cfg.slots.last().map(String::as_str), Some("16:00"));
    }

    #[test]
    fn minimal_config_deserializes_with_defaults() {
        let json = r#"{"server": {"host": "127.0.0.1", "port": 8080}}"#;
        let cfg: AppConfig = serde_json::from_str(json).unwrap();
        assert!(!cfg.use_stripe);
        assert!(cfg.stripe.is_none());
        assert_eq!(cfg.booking.slots.len(), 7);
    }
}

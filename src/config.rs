//! Application configuration
//!
//! Loads configuration from environment variables with sensible defaults.

use rust_decimal::Decimal;
use std::env;

use crate::document::DocumentSettings;
use crate::pricing::validation::VatPolicy;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database connection URL
    pub database_url: String,
    /// Maximum pooled database connections
    pub db_max_connections: u32,
    /// Currency code printed next to amounts
    pub currency: String,
    /// VAT rates accepted on input (percent)
    pub vat_rates: Vec<Decimal>,
    /// Company name printed on quote documents
    pub company_name: String,
    /// Free-form company details (address, tax id) for documents
    pub company_details: String,
    /// CORS allowed origins
    pub cors_origins: Vec<String>,
    /// Environment (development/production)
    pub environment: Environment,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Production,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::Missing("DATABASE_URL".to_string()))?;

        let port = match env::var("PORT") {
            Ok(p) => p
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid(format!("PORT must be a number, got '{}'", p)))?,
            Err(_) => 8080,
        };

        let vat_rates = match env::var("VAT_RATES") {
            Ok(raw) => parse_vat_rates(&raw)?,
            Err(_) => parse_vat_rates(DEFAULT_VAT_RATES)?,
        };

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            database_url,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(10),
            currency: env::var("CURRENCY").unwrap_or_else(|_| "PLN".to_string()),
            vat_rates,
            company_name: env::var("COMPANY_NAME").unwrap_or_default(),
            company_details: env::var("COMPANY_DETAILS").unwrap_or_default(),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| vec!["http://localhost:8081".to_string()]),
            environment: parse_environment(
                &env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            ),
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Get the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn vat_policy(&self) -> VatPolicy {
        VatPolicy::new(self.vat_rates.clone())
    }

    pub fn document_settings(&self) -> DocumentSettings {
        DocumentSettings {
            company_name: self.company_name.clone(),
            company_details: self.company_details.clone(),
            currency: self.currency.clone(),
        }
    }
}

const DEFAULT_VAT_RATES: &str = "0,5,8,23";

fn parse_environment(raw: &str) -> Environment {
    match raw.to_lowercase().as_str() {
        "production" | "prod" => Environment::Production,
        _ => Environment::Development,
    }
}

/// Parse a comma separated list of whole VAT percentages
fn parse_vat_rates(raw: &str) -> Result<Vec<Decimal>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| {
            r.parse::<Decimal>()
                .ok()
                .filter(|d| d.fract().is_zero() && !d.is_sign_negative())
                .ok_or_else(|| ConfigError::Invalid(format!("VAT_RATES entry '{}'", r)))
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_vat_rates() {
        assert_eq!(
            parse_vat_rates(DEFAULT_VAT_RATES).unwrap(),
            vec![dec!(0), dec!(5), dec!(8), dec!(23)]
        );
        assert_eq!(parse_vat_rates(" 7 , 19,").unwrap(), vec![dec!(7), dec!(19)]);
        assert!(parse_vat_rates("8,abc").is_err());
        assert!(parse_vat_rates("8.5").is_err());
        assert!(parse_vat_rates("-5").is_err());
        assert!(parse_vat_rates("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_environment() {
        assert_eq!(parse_environment("PROD"), Environment::Production);
        assert_eq!(parse_environment("production"), Environment::Production);
        assert_eq!(parse_environment("staging"), Environment::Development);
    }
}

//! Process configuration, loaded once at startup.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Webhook bot configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram Bot API token.
    pub telegram_token: SecretString,
    /// Gemini API key.
    pub gemini_api_key: SecretString,
    /// Gemini model name.
    pub gemini_model: String,
    /// Spreadsheet id of the expense ledger.
    pub sheet_id: String,
    /// Bearer token for the Sheets append call. Minting and refreshing the
    /// token is the deployment's concern.
    pub sheets_token: SecretString,
    /// Authorized sender ids. A `*` entry allows everyone.
    pub allowed_users: Vec<String>,
    /// Webhook listen port.
    pub port: u16,
}

impl Config {
    /// Build config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let telegram_token = require("TELEGRAM_TOKEN")?;
        let gemini_api_key = require("GEMINI_API_KEY")?;
        let gemini_model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string());
        let sheet_id = require("SHEET_ID")?;
        let sheets_token = require("SHEETS_TOKEN")?;

        let allowed_users = match std::env::var("ALLOWED_USERS") {
            Ok(raw) => parse_allowed_users(&raw)?,
            Err(_) => Vec::new(),
        };

        let port: u16 = match std::env::var("WEBHOOK_PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "WEBHOOK_PORT".into(),
                message: format!("not a valid port: {raw}"),
            })?,
            Err(_) => 8080,
        };

        Ok(Self {
            telegram_token: SecretString::from(telegram_token),
            gemini_api_key: SecretString::from(gemini_api_key),
            gemini_model,
            sheet_id,
            sheets_token: SecretString::from(sheets_token),
            allowed_users,
            port,
        })
    }
}

fn require(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Parse the `ALLOWED_USERS` value: a JSON array of sender ids, numeric or
/// string, e.g. `[123456789, "987654321"]`.
fn parse_allowed_users(raw: &str) -> Result<Vec<String>, ConfigError> {
    let parsed: Vec<serde_json::Value> =
        serde_json::from_str(raw).map_err(|e| ConfigError::InvalidValue {
            key: "ALLOWED_USERS".into(),
            message: format!("expected a JSON array: {e}"),
        })?;

    Ok(parsed
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_users_numeric_and_string_ids() {
        let users = parse_allowed_users(r#"[123456789, "987654321"]"#).unwrap();
        assert_eq!(users, vec!["123456789", "987654321"]);
    }

    #[test]
    fn allowed_users_empty_array() {
        let users = parse_allowed_users("[]").unwrap();
        assert!(users.is_empty());
    }

    #[test]
    fn allowed_users_wildcard_entry() {
        let users = parse_allowed_users(r#"["*"]"#).unwrap();
        assert_eq!(users, vec!["*"]);
    }

    #[test]
    fn allowed_users_rejects_non_array() {
        assert!(parse_allowed_users("123").is_err());
        assert!(parse_allowed_users("not json").is_err());
    }

    #[test]
    fn allowed_users_skips_non_scalar_entries() {
        let users = parse_allowed_users(r#"[123, {"id": 4}, null]"#).unwrap();
        assert_eq!(users, vec!["123"]);
    }

    #[test]
    fn missing_env_error_names_the_key() {
        // The startup banner relies on this message to tell the operator
        // which variable is missing.
        let err = ConfigError::MissingEnvVar("TELEGRAM_TOKEN".into());
        assert!(err.to_string().contains("TELEGRAM_TOKEN"));
    }
}

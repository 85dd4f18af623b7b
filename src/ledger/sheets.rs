//! Google Sheets ledger backend (values:append).

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::pipeline::types::ValidatedRecord;

const BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Appends one row per record to the first sheet of a spreadsheet.
///
/// This client only spends the bearer token it is given; minting and
/// refreshing it is the deployment's concern.
pub struct SheetsLedger {
    client: reqwest::Client,
    sheet_id: String,
    token: SecretString,
}

impl SheetsLedger {
    pub fn new(sheet_id: impl Into<String>, token: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            sheet_id: sheet_id.into(),
            token,
        }
    }

    fn append_url(&self) -> String {
        format!(
            "{BASE_URL}/{}/values/A1:append?valueInputOption=USER_ENTERED",
            self.sheet_id
        )
    }
}

#[async_trait]
impl Ledger for SheetsLedger {
    async fn append(&self, record: &ValidatedRecord) -> Result<(), LedgerError> {
        let body = serde_json::json!({ "values": [record.to_row()] });

        let response = self
            .client
            .post(self.append_url())
            .bearer_auth(self.token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::AppendFailed {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(LedgerError::Api { status, message });
        }

        tracing::info!(
            amount = %record.amount,
            category = %record.category,
            "Ledger row appended"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_url_targets_values_append() {
        let ledger = SheetsLedger::new("sheet-123", SecretString::from("tok".to_string()));
        assert_eq!(
            ledger.append_url(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-123/values/A1:append?valueInputOption=USER_ENTERED"
        );
    }
}

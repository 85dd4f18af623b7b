//! Ledger — the append-only tabular store of validated expense records.

pub mod sheets;

pub use sheets::SheetsLedger;

use async_trait::async_trait;

use crate::error::LedgerError;
use crate::pipeline::types::ValidatedRecord;

/// Append-only ledger seam. One validated record becomes exactly one row;
/// the storage engine's append is assumed atomic, so no synchronization is
/// needed across concurrently processed updates.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn append(&self, record: &ValidatedRecord) -> Result<(), LedgerError>;
}

use thiserror::Error;

/// Why a filename was excluded from the reconciliation set. Never surfaced
/// as a user-facing failure; the scanner tallies these as skips.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("filename shorter than the 14-digit timestamp prefix")]
    TooShort,
    #[error("timestamp prefix contains non-digit characters")]
    NotDigits,
    #[error("timestamp prefix is not a valid calendar date/time")]
    InvalidDate,
}

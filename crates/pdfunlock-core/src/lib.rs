//! PDF unlocking
//!
//! This crate removes encryption and permission restrictions from PDFs using lopdf.
//!
//! The document is parsed without a password, its pages are copied into a
//! brand new document, and that document is written out with no encryption.

pub mod error;
pub mod metrics;
pub mod unlock;

pub use error::UnlockError;
pub use metrics::{EncryptionStatus, UnlockMetrics, UnlockOutcome};
pub use unlock::unlock_document;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encryption_status_was_encrypted() {
        assert!(!EncryptionStatus::Unencrypted.was_encrypted());
        assert!(EncryptionStatus::Decrypted.was_encrypted());
        assert!(EncryptionStatus::Stripped.was_encrypted());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(UnlockError::NoPages.to_string(), "PDF has no pages");
        assert!(UnlockError::ParseError("bad header".into())
            .to_string()
            .contains("bad header"));
    }
}

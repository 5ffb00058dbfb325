/// How the source document's encryption was dealt with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionStatus {
    /// No encryption dictionary in the source
    Unencrypted,
    /// Encrypted with an empty user password; objects were decrypted
    Decrypted,
    /// Encrypted with a user password we don't have; the encryption
    /// dictionary was dropped and objects copied as they are
    Stripped,
}

impl EncryptionStatus {
    pub fn was_encrypted(self) -> bool {
        !matches!(self, EncryptionStatus::Unencrypted)
    }
}

#[derive(Debug, Clone)]
pub struct UnlockMetrics {
    pub input_size_bytes: usize,
    pub output_size_bytes: usize,
    pub page_count: u32,
    pub processing_time_ms: u64,
    pub encryption: EncryptionStatus,
}

/// Result of a successful unlock
#[derive(Debug, Clone)]
pub struct UnlockOutcome {
    /// Serialized, unencrypted PDF
    pub bytes: Vec<u8>,
    pub metrics: UnlockMetrics,
}

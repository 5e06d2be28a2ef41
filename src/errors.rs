//! Error types.

/// Alias for [`core::result::Result`] with the `cosm-rsa` crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An argument was missing, malformed or out of range.
    #[error("invalid parameter")]
    InvalidParam,
    /// The key variant cannot be used for the requested operation.
    #[error("key type does not match the operation")]
    KeyTypeMismatch,
    /// The key or timestamp lies outside the key's validity window.
    #[error("key or timestamp expired")]
    Expired,
    /// Number storage could not grow to the requested size.
    #[error("allocation failure")]
    Allocation,
    /// Serialized data or decoded fields are not structurally valid.
    #[error("format error")]
    Format,
    /// The stored integrity check did not match after decryption.
    #[error("wrong passphrase")]
    WrongPassphrase,
    /// No modular inverse exists.
    #[error("no modular inverse")]
    NoInverse,
    /// Both primes came out equal; retry with fresh seed material.
    #[error("generated primes are equal")]
    DuplicatePrimes,
    /// The forward search from the seed ran out of room.
    #[error("prime search exhausted")]
    PrimeSearchExhausted,
    /// A signature decoded cleanly but carries a different hash.
    #[error("verification error")]
    Verification,
    /// A progress observer asked to stop.
    #[error("operation cancelled")]
    Cancelled,
    /// Value does not fit the requested machine integer.
    #[error("value truncated")]
    Truncated,
}

impl Error {
    /// Returns `true` for errors describing malformed or foreign data, as
    /// opposed to bad arguments or a wrong passphrase.
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format)
    }

    /// Returns `true` when the caller may simply retry with new random
    /// material.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::DuplicatePrimes | Error::PrimeSearchExhausted | Error::NoInverse
        )
    }
}

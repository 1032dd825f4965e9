use std::path::PathBuf;

/// Errors returned by the generator.
///
/// Functions in this crate return an [`anyhow::Error`].  Where the
/// failure is one of these conditions, the error can be recovered
/// using `err.downcast_ref::<Error>()`.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An identity name is empty.
    #[error("Identity names must not be empty")]
    EmptyName,

    /// An identity name contains a carriage return.
    #[error("{0:?} contains a carriage return")]
    CarriageReturnInName(String),

    /// An identity name occurs more than once in the input.
    #[error("{0:?} occurs more than once in the list of names")]
    DuplicateName(String),

    /// The OpenPGP implementation failed to generate or serialize
    /// the key for the named identity.
    #[error("Generating the key for {0:?}")]
    KeyGeneration(String, #[source] anyhow::Error),

    /// The output artifact could not be written.
    #[error("Writing {0:?}")]
    OutputWrite(PathBuf, #[source] std::io::Error),

    /// A rendered key map could not be parsed.
    #[error("Malformed key map: {0}")]
    MalformedKeymap(String),

    /// A record's fingerprint does not match its key material.
    #[error("{name:?}: recorded fingerprint {expected}, but the {what} \
             key has fingerprint {got}")]
    FingerprintMismatch {
        name: String,
        what: &'static str,
        expected: String,
        got: String,
    },

    /// A record's public and private halves do not belong together.
    #[error("{0:?}: {1}")]
    InconsistentKeyPair(String, String),
}

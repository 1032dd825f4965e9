use sequoia_openpgp as openpgp;
use openpgp::Result;
use openpgp::cert::CipherSuite;

/// The cipher suites that can be selected by name.
pub const CIPHER_SUITES: &[(&str, CipherSuite)] = &[
    ("cv25519", CipherSuite::Cv25519),
    ("rsa2k", CipherSuite::RSA2k),
    ("rsa3k", CipherSuite::RSA3k),
    ("rsa4k", CipherSuite::RSA4k),
    ("p256", CipherSuite::P256),
    ("p384", CipherSuite::P384),
    ("p521", CipherSuite::P521),
];

/// Controls how keys are generated.
#[derive(Debug, Clone)]
pub struct Config {
    cipher_suite: CipherSuite,
    jobs: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cipher_suite: CipherSuite::Cv25519,
            jobs: 1,
        }
    }
}

impl Config {
    /// Returns a new `Config`.
    ///
    /// By default, keys use Curve25519 and are generated one at a
    /// time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cipher suite of the generated keys.
    pub fn set_cipher_suite(&mut self, cipher_suite: CipherSuite)
        -> &mut Self
    {
        self.cipher_suite = cipher_suite;
        self
    }

    /// Returns the cipher suite of the generated keys.
    pub fn cipher_suite(&self) -> CipherSuite {
        self.cipher_suite
    }

    /// Sets the number of keys that are generated concurrently.
    ///
    /// `0` means one per CPU.
    pub fn set_jobs(&mut self, jobs: usize) -> &mut Self {
        self.jobs = jobs;
        self
    }

    /// Returns the number of keys that are generated concurrently.
    ///
    /// This is never `0`.
    pub fn jobs(&self) -> usize {
        if self.jobs == 0 {
            num_cpus::get()
        } else {
            self.jobs
        }
    }
}

/// Looks up a cipher suite by name.
///
/// Names are matched case insensitively.
pub fn parse_cipher_suite(name: &str) -> Result<CipherSuite> {
    CIPHER_SUITES.iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, cs)| *cs)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown cipher suite {:?}, expected one of: {}",
                name,
                CIPHER_SUITES.iter().map(|(n, _)| *n)
                    .collect::<Vec<_>>().join(", "))
        })
}

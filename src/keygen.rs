//! Generates key material and checks that it is consistent.

use std::io;

use anyhow::Context;

use sequoia_openpgp as openpgp;
use openpgp::Cert;
use openpgp::Result;
use openpgp::cert::CertBuilder;
use openpgp::cert::CipherSuite;
use openpgp::parse::Parse;
use openpgp::serialize::Serialize;
use openpgp::serialize::SerializeInto;
use openpgp::types::KeyFlags;

use crate::Config;
use crate::Error;
use crate::Identity;

/// The key material generated for a name.
///
/// A `KeyRecord` is created by [`KeyRecord::produce`], or read back
/// from a rendered key map by [`crate::render::parse`].  It is
/// immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    name: String,
    fingerprint: String,
    armored_public_key: String,
    armored_private_key: String,
}

impl KeyRecord {
    /// Returns a new `KeyRecord` from its parts.
    ///
    /// This does not check that the parts belong together.  Use
    /// [`KeyRecord::verify`] for that.
    pub fn new<N, F, P, S>(name: N, fingerprint: F,
                           armored_public_key: P, armored_private_key: S)
        -> Self
        where N: Into<String>, F: Into<String>,
              P: Into<String>, S: Into<String>,
    {
        KeyRecord {
            name: name.into(),
            fingerprint: fingerprint.into(),
            armored_public_key: armored_public_key.into(),
            armored_private_key: armored_private_key.into(),
        }
    }

    /// Generates a fresh key for `identity`, and records it under
    /// `name`.
    ///
    /// The secret key material is not password protected, and the
    /// key does not expire.
    ///
    /// If the OpenPGP implementation fails to generate or serialize
    /// the key, this returns an [`Error::KeyGeneration`].
    pub fn produce(name: &str, identity: &Identity, config: &Config)
        -> Result<Self>
    {
        Self::produce_(name, identity, config.cipher_suite())
            .map_err(|err| Error::KeyGeneration(name.into(), err).into())
    }

    fn produce_(name: &str, identity: &Identity, cipher_suite: CipherSuite)
        -> Result<Self>
    {
        let cert = time_it!(format!("Generating {:?}", name), {
            generate_cert(identity, cipher_suite)?
        });
        log::debug!("Generated {} for {:?}", cert.fingerprint(), name);

        let armored_private_key = String::from_utf8(
            cert.as_tsk().armored().to_vec()
                .context("Serializing the private key")?)
            .context("Armored private key is not UTF-8")?;
        let armored_public_key = String::from_utf8(
            cert.armored().to_vec()
                .context("Serializing the public key")?)
            .context("Armored public key is not UTF-8")?;

        Ok(KeyRecord {
            name: name.into(),
            fingerprint: hex_fingerprint(&cert),
            armored_public_key,
            armored_private_key,
        })
    }

    /// Returns the name the key was generated for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the primary key's fingerprint as lowercase hex.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Returns the armored certificate.
    pub fn armored_public_key(&self) -> &str {
        &self.armored_public_key
    }

    /// Returns the armored transferable secret key.
    pub fn armored_private_key(&self) -> &str {
        &self.armored_private_key
    }

    /// Parses the private key.
    pub fn to_cert(&self) -> Result<Cert> {
        Cert::from_bytes(self.armored_private_key.as_bytes())
            .with_context(|| format!("{:?}: Parsing the private key",
                                     self.name))
    }

    /// Checks that the record is internally consistent.
    ///
    /// Both halves must parse and have the recorded fingerprint, the
    /// private half must carry unencrypted secret key material for
    /// every key, and its public half must serialize to exactly the
    /// recorded public key.
    pub fn verify(&self) -> Result<()> {
        let public = Cert::from_bytes(self.armored_public_key.as_bytes())
            .with_context(|| format!("{:?}: Parsing the public key",
                                     self.name))?;
        self.check_fingerprint("public", &public)?;
        if public.is_tsk() {
            return Err(self.inconsistent(
                "the public key contains secret key material"));
        }

        let private = self.to_cert()?;
        self.check_fingerprint("private", &private)?;
        if private.keys().secret().count() != private.keys().count() {
            return Err(self.inconsistent(
                "the private key lacks secret key material"));
        }
        if private.keys().secret().any(|ka| ! ka.key().has_unencrypted_secret()) {
            return Err(self.inconsistent(
                "the private key's secret key material is encrypted"));
        }

        // Serializing a `Cert` only emits the public bits.
        let public_half = private.armored().to_vec()
            .context("Serializing the private key's public half")?;
        if public_half != self.armored_public_key.as_bytes() {
            return Err(self.inconsistent(
                "the private key's public half differs from the public key"));
        }

        Ok(())
    }

    fn check_fingerprint(&self, what: &'static str, cert: &Cert)
        -> Result<()>
    {
        let got = hex_fingerprint(cert);
        if got != self.fingerprint {
            return Err(Error::FingerprintMismatch {
                name: self.name.clone(),
                what,
                expected: self.fingerprint.clone(),
                got,
            }.into());
        }
        Ok(())
    }

    fn inconsistent(&self, reason: &str) -> anyhow::Error {
        Error::InconsistentKeyPair(self.name.clone(), reason.into()).into()
    }
}

/// Generates a certificate for `identity`.
///
/// The primary key can certify and sign, and there is one encryption
/// subkey.
fn generate_cert(identity: &Identity, cipher_suite: CipherSuite)
    -> Result<Cert>
{
    let (cert, _revocation) = CertBuilder::new()
        .set_cipher_suite(cipher_suite)
        .set_validity_period(None)
        .set_primary_key_flags(
            KeyFlags::empty().set_certification().set_signing())
        .add_userid(identity.userid())
        .add_subkey(
            KeyFlags::empty()
                .set_transport_encryption()
                .set_storage_encryption(),
            None,
            None)
        .generate()
        .context("Generating the certificate")?;

    // Fail early if the key can't be exported.
    cert.as_tsk().serialize(&mut io::sink())
        .context("Serializing the secret key material")?;

    Ok(cert)
}

fn hex_fingerprint(cert: &Cert) -> String {
    cert.fingerprint().to_hex().to_lowercase()
}

//! Generates OpenPGP key fixtures for keystore test suites.
//!
//! For each name in a list, this crate derives an [`Identity`],
//! generates a fresh key bound to it, and collects the armored key
//! material into a [`KeyTable`].  The table can be rendered as Rust
//! source using [`render`], and pulled into a test suite using
//! `include!`.
//!
//! Key generation is randomized: running the generator twice on the
//! same names yields tables with the same names and shapes, but
//! different keys.
//!
//! # Examples
//!
//! ```rust
//! use sequoia_openpgp as openpgp;
//! # use openpgp::Result;
//!
//! use keystore_keygen::Config;
//! use keystore_keygen::generate;
//! use keystore_keygen::render;
//!
//! # fn main() -> Result<()> {
//! let table = generate(&["example.com", "acme.com/services"],
//!                      &Config::default())?;
//! assert_eq!(table.len(), 2);
//!
//! let record = table.get("acme.com/services").expect("present");
//! assert_eq!(record.fingerprint().len(), 40);
//! record.verify()?;
//!
//! let text = render::render_to_string(&table);
//! assert_eq!(render::parse(&text)?, table);
//! # Ok(()) }
//! ```
use std::path::Path;

use rayon::prelude::*;

use sequoia_openpgp as openpgp;
use openpgp::Result;

#[macro_use] mod macros;

mod config;
pub use config::Config;
pub use config::parse_cipher_suite;
pub use config::CIPHER_SUITES;

mod error;
pub use error::Error;

pub mod identity;
pub use identity::Identity;

mod keygen;
pub use keygen::KeyRecord;

mod table;
pub use table::KeyTable;
pub use table::validate_names;

pub mod render;

/// The names keys are generated for by default.
pub const DEFAULT_NAMES: &[&str] = &[
    "example.com",
    "coreos.com",
    "example.com/app",
    "acme.com",
    "acme.com/services",
    "acme.com/services/web/nginx",
];

/// Generates a key for each name.
///
/// The names must be non-empty and unique.  They are checked before
/// any key is generated.
///
/// The returned table has one record per name, in the same order.
/// If generating any key fails, no table is returned, and the error
/// for the first name (in input order) that failed is returned.
pub fn generate<S>(names: &[S], config: &Config) -> Result<KeyTable>
    where S: AsRef<str> + Sync
{
    validate_names(names.iter().map(|n| n.as_ref()))?;

    let identities: Vec<(&str, Identity)> = names.iter()
        .map(|n| (n.as_ref(), Identity::derive(n.as_ref())))
        .collect();
    let produce = |(name, identity): &(&str, Identity)| {
        KeyRecord::produce(name, identity, config)
    };

    let jobs = thread_count(config, identities.len());
    let records = if jobs == 1 {
        identities.iter().map(produce).collect::<Result<Vec<_>>>()?
    } else {
        log::debug!("Generating {} keys using {} threads",
                    identities.len(), jobs);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()?;
        // Collect all results, so that the error is deterministic.
        let results: Vec<Result<KeyRecord>> = pool.install(|| {
            identities.par_iter().map(produce).collect()
        });
        results.into_iter().collect::<Result<Vec<_>>>()?
    };

    KeyTable::from_records(records)
}

/// Returns the number of threads to generate `keys` keys with.
///
/// There is no point in starting more threads than there are keys.
fn thread_count(config: &Config, keys: usize) -> usize {
    config.jobs().min(keys).max(1)
}

/// Generates a key for each name, and writes the key map to `path`.
///
/// `path` is only replaced if all keys were generated and the key
/// map was written completely.
pub fn generate_keymap<S>(names: &[S], config: &Config, path: &Path)
    -> Result<KeyTable>
    where S: AsRef<str> + Sync
{
    let table = generate(names, config)?;
    render::write_keymap(&table, path)?;
    Ok(table)
}

/// Prints the error and causes, if any.
pub fn print_error_chain(err: &anyhow::Error) {
    let _ = write_error_chain_into(&mut std::io::stderr(), err);
}

/// Prints the error and causes, if any.
pub fn write_error_chain_into(sink: &mut dyn std::io::Write, err: &anyhow::Error)
                              -> Result<()> {
    writeln!(sink, "           {}", err)?;
    for cause in err.chain().skip(1) {
        writeln!(sink, "  because: {}", cause)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use openpgp::Cert;
    use openpgp::parse::Parse;

    #[test]
    fn generate_defaults() {
        let table = generate(DEFAULT_NAMES, &Config::default())
            .expect("can generate");
        assert_eq!(table.names().collect::<Vec<_>>(), DEFAULT_NAMES);

        for record in &table {
            record.verify().expect("consistent");

            let identity = Identity::derive(record.name());
            let cert = Cert::from_bytes(record.armored_public_key().as_bytes())
                .expect("valid");
            assert!(cert.userids().any(|ua| ua.userid() == &identity.userid()),
                    "{}", record.name());
        }
    }

    #[test]
    fn generate_parallel() {
        let mut config = Config::default();
        config.set_jobs(3);
        let names = [ "a.example", "b.example", "c.example", "d.example" ];
        let table = generate(&names, &config).expect("can generate");
        assert_eq!(table.names().collect::<Vec<_>>(), names);
        table.verify().expect("consistent");
    }

    #[test]
    fn thread_count_is_capped() {
        let mut config = Config::default();
        config.set_jobs(10000);
        assert_eq!(thread_count(&config, 6), 6);
        assert_eq!(thread_count(&config, 1), 1);
        assert_eq!(thread_count(&config, 0), 1);

        config.set_jobs(2);
        assert_eq!(thread_count(&config, 6), 2);

        config.set_jobs(0);
        assert!(thread_count(&config, 6) >= 1);
        assert!(thread_count(&config, 6) <= 6);
    }

    #[test]
    fn generate_nothing() {
        let names: [&str; 0] = [];
        let table = generate(&names, &Config::default()).expect("ok");
        assert!(table.is_empty());
    }

    #[test]
    fn generate_rejects_duplicates() {
        let names = [ "example.com", "coreos.com", "example.com" ];
        let err = generate(&names, &Config::default())
            .expect_err("duplicate");
        match err.downcast_ref::<Error>() {
            Some(Error::DuplicateName(name)) =>
                assert_eq!(name, "example.com"),
            _ => panic!("Expected Error::DuplicateName, got: {}", err),
        }
    }

    #[test]
    fn error_chain() {
        let err = anyhow::Error::from(Error::KeyGeneration(
            "example.com".into(), anyhow::anyhow!("out of entropy")));
        let mut sink = Vec::new();
        write_error_chain_into(&mut sink, &err).expect("can write");
        let text = String::from_utf8(sink).expect("utf-8");
        assert!(text.contains("Generating the key for \"example.com\""),
                "{}", text);
        assert!(text.contains("because: out of entropy"), "{}", text);
    }
}

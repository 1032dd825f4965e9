//! Renders a [`KeyTable`] as Rust source, and reads it back.
//!
//! The generated file defines a private `keymap` module, and is meant
//! to be pulled into a test suite using `include!`:
//!
//! ```text
//! include!("keymap.rs");
//!
//! let key = keymap::get("example.com").expect("present");
//! let cert = Cert::from_bytes(key.armored_private_key)?;
//! ```
//!
//! All strings are emitted as raw string literals, so the armored
//! blocks appear in the file exactly as they were generated.

use std::io;
use std::io::Write;
use std::path::Path;

use sequoia_openpgp as openpgp;
use openpgp::Result;

use crate::Error;
use crate::KeyRecord;
use crate::KeyTable;

/// The first line of every rendered key map.
pub const HEADER: &str = "// Code generated by keystore-keygen.  DO NOT EDIT!";

/// Renders `table` into `sink`.
pub fn render<W>(table: &KeyTable, sink: &mut W) -> io::Result<()>
    where W: Write + ?Sized
{
    writeln!(sink, "{}", HEADER)?;
    writeln!(sink, "//")?;
    writeln!(sink, "// Regenerate it using `keystore-keygen generate`.")?;
    writeln!(sink)?;
    writeln!(sink, "#[allow(non_upper_case_globals, dead_code)] mod keymap {{")?;
    writeln!(sink, "    pub struct KeyDetails {{")?;
    writeln!(sink, "        pub fingerprint: &'static str,")?;
    writeln!(sink, "        pub armored_public_key: &'static str,")?;
    writeln!(sink, "        pub armored_private_key: &'static str,")?;
    writeln!(sink, "    }}")?;
    writeln!(sink)?;
    writeln!(sink, "    pub const keys: &[(&str, KeyDetails)] = &[")?;
    for record in table {
        writeln!(sink, "        ({}, KeyDetails {{",
                 raw_string_literal(record.name()))?;
        writeln!(sink, "            fingerprint: {},",
                 raw_string_literal(record.fingerprint()))?;
        writeln!(sink, "            armored_public_key: {},",
                 raw_string_literal(record.armored_public_key()))?;
        writeln!(sink, "            armored_private_key: {},",
                 raw_string_literal(record.armored_private_key()))?;
        writeln!(sink, "        }}),")?;
    }
    writeln!(sink, "    ];")?;
    writeln!(sink)?;
    writeln!(sink, "    pub fn get(name: &str) -> Option<&'static KeyDetails> {{")?;
    writeln!(sink, "        keys.iter().find(|(n, _)| *n == name).map(|(_, k)| k)")?;
    writeln!(sink, "    }}")?;
    writeln!(sink, "}}")?;
    Ok(())
}

/// Renders `table` into a string.
pub fn render_to_string(table: &KeyTable) -> String {
    let mut buffer = Vec::new();
    render(table, &mut buffer).expect("writing to a vec doesn't fail");
    String::from_utf8(buffer).expect("rendered from strings")
}

/// Renders `table` to the file `path`, replacing it.
///
/// The key map is written to a temporary file next to `path`, which
/// is only renamed to `path` once it has been completely written.  On
/// failure, `path` is left alone and an [`Error::OutputWrite`] is
/// returned.
pub fn write_keymap(table: &KeyTable, path: &Path) -> Result<()> {
    let wrap = |err: io::Error| {
        anyhow::Error::from(Error::OutputWrite(path.to_path_buf(), err))
    };

    let dir = match path.parent() {
        Some(dir) if ! dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".keymap")
        .tempfile_in(dir)
        .map_err(wrap)?;

    {
        let mut sink = io::BufWriter::new(tmp.as_file_mut());
        render(table, &mut sink).map_err(wrap)?;
        sink.flush().map_err(wrap)?;
    }
    tmp.as_file().sync_all().map_err(wrap)?;
    tmp.persist(path).map_err(|err| wrap(err.error))?;

    log::info!("Wrote {} keys to {}", table.len(), path.display());
    Ok(())
}

/// Returns `s` as a raw string literal.
///
/// The literal is delimited by one more `#` than the longest run of
/// `#`s following a `"` in `s`, so `s` never needs escaping.
pub fn raw_string_literal(s: &str) -> String {
    let hashes = s.match_indices('"')
        .map(|(i, _)| s[i + 1..].chars().take_while(|&c| c == '#').count())
        .max()
        .unwrap_or(0)
        + 1;
    let hashes = "#".repeat(hashes);
    format!("r{}\"{}\"{}", hashes, s, hashes)
}

/// Parses a key map produced by [`render`].
///
/// This does not check the key material; use [`KeyTable::verify`]
/// for that.
pub fn parse(text: &str) -> Result<KeyTable> {
    if ! text.starts_with(HEADER) {
        return Err(Error::MalformedKeymap(
            "missing generated code header".into()).into());
    }

    let literals = raw_string_literals(text)?;
    if literals.len() % 4 != 0 {
        return Err(Error::MalformedKeymap(format!(
            "expected four strings per key, got {} strings",
            literals.len())).into());
    }

    KeyTable::from_records(literals.chunks(4).map(|fields| {
        KeyRecord::new(fields[0], fields[1], fields[2], fields[3])
    }))
}

/// Returns the contents of the raw string literals in `text`.
fn raw_string_literals(text: &str) -> Result<Vec<&str>> {
    let mut literals = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("r#") {
        let prefix_ok = rest[..start].chars().next_back()
            .map(|c| ! (c.is_alphanumeric() || c == '_'))
            .unwrap_or(true);
        let after_r = &rest[start + 1..];
        let hashes = after_r.chars().take_while(|&c| c == '#').count();
        let after_hashes = &after_r[hashes..];

        if ! prefix_ok || ! after_hashes.starts_with('"') {
            rest = after_hashes;
            continue;
        }

        let body = &after_hashes[1..];
        let terminator = format!("\"{}", "#".repeat(hashes));
        let end = body.find(&terminator).ok_or_else(|| {
            Error::MalformedKeymap("unterminated string".into())
        })?;
        literals.push(&body[..end]);
        rest = &body[end + terminator.len()..];
    }

    Ok(literals)
}

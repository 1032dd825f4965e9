use std::collections::HashSet;

use sequoia_openpgp as openpgp;
use openpgp::Result;

use crate::Error;
use crate::KeyRecord;

/// An ordered table of key records.
///
/// The records are kept in the order they were added, which is the
/// order of the names the table was generated from.  Names are
/// unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyTable {
    records: Vec<KeyRecord>,
}

impl KeyTable {
    /// Returns an empty table.
    pub fn empty() -> Self {
        KeyTable::default()
    }

    /// Returns a table holding `records`, in order.
    ///
    /// Fails if a record's name is rejected by [`validate_names`].
    pub fn from_records<I>(records: I) -> Result<Self>
        where I: IntoIterator<Item=KeyRecord>
    {
        let records: Vec<KeyRecord> = records.into_iter().collect();
        validate_names(records.iter().map(|r| r.name()))?;
        Ok(KeyTable { records })
    }

    /// Returns the record for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&KeyRecord> {
        self.records.iter().find(|r| r.name() == name)
    }

    /// Returns the names in order.
    pub fn names(&self) -> impl Iterator<Item=&str> {
        self.records.iter().map(|r| r.name())
    }

    /// Returns the records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, KeyRecord> {
        self.records.iter()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Verifies every record using [`KeyRecord::verify`].
    ///
    /// Stops at the first inconsistent record.
    pub fn verify(&self) -> Result<()> {
        for record in self {
            record.verify()?;
            log::debug!("{:?}: {} is consistent",
                        record.name(), record.fingerprint());
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a KeyTable {
    type Item = &'a KeyRecord;
    type IntoIter = std::slice::Iter<'a, KeyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Checks that the names are non-empty and unique.
///
/// Fails with [`Error::EmptyName`], [`Error::CarriageReturnInName`]
/// or [`Error::DuplicateName`].
///
/// Names must not contain a carriage return: rustc rejects bare CRs
/// in the raw string literals the key map is rendered with.
pub fn validate_names<'a, I>(names: I) -> Result<()>
    where I: IntoIterator<Item=&'a str>
{
    let mut seen = HashSet::new();
    for name in names {
        if name.is_empty() {
            return Err(Error::EmptyName.into());
        }
        if name.contains('\r') {
            return Err(Error::CarriageReturnInName(name.into()).into());
        }
        if ! seen.insert(name) {
            return Err(Error::DuplicateName(name.into()).into());
        }
    }
    Ok(())
}

//! Maps identity names to the User IDs embedded in generated keys.

use sequoia_openpgp as openpgp;
use openpgp::packet::UserID;

/// The display name every generated key carries.
pub const DISPLAY_NAME: &str = "signer";

/// The identity a generated key is bound to.
///
/// An identity is derived from a name like
/// `acme.com/services/web/nginx`: the comment repeats the name, and
/// the email address's domain is the name's first path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    display_name: &'static str,
    comment: String,
    email: String,
}

impl Identity {
    /// Derives the identity for `name`.
    ///
    /// ```
    /// use keystore_keygen::Identity;
    ///
    /// let identity = Identity::derive("acme.com/services/web/nginx");
    /// assert_eq!(identity.email(), "signer@acme.com");
    /// assert_eq!(identity.comment(),
    ///            "acme.com/services/web/nginx Signing Key");
    /// ```
    pub fn derive(name: &str) -> Self {
        Identity {
            display_name: DISPLAY_NAME,
            comment: format!("{} Signing Key", name),
            email: format!("{}@{}", DISPLAY_NAME, first_segment(name)),
        }
    }

    /// Returns the display name.
    pub fn display_name(&self) -> &str {
        self.display_name
    }

    /// Returns the comment.
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Returns the email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the User ID, `name (comment) <email>`.
    pub fn userid(&self) -> UserID {
        UserID::from(format!("{} ({}) <{}>",
                             self.display_name, self.comment, self.email))
    }
}

/// Returns the part of `name` before the first `/`.
///
/// If `name` does not contain a `/`, this is all of `name`.
pub fn first_segment(name: &str) -> &str {
    name.split('/').next().unwrap_or(name)
}

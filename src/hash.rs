//! Content fingerprints
//!
//! A fingerprint is the lowercase hex SHA-1 of the six plural forms of a
//! message, concatenated in the fixed order `zero one two few many other`
//! (absent forms contribute the empty string). The identifier and any other
//! metadata never take part, so two messages with the same plural content
//! always share a fingerprint.
//!
//! This is a change detector, not a security primitive.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::message::{Message, PluralForm};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Fingerprint {
    fn from(value: &str) -> Self {
        Fingerprint(value.to_string())
    }
}

/// Compute the fingerprint of a message's translatable content
pub fn fingerprint(message: &Message) -> Fingerprint {
    let mut hasher = Sha1::new();
    for form in PluralForm::ALL {
        hasher.update(message.form(form).as_bytes());
    }
    Fingerprint(hex::encode(hasher.finalize()))
}

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::hash::{self, Fingerprint};
use crate::signature::Signatures;

/// CLDR plural categories, in fingerprint order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralForm {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralForm {
    pub const ALL: [PluralForm; 6] = [
        PluralForm::Zero,
        PluralForm::One,
        PluralForm::Two,
        PluralForm::Few,
        PluralForm::Many,
        PluralForm::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PluralForm::Zero => "zero",
            PluralForm::One => "one",
            PluralForm::Two => "two",
            PluralForm::Few => "few",
            PluralForm::Many => "many",
            PluralForm::Other => "other",
        }
    }
}

impl fmt::Display for PluralForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One translatable message and its localized plural forms.
///
/// `hash` is not recomputed on read. Whoever loads a catalog decides where
/// the fingerprint comes from: the content itself for source and staging
/// catalogs, the persisted signature set for a target catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub description: Option<String>,
    pub zero: String,
    pub one: String,
    pub two: String,
    pub few: String,
    pub many: String,
    pub other: String,
    pub hash: Option<Fingerprint>,
}

impl Message {
    pub fn new(id: &str) -> Self {
        Message {
            id: id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_form(mut self, form: PluralForm, text: &str) -> Self {
        self.set_form(form, text.to_string());
        self
    }

    pub fn form(&self, form: PluralForm) -> &str {
        match form {
            PluralForm::Zero => &self.zero,
            PluralForm::One => &self.one,
            PluralForm::Two => &self.two,
            PluralForm::Few => &self.few,
            PluralForm::Many => &self.many,
            PluralForm::Other => &self.other,
        }
    }

    pub fn set_form(&mut self, form: PluralForm, text: String) {
        let slot = match form {
            PluralForm::Zero => &mut self.zero,
            PluralForm::One => &mut self.one,
            PluralForm::Two => &mut self.two,
            PluralForm::Few => &mut self.few,
            PluralForm::Many => &mut self.many,
            PluralForm::Other => &mut self.other,
        };
        *slot = text;
    }

    /// True when no plural form carries any text
    pub fn is_blank(&self) -> bool {
        PluralForm::ALL.iter().all(|f| self.form(*f).is_empty())
    }

    /// Fingerprint of the current content, ignoring the stored `hash`
    pub fn fingerprint(&self) -> Fingerprint {
        hash::fingerprint(self)
    }

    pub fn refresh_fingerprint(&mut self) {
        self.hash = Some(self.fingerprint());
    }

    /// Same plural content, regardless of id, description or stored hash
    pub fn same_content(&self, other: &Message) -> bool {
        PluralForm::ALL
            .iter()
            .all(|f| self.form(*f) == other.form(*f))
    }
}

/// Mapping from message identifier to message.
///
/// Iteration follows identifier order so that encoded catalogs are stable
/// between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog(BTreeMap<String, Message>);

impl Catalog {
    pub fn new() -> Self {
        Catalog(BTreeMap::new())
    }

    /// Insert a message keyed by its own id, replacing any previous entry
    pub fn insert(&mut self, message: Message) -> Option<Message> {
        self.0.insert(message.id.clone(), message)
    }

    pub fn with_message(&mut self, message: Message) -> &mut Self {
        self.insert(message);
        self
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.0.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Message> {
        self.0.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.0.values()
    }

    /// Recompute every fingerprint from content
    pub fn refresh_fingerprints(&mut self) {
        for message in self.0.values_mut() {
            message.refresh_fingerprint();
        }
    }

    /// Overwrite fingerprints with the recorded signature of each id present
    /// in both. Entries without a recorded signature keep whatever they had.
    pub fn apply_signatures(&mut self, signatures: &Signatures) {
        for (id, message) in self.0.iter_mut() {
            if let Some(recorded) = signatures.get(id) {
                message.hash = Some(recorded.clone());
            }
        }
    }

    /// Signature set describing this catalog.
    ///
    /// An entry without a stored fingerprint contributes the fingerprint of
    /// its content.
    pub fn signatures(&self) -> Signatures {
        self.0
            .iter()
            .map(|(id, message)| {
                let hash = message
                    .hash
                    .clone()
                    .unwrap_or_else(|| message.fingerprint());
                (id.clone(), hash)
            })
            .collect()
    }
}

impl FromIterator<Message> for Catalog {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for message in iter {
            catalog.insert(message);
        }
        catalog
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Message;
    type IntoIter = std::collections::btree_map::Values<'a, String, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.values()
    }
}

/// On-disk shape of one message: `{zero?, one?, ..., other?, description?}`
#[derive(Debug, Default, Serialize, Deserialize)]
struct Record {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    zero: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    one: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    two: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    few: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    many: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    other: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

// A bare string is shorthand for `{other: ...}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRecord {
    Text(String),
    Forms(Record),
}

impl From<&Message> for Record {
    fn from(message: &Message) -> Self {
        Record {
            zero: message.zero.clone(),
            one: message.one.clone(),
            two: message.two.clone(),
            few: message.few.clone(),
            many: message.many.clone(),
            other: message.other.clone(),
            description: message.description.clone(),
        }
    }
}

impl RawRecord {
    fn into_message(self, id: String) -> Message {
        match self {
            RawRecord::Text(other) => Message {
                id,
                other,
                ..Default::default()
            },
            RawRecord::Forms(record) => Message {
                id,
                description: record.description,
                zero: record.zero,
                one: record.one,
                two: record.two,
                few: record.few,
                many: record.many,
                other: record.other,
                hash: None,
            },
        }
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let records: BTreeMap<&str, Record> = self
            .0
            .iter()
            .map(|(id, message)| (id.as_str(), Record::from(message)))
            .collect();
        records.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, Option<RawRecord>>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(id, record)| match record {
                Some(record) => record.into_message(id),
                None => Message {
                    id,
                    ..Default::default()
                },
            })
            .collect())
    }
}

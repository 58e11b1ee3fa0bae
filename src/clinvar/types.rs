//! ClinVar document types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Key under which every document stores its source-scoped fields.
pub const SOURCE_KEY: &str = "clinvar";

/// Genomic identifier of the form `chr<chrom>:g.<locus>`.
///
/// This is the merge key: rows that resolve to the same ID describe the same
/// variant regardless of which submission produced them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalId(String);

impl CanonicalId {
    /// Build an ID from a chromosome and a `g.` locus expression.
    pub fn new(chrom: &str, locus: impl AsRef<str>) -> Self {
        Self(format!("chr{}:g.{}", chrom, locus.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Chromosome and start position, as the leading digits of the locus.
    ///
    /// Rows sorted by chromosome then start keep every ID inside one run of
    /// equal keys.
    pub fn sort_key(&self) -> (&str, &str) {
        let rest = self.0.strip_prefix("chr").unwrap_or(&self.0);
        let (chrom, locus) = rest.split_once(":g.").unwrap_or((rest, ""));
        let digits = locus
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(locus.len());
        (chrom, &locus[..digits])
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Mutation category assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    /// `X>Y` base substitution
    Substitution,
    /// `ins<bases>` or `ins<count>`
    Insertion,
    /// Variant type column says `deletion`
    Deletion,
    /// Variant type column says `indel`
    Indel,
    /// `dup` token
    Duplication,
    /// `inv` token
    Inversion,
    /// Any run of bases; the weakest signal
    Replacement,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Substitution => "substitution",
            Self::Insertion => "insertion",
            Self::Deletion => "deletion",
            Self::Indel => "indel",
            Self::Duplication => "duplication",
            Self::Inversion => "inversion",
            Self::Replacement => "replacement",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A search document: the canonical ID plus the nested `clinvar` body.
///
/// Serializes as `{"_id": "...", "clinvar": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantDocument {
    /// Document key.
    #[serde(rename = "_id")]
    pub id: CanonicalId,
    /// Source-scoped fields.
    #[serde(rename = "clinvar")]
    pub body: Map<String, Value>,
}

impl VariantDocument {
    /// Create a document with an empty body.
    pub fn new(id: CanonicalId) -> Self {
        Self {
            id,
            body: Map::new(),
        }
    }

    /// Look up a field by dotted path, e.g. `"genome.start"`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.body.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// The body as a JSON object, without the `_id`.
    pub fn source(&self) -> Value {
        Value::Object(self.body.clone())
    }
}

use crate::graph::SchemaLocation;
use crate::keyword::{self, Strategy};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Structural problems in the AST JSON handed over by the schema
/// compiler. Schema *semantics* are that collaborator's problem; these
/// errors only cover payloads this crate cannot decode at all.
#[derive(Debug, Error)]
pub enum AstError {
    #[error("AST document must be a JSON object with `ast` and `schemaUri` fields")]
    BadDocument,
    #[error("entry at {location} must be a boolean or an array of keyword triples")]
    BadEntry { location: String },
    #[error("keyword triple at {location} must be a [keywordId, location, value] array")]
    BadTriple { location: String },
    #[error("keyword {keyword} at {location} expects a schema reference payload")]
    BadReference { keyword: String, location: String },
    #[error("invalid AST JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Typed payload of one keyword, selected by the keyword's fixed
/// arity. Reference-carrying shapes accept the upstream compiler's
/// `[annotation, location]` pair encoding as well as a bare location.
#[derive(Debug, Clone, PartialEq)]
pub enum KeywordValue {
    Reference(SchemaLocation),
    ReferenceList(Vec<SchemaLocation>),
    ReferenceMap(Vec<(String, SchemaLocation)>),
    Literal(Value),
}

impl KeywordValue {
    fn decode(strategy: Strategy, keyword: &str, location: &str, raw: &Value) -> Result<Self, AstError> {
        let bad_ref = || AstError::BadReference {
            keyword: keyword.to_string(),
            location: location.to_string(),
        };
        match strategy {
            Strategy::Leaf => Ok(Self::Literal(raw.clone())),
            Strategy::Ref | Strategy::Single => {
                Ok(Self::Reference(decode_reference(raw).ok_or_else(bad_ref)?))
            }
            Strategy::List | Strategy::Definitions | Strategy::DefsList => {
                let items = raw.as_array().ok_or_else(bad_ref)?;
                let mut refs = Vec::with_capacity(items.len());
                for item in items {
                    refs.push(decode_reference(item).ok_or_else(bad_ref)?);
                }
                Ok(Self::ReferenceList(refs))
            }
            Strategy::Map => {
                let map = raw.as_object().ok_or_else(bad_ref)?;
                let mut entries = Vec::with_capacity(map.len());
                for (name, target) in map {
                    let target = target.as_str().ok_or_else(bad_ref)?;
                    entries.push((name.clone(), target.to_string()));
                }
                Ok(Self::ReferenceMap(entries))
            }
        }
    }
}

/// A bare location string, or the `[annotation, location]` pair some
/// keywords (items, then, else, patternProperties entries) arrive as.
fn decode_reference(raw: &Value) -> Option<SchemaLocation> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Array(pair) if pair.len() == 2 => pair[1].as_str().map(str::to_string),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordTriple {
    /// Absolute keyword identifier, e.g.
    /// `https://json-schema.org/keyword/properties`.
    pub keyword_id: String,
    /// Location of the keyword itself within the schema document.
    pub location: String,
    pub value: KeywordValue,
}

/// One schema position: a boolean literal (trivially true/false
/// schema) or its ordered recognized keyword assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum AstEntry {
    Boolean(bool),
    Keywords(Vec<KeywordTriple>),
}

/// Compiled schema handed over by the upstream compiler: every
/// reachable location mapped to its entry, plus the root location the
/// traversal starts from.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaAst {
    pub root: SchemaLocation,
    pub entries: BTreeMap<SchemaLocation, AstEntry>,
}

impl SchemaAst {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn from_str(text: &str) -> Result<Self, AstError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Decodes `{ "ast": { location: entry, ... }, "schemaUri": "..." }`.
    pub fn from_value(value: &Value) -> Result<Self, AstError> {
        let doc = value.as_object().ok_or(AstError::BadDocument)?;
        let root = doc
            .get("schemaUri")
            .and_then(Value::as_str)
            .ok_or(AstError::BadDocument)?;
        let raw_entries = doc
            .get("ast")
            .and_then(Value::as_object)
            .ok_or(AstError::BadDocument)?;

        let mut ast = Self::new(root);
        for (location, raw) in raw_entries {
            let entry = decode_entry(location, raw)?;
            ast.entries.insert(location.clone(), entry);
        }
        Ok(ast)
    }

    pub fn entry(&self, location: &str) -> Option<&AstEntry> {
        self.entries.get(location)
    }
}

fn decode_entry(location: &str, raw: &Value) -> Result<AstEntry, AstError> {
    match raw {
        Value::Bool(b) => Ok(AstEntry::Boolean(*b)),
        Value::Array(rows) => {
            let mut triples = Vec::with_capacity(rows.len());
            for row in rows {
                triples.push(decode_triple(location, row)?);
            }
            Ok(AstEntry::Keywords(triples))
        }
        _ => Err(AstError::BadEntry {
            location: location.to_string(),
        }),
    }
}

fn decode_triple(location: &str, row: &Value) -> Result<KeywordTriple, AstError> {
    let parts = row.as_array().filter(|p| p.len() == 3).ok_or_else(|| {
        AstError::BadTriple {
            location: location.to_string(),
        }
    })?;
    let keyword_id = parts[0].as_str().ok_or_else(|| AstError::BadTriple {
        location: location.to_string(),
    })?;
    let keyword_location = parts[1].as_str().ok_or_else(|| AstError::BadTriple {
        location: location.to_string(),
    })?;

    // Unrecognized keywords decode as literals so the compiler's
    // fallback path can still render a placeholder for them.
    let strategy = keyword::resolve(keyword_id)
        .map(|spec| spec.strategy)
        .unwrap_or(Strategy::Leaf);
    let value = KeywordValue::decode(strategy, keyword_id, location, &parts[2])?;

    Ok(KeywordTriple {
        keyword_id: keyword_id.to_string(),
        location: keyword_location.to_string(),
        value,
    })
}

/// Read view over an AST plus a side table of synthetic entries. The
/// compiler re-roots `definitions` payloads under a `{parent}/$defs`
/// pseudo-location; the overlay keeps that off the caller's input.
#[derive(Debug)]
pub struct AstOverlay<'a> {
    base: &'a SchemaAst,
    synthetic: HashMap<SchemaLocation, AstEntry>,
}

impl<'a> AstOverlay<'a> {
    pub fn new(base: &'a SchemaAst) -> Self {
        Self {
            base,
            synthetic: HashMap::new(),
        }
    }

    pub fn entry(&self, location: &str) -> Option<&AstEntry> {
        self.synthetic
            .get(location)
            .or_else(|| self.base.entry(location))
    }

    pub fn insert_synthetic(&mut self, location: SchemaLocation, entry: AstEntry) {
        self.synthetic.insert(location, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_boolean_and_keyword_entries() {
        let doc = json!({
            "schemaUri": "#",
            "ast": {
                "#": [["https://json-schema.org/keyword/type", "#/type", "object"]],
                "#/a": true
            }
        });
        let ast = SchemaAst::from_value(&doc).unwrap();
        assert_eq!(ast.root, "#");
        assert!(matches!(ast.entry("#/a"), Some(AstEntry::Boolean(true))));
        let AstEntry::Keywords(triples) = ast.entry("#").unwrap() else {
            panic!("expected keyword entry");
        };
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].value, KeywordValue::Literal(json!("object")));
    }

    #[test]
    fn decodes_pair_encoded_references() {
        let doc = json!({
            "schemaUri": "#",
            "ast": {
                "#": [["https://json-schema.org/keyword/items", "#/items", [true, "#/items"]]],
                "#/items": true
            }
        });
        let ast = SchemaAst::from_value(&doc).unwrap();
        let AstEntry::Keywords(triples) = ast.entry("#").unwrap() else {
            panic!("expected keyword entry");
        };
        assert_eq!(
            triples[0].value,
            KeywordValue::Reference("#/items".to_string())
        );
    }

    #[test]
    fn decodes_property_maps_in_order() {
        let doc = json!({
            "schemaUri": "#",
            "ast": {
                "#": [["https://json-schema.org/keyword/properties", "#/properties",
                       {"b": "#/b", "a": "#/a"}]],
                "#/a": true,
                "#/b": true
            }
        });
        let ast = SchemaAst::from_value(&doc).unwrap();
        let AstEntry::Keywords(triples) = ast.entry("#").unwrap() else {
            panic!("expected keyword entry");
        };
        let KeywordValue::ReferenceMap(props) = &triples[0].value else {
            panic!("expected reference map");
        };
        // Source order survives decoding, not alphabetical order.
        assert_eq!(props.len(), 2);
        assert_eq!(props[0], ("b".to_string(), "#/b".to_string()));
        assert_eq!(props[1], ("a".to_string(), "#/a".to_string()));
    }

    #[test]
    fn rejects_malformed_triples() {
        let doc = json!({
            "schemaUri": "#",
            "ast": { "#": [["only-two-parts", "#"]] }
        });
        assert!(matches!(
            SchemaAst::from_value(&doc),
            Err(AstError::BadTriple { .. })
        ));
    }

    #[test]
    fn overlay_prefers_synthetic_entries() {
        let mut base = SchemaAst::new("#");
        base.entries.insert("#".to_string(), AstEntry::Boolean(true));
        let mut overlay = AstOverlay::new(&base);
        overlay.insert_synthetic("#/$defs".to_string(), AstEntry::Boolean(false));
        assert!(matches!(overlay.entry("#"), Some(AstEntry::Boolean(true))));
        assert!(matches!(
            overlay.entry("#/$defs"),
            Some(AstEntry::Boolean(false))
        ));
    }
}

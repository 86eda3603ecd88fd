use crate::graph::KeywordTable;
use crate::palette::Palette;

pub const BOOLEAN_SCHEMA_KEY: &str = "booleanSchema";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    ObjectSchema,
    BooleanSchema,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaSubtype {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
    BooleanSchemaTrue,
    BooleanSchemaFalse,
    Reference,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: SchemaKind,
    pub subtype: SchemaSubtype,
}

const OBJECT_KEYWORDS: &[&str] = &[
    "properties",
    "additionalProperties",
    "patternProperties",
    "dependentSchemas",
    "propertyNames",
    "dependentRequired",
    "maxProperties",
    "minProperties",
    "required",
];

const ARRAY_KEYWORDS: &[&str] = &[
    "items",
    "prefixItems",
    "contains",
    "maxItems",
    "minItems",
    "maxContains",
    "minContains",
    "uniqueItems",
];

const STRING_KEYWORDS: &[&str] = &["maxLength", "minLength", "pattern"];

const NUMBER_KEYWORDS: &[&str] = &[
    "exclusiveMaximum",
    "exclusiveMinimum",
    "maximum",
    "minimum",
    "multipleOf",
];

/// Infers a node's rendered type from its accumulated keyword table.
/// Total: any table, including an empty one, classifies; first match
/// wins. An explicit string-valued `type` short-circuits everything.
pub fn classify(keywords: &KeywordTable) -> Classification {
    if let Some(display) = keywords.get("type") {
        if let Some(name) = display.value.as_str() {
            return Classification {
                kind: SchemaKind::ObjectSchema,
                subtype: subtype_from_name(name),
            };
        }
    }

    if let Some(display) = keywords.get(BOOLEAN_SCHEMA_KEY) {
        let subtype = if display.value.as_bool().unwrap_or(false) {
            SchemaSubtype::BooleanSchemaTrue
        } else {
            SchemaSubtype::BooleanSchemaFalse
        };
        return Classification {
            kind: SchemaKind::BooleanSchema,
            subtype,
        };
    }

    let has_any = |names: &[&str]| names.iter().any(|name| keywords.contains(name));
    let subtype = if has_any(OBJECT_KEYWORDS) {
        SchemaSubtype::Object
    } else if has_any(ARRAY_KEYWORDS) {
        SchemaSubtype::Array
    } else if has_any(STRING_KEYWORDS) {
        SchemaSubtype::String
    } else if has_any(NUMBER_KEYWORDS) {
        SchemaSubtype::Number
    } else if keywords.contains("$ref") {
        SchemaSubtype::Reference
    } else {
        SchemaSubtype::Other
    };

    Classification {
        kind: SchemaKind::ObjectSchema,
        subtype,
    }
}

fn subtype_from_name(name: &str) -> SchemaSubtype {
    match name {
        "string" => SchemaSubtype::String,
        "number" => SchemaSubtype::Number,
        "integer" => SchemaSubtype::Integer,
        "boolean" => SchemaSubtype::Boolean,
        "array" => SchemaSubtype::Array,
        "object" => SchemaSubtype::Object,
        "null" => SchemaSubtype::Null,
        _ => SchemaSubtype::Other,
    }
}

pub fn color_for(subtype: SchemaSubtype, palette: &Palette) -> String {
    match subtype {
        SchemaSubtype::String => palette.string.clone(),
        SchemaSubtype::Number => palette.number.clone(),
        SchemaSubtype::Integer => palette.integer.clone(),
        SchemaSubtype::Boolean => palette.boolean.clone(),
        SchemaSubtype::Array => palette.array.clone(),
        SchemaSubtype::Object => palette.object.clone(),
        SchemaSubtype::Null => palette.null.clone(),
        SchemaSubtype::BooleanSchemaTrue => palette.boolean_schema_true.clone(),
        SchemaSubtype::BooleanSchemaFalse => palette.boolean_schema_false.clone(),
        SchemaSubtype::Reference => palette.reference.clone(),
        SchemaSubtype::Other => palette.others.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::KeywordDisplay;
    use serde_json::json;

    fn table(entries: &[(&str, serde_json::Value)]) -> KeywordTable {
        let mut table = KeywordTable::default();
        for (key, value) in entries {
            table.insert(*key, KeywordDisplay::plain(value.clone()));
        }
        table
    }

    #[test]
    fn explicit_type_wins() {
        let c = classify(&table(&[
            ("type", json!("string")),
            ("properties", json!(["a"])),
        ]));
        assert_eq!(c.kind, SchemaKind::ObjectSchema);
        assert_eq!(c.subtype, SchemaSubtype::String);
    }

    #[test]
    fn non_string_type_falls_through_to_structure() {
        let c = classify(&table(&[
            ("type", json!(["string", "null"])),
            ("minLength", json!(1)),
        ]));
        assert_eq!(c.subtype, SchemaSubtype::String);
    }

    #[test]
    fn boolean_schema_marker() {
        let t = classify(&table(&[(BOOLEAN_SCHEMA_KEY, json!(true))]));
        assert_eq!(t.kind, SchemaKind::BooleanSchema);
        assert_eq!(t.subtype, SchemaSubtype::BooleanSchemaTrue);
        let f = classify(&table(&[(BOOLEAN_SCHEMA_KEY, json!(false))]));
        assert_eq!(f.subtype, SchemaSubtype::BooleanSchemaFalse);
    }

    #[test]
    fn priority_object_over_array_over_scalar() {
        let c = classify(&table(&[
            ("minimum", json!(0)),
            ("items", json!("#/items")),
            ("required", json!(["a"])),
        ]));
        assert_eq!(c.subtype, SchemaSubtype::Object);
    }

    #[test]
    fn ref_only_classifies_as_reference() {
        let c = classify(&table(&[("$ref", json!("#/a"))]));
        assert_eq!(c.subtype, SchemaSubtype::Reference);
    }

    #[test]
    fn empty_table_is_other() {
        let c = classify(&KeywordTable::default());
        assert_eq!(c.kind, SchemaKind::ObjectSchema);
        assert_eq!(c.subtype, SchemaSubtype::Other);
    }

    #[test]
    fn every_subtype_has_a_color() {
        let palette = Palette::default();
        for subtype in [
            SchemaSubtype::String,
            SchemaSubtype::Number,
            SchemaSubtype::Integer,
            SchemaSubtype::Boolean,
            SchemaSubtype::Array,
            SchemaSubtype::Object,
            SchemaSubtype::Null,
            SchemaSubtype::BooleanSchemaTrue,
            SchemaSubtype::BooleanSchemaFalse,
            SchemaSubtype::Reference,
            SchemaSubtype::Other,
        ] {
            assert!(!color_for(subtype, &palette).is_empty());
        }
    }
}

use once_cell::sync::Lazy;
use std::collections::HashMap;

const KEYWORD_BASE: &str = "https://json-schema.org/keyword/";

/// Vocabulary category, in canonical display order. The normalizer
/// stable-sorts each location's keywords by this rank so recompiling
/// unchanged schema text reproduces the same node and handle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Core,
    Applicator,
    Validation,
    Metadata,
    FormatContent,
    Unevaluated,
    Unknown,
}

impl Category {
    pub fn rank(self) -> u8 {
        self as u8
    }
}

/// How a keyword's value is traversed. A closed set: every recognized
/// keyword resolves to exactly one strategy, and unrecognized keywords
/// fall through to the caller's fallback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Scalar/array literal rendered in place. No recursion, no handle.
    Leaf,
    /// `$ref`: single reference, child node keeps an empty label.
    Ref,
    /// Single sub-schema reference (if/then/else/items/not/...).
    Single,
    /// Ordered list of sub-schema references (allOf/anyOf/oneOf/...).
    List,
    /// Property name -> sub-schema reference map (properties).
    Map,
    /// `definitions`: payload is re-rooted under a synthetic
    /// `{parent}/$defs` location and rendered as a sibling subtree.
    Definitions,
    /// `$defs` list inside the synthetic definitions location.
    DefsList,
}

#[derive(Debug, Clone, Copy)]
pub struct KeywordSpec {
    pub name: &'static str,
    pub category: Category,
    pub strategy: Strategy,
}

macro_rules! keyword {
    ($name:literal, $cat:ident, $strat:ident) => {
        keyword!($name, $name, $cat, $strat)
    };
    // Some keywords display differently from their IRI segment
    // ($ref, $comment).
    ($segment:literal, $name:literal, $cat:ident, $strat:ident) => {
        (
            concat!("https://json-schema.org/keyword/", $segment),
            KeywordSpec {
                name: $name,
                category: Category::$cat,
                strategy: Strategy::$strat,
            },
        )
    };
}

static CATALOG: Lazy<HashMap<&'static str, KeywordSpec>> = Lazy::new(|| {
    let mut entries: Vec<(&'static str, KeywordSpec)> = vec![
        // Core
        keyword!("ref", "$ref", Core, Ref),
        keyword!("comment", "$comment", Core, Leaf),
        keyword!("definitions", Core, Definitions),
        keyword!("$defs", Core, DefsList),
        // Applicator
        keyword!("allOf", Applicator, List),
        keyword!("anyOf", Applicator, List),
        keyword!("oneOf", Applicator, List),
        keyword!("if", Applicator, Single),
        keyword!("then", Applicator, Single),
        keyword!("else", Applicator, Single),
        keyword!("properties", Applicator, Map),
        keyword!("additionalProperties", Applicator, Single),
        keyword!("patternProperties", Applicator, List),
        keyword!("contains", Applicator, Single),
        keyword!("items", Applicator, Single),
        keyword!("prefixItems", Applicator, List),
        keyword!("not", Applicator, Single),
        keyword!("propertyNames", Applicator, Single),
        // Validation
        keyword!("type", Validation, Leaf),
        keyword!("enum", Validation, Leaf),
        keyword!("const", Validation, Leaf),
        keyword!("maxLength", Validation, Leaf),
        keyword!("minLength", Validation, Leaf),
        keyword!("pattern", Validation, Leaf),
        keyword!("exclusiveMaximum", Validation, Leaf),
        keyword!("exclusiveMinimum", Validation, Leaf),
        keyword!("maximum", Validation, Leaf),
        keyword!("minimum", Validation, Leaf),
        keyword!("multipleOf", Validation, Leaf),
        keyword!("dependentRequired", Validation, Leaf),
        keyword!("maxProperties", Validation, Leaf),
        keyword!("minProperties", Validation, Leaf),
        keyword!("required", Validation, Leaf),
        keyword!("maxItems", Validation, Leaf),
        keyword!("minItems", Validation, Leaf),
        keyword!("maxContains", Validation, Leaf),
        keyword!("minContains", Validation, Leaf),
        keyword!("uniqueItems", Validation, Leaf),
        // Metadata
        keyword!("default", Metadata, Leaf),
        keyword!("title", Metadata, Leaf),
        keyword!("description", Metadata, Leaf),
        keyword!("deprecated", Metadata, Leaf),
        keyword!("examples", Metadata, Leaf),
        keyword!("readOnly", Metadata, Leaf),
        keyword!("writeOnly", Metadata, Leaf),
        // Content
        keyword!("contentEncoding", FormatContent, Leaf),
        keyword!("contentMediaType", FormatContent, Leaf),
        keyword!("contentSchema", FormatContent, Leaf),
        // Unevaluated
        keyword!("unevaluatedProperties", Unevaluated, Single),
        keyword!("unevaluatedItems", Unevaluated, Single),
    ];
    // Format annotation lives under its dialect path but displays as
    // plain "format".
    entries.push((
        "https://json-schema.org/keyword/draft-2020-12/format",
        KeywordSpec {
            name: "format",
            category: Category::FormatContent,
            strategy: Strategy::Leaf,
        },
    ));
    // The upstream compiler funnels unrecognized vocabulary through a
    // single "unknown" keyword whose value is an arbitrary literal.
    entries.push((
        "https://json-schema.org/keyword/unknown",
        KeywordSpec {
            name: "unknown",
            category: Category::Unknown,
            strategy: Strategy::Leaf,
        },
    ));
    entries.into_iter().collect()
});

/// Resolves a keyword's absolute identifier to its spec. Fragments are
/// stripped first, matching how the upstream compiler addresses
/// keywords. `None` routes to the fallback handler.
pub fn resolve(keyword_id: &str) -> Option<&'static KeywordSpec> {
    let absolute = keyword_id.split('#').next().unwrap_or(keyword_id);
    CATALOG.get(absolute)
}

/// Category used for ordering; unknown keywords always sort last.
pub fn category_of(keyword_id: &str) -> Category {
    resolve(keyword_id)
        .map(|spec| spec.category)
        .unwrap_or(Category::Unknown)
}

/// Short display name for an unrecognized keyword identifier: the last
/// path segment of the IRI.
pub fn short_name(keyword_id: &str) -> &str {
    let absolute = keyword_id.split('#').next().unwrap_or(keyword_id);
    absolute.rsplit('/').next().unwrap_or(absolute)
}

pub fn keyword_iri(name: &str) -> String {
    format!("{KEYWORD_BASE}{name}")
}

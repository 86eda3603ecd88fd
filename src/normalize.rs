use crate::ast::{AstEntry, SchemaAst};
use crate::keyword;

/// Reorders every location's keyword triples into canonical vocabulary
/// order: core, applicators, validation, metadata, format/content,
/// unevaluated, unknown last. The sort is stable, so keywords within
/// one category keep the order the schema compiler emitted, and
/// triples never move between locations. Recompiling unchanged schema
/// text therefore reproduces identical node and handle ordering.
pub fn normalize(ast: &SchemaAst) -> SchemaAst {
    let mut normalized = SchemaAst::new(ast.root.clone());
    for (location, entry) in &ast.entries {
        let entry = match entry {
            AstEntry::Boolean(b) => AstEntry::Boolean(*b),
            AstEntry::Keywords(triples) => {
                let mut triples = triples.clone();
                triples.sort_by_key(|t| keyword::category_of(&t.keyword_id).rank());
                AstEntry::Keywords(triples)
            }
        };
        normalized.entries.insert(location.clone(), entry);
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{KeywordTriple, KeywordValue};
    use serde_json::json;

    fn triple(keyword: &str, value: KeywordValue) -> KeywordTriple {
        KeywordTriple {
            keyword_id: crate::keyword::keyword_iri(keyword),
            location: format!("#/{keyword}"),
            value,
        }
    }

    #[test]
    fn sorts_by_vocabulary_category() {
        let mut ast = SchemaAst::new("#");
        ast.entries.insert(
            "#".to_string(),
            AstEntry::Keywords(vec![
                triple("title", KeywordValue::Literal(json!("x"))),
                triple("type", KeywordValue::Literal(json!("object"))),
                triple("ref", KeywordValue::Reference("#/a".to_string())),
                triple(
                    "properties",
                    KeywordValue::ReferenceMap(vec![("a".to_string(), "#/a".to_string())]),
                ),
            ]),
        );

        let normalized = normalize(&ast);
        let AstEntry::Keywords(triples) = normalized.entry("#").unwrap() else {
            panic!("expected keyword entry");
        };
        let names: Vec<&str> = triples
            .iter()
            .map(|t| crate::keyword::short_name(&t.keyword_id))
            .collect();
        assert_eq!(names, vec!["ref", "properties", "type", "title"]);
    }

    #[test]
    fn sort_is_stable_within_a_category() {
        let mut ast = SchemaAst::new("#");
        ast.entries.insert(
            "#".to_string(),
            AstEntry::Keywords(vec![
                triple("minLength", KeywordValue::Literal(json!(1))),
                triple("maxLength", KeywordValue::Literal(json!(5))),
                triple("pattern", KeywordValue::Literal(json!("^a"))),
            ]),
        );

        let normalized = normalize(&ast);
        let AstEntry::Keywords(triples) = normalized.entry("#").unwrap() else {
            panic!("expected keyword entry");
        };
        let names: Vec<&str> = triples
            .iter()
            .map(|t| crate::keyword::short_name(&t.keyword_id))
            .collect();
        assert_eq!(names, vec!["minLength", "maxLength", "pattern"]);
    }

    #[test]
    fn unknown_keywords_sort_last_and_nothing_is_dropped() {
        let mut ast = SchemaAst::new("#");
        ast.entries.insert(
            "#".to_string(),
            AstEntry::Keywords(vec![
                KeywordTriple {
                    keyword_id: "https://example.com/keyword/widget".to_string(),
                    location: "#/widget".to_string(),
                    value: KeywordValue::Literal(json!(42)),
                },
                triple("type", KeywordValue::Literal(json!("string"))),
            ]),
        );

        let normalized = normalize(&ast);
        let AstEntry::Keywords(triples) = normalized.entry("#").unwrap() else {
            panic!("expected keyword entry");
        };
        assert_eq!(triples.len(), 2);
        assert_eq!(crate::keyword::short_name(&triples[0].keyword_id), "type");
        assert_eq!(crate::keyword::short_name(&triples[1].keyword_id), "widget");
    }

    #[test]
    fn boolean_entries_pass_through() {
        let mut ast = SchemaAst::new("#");
        ast.entries.insert("#".to_string(), AstEntry::Boolean(false));
        let normalized = normalize(&ast);
        assert!(matches!(
            normalized.entry("#"),
            Some(AstEntry::Boolean(false))
        ));
    }
}

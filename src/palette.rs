use serde::{Deserialize, Serialize};

/// Node colors keyed by classified schema subtype. Defaults are the
/// neon palette the rendering surface styles nodes and edges with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub string: String,
    pub number: String,
    pub integer: String,
    pub boolean: String,
    pub array: String,
    pub object: String,
    pub null: String,
    pub boolean_schema_true: String,
    pub boolean_schema_false: String,
    pub reference: String,
    pub others: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            string: "#FF6EFF".to_string(),               // neon magenta
            number: "#00FF95".to_string(),               // neon mint
            integer: "#00FF95".to_string(),              // neon mint
            boolean: "#FFEA00".to_string(),              // neon yellow
            array: "#FF8F00".to_string(),                // neon amber
            object: "#00E5FF".to_string(),               // neon cyan
            null: "#A259FF".to_string(),                 // neon purple
            boolean_schema_true: "#12FF4B".to_string(),  // neon green
            boolean_schema_false: "#FF3B3B".to_string(), // neon red
            reference: "#FFE1BD".to_string(),            // soft neon cream
            others: "#CCCCCC".to_string(),               // soft gray
        }
    }
}

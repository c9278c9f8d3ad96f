//! Context assembly from retrieved records

use serde_json::Value;

use crate::vector::RetrievedRecord;

/// Assembled model context for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledContext {
    /// Sentence naming every metadata field present in the batch
    pub summary: String,
    /// Concatenated per-record blocks
    pub combined: String,
}

/// Assembler for turning retrieved records into model context
///
/// One metadata field is distinguished as the record body (the
/// transcript text); it is rendered both as a regular field line and as
/// a labeled segment at the end of each block.
pub struct ContextAssembler {
    body_field: String,
}

impl ContextAssembler {
    /// Create an assembler that labels `body_field` as the record body
    #[must_use]
    pub fn new(body_field: impl Into<String>) -> Self {
        Self {
            body_field: body_field.into(),
        }
    }

    /// Assemble context from a batch of retrieved records
    ///
    /// Pure function of the batch: the same records in the same order
    /// always produce identical output.
    #[must_use]
    pub fn assemble(&self, records: &[RetrievedRecord]) -> AssembledContext {
        let fields = field_union(records);

        let summary = format!(
            "The following metadata fields are included: {}.",
            fields.join(", ")
        );

        let mut combined = String::new();
        for record in records {
            let metadata_lines = fields
                .iter()
                .map(|field| {
                    let value = record
                        .metadata
                        .get(field)
                        .map(value_text)
                        .unwrap_or_default();
                    format!("{field}: {value}")
                })
                .collect::<Vec<_>>()
                .join("\n");

            let body = record
                .metadata
                .get(&self.body_field)
                .map(value_text)
                .unwrap_or_default();

            combined.push_str(&format!(
                "{metadata_lines}\n{}:\n{body}\n\n",
                self.body_field
            ));
        }

        AssembledContext { summary, combined }
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new("Transcript")
    }
}

/// Distinct metadata field names across a batch, in first-appearance
/// order (batch order, then per-record key order)
#[must_use]
pub fn field_union(records: &[RetrievedRecord]) -> Vec<String> {
    let mut fields = Vec::new();
    for record in records {
        for name in record.metadata.keys() {
            if !fields.contains(name) {
                fields.push(name.clone());
            }
        }
    }
    fields
}

/// Render a metadata value as prompt text
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

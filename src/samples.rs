/*!
 * Hand-written example configuration values
 *
 * These samples double as the content written by `aktool init` and as the
 * source of the schemas used to validate user-edited configuration. Each
 * schema is inferred once, on first use.
 */

use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::schema::Schema;

/// Top-level key holding the exclusion rules
pub const STRUCTURE_CONFIG_KEY: &str = "StructureConfig";

/// Top-level key holding the copy rules
pub const COPY_RULE_KEY: &str = "CopyRule";

/// Example exclusion rules
pub static STRUCTURE_CONFIG_SAMPLE: Lazy<Value> = Lazy::new(|| {
    json!({
        "excludeFolders": ["example"],
        "excludeExtensions": [".txt"],
        "excludeFiles": ["example.txt"],
        "excludeName": ["*amp*", "exam*", "*mple*", "example"],
        "excludeCode": {
            "folders": ["example"],
            "extensions": [".txt"],
            "files": ["example.txt"],
            "name": ["*amp*", "exam*", "*mple*", "example"]
        }
    })
});

/// Example copy rules
pub static COPY_RULE_SAMPLE: Lazy<Value> = Lazy::new(|| {
    json!([
        {
            "source": "example/script.js",
            "destination": "copie/script_copy.js",
            "injection": [
                { "text": "// injected at the top", "position": 1 },
                { "text": "// injected at the end", "position": -1 }
            ]
        }
    ])
});

/// Schema of the `StructureConfig` section
pub static STRUCTURE_CONFIG_SCHEMA: Lazy<Schema> =
    Lazy::new(|| Schema::infer(&STRUCTURE_CONFIG_SAMPLE));

/// Schema of the `CopyRule` section
pub static COPY_RULE_SCHEMA: Lazy<Schema> = Lazy::new(|| Schema::infer(&COPY_RULE_SAMPLE));

/// Complete example configuration document
pub fn example_document() -> Value {
    json!({
        STRUCTURE_CONFIG_KEY: STRUCTURE_CONFIG_SAMPLE.clone(),
        COPY_RULE_KEY: COPY_RULE_SAMPLE.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{validate, ScalarKind};

    #[test]
    fn test_samples_validate_against_their_schemas() {
        assert_eq!(
            validate(&STRUCTURE_CONFIG_SAMPLE, &STRUCTURE_CONFIG_SCHEMA),
            *STRUCTURE_CONFIG_SAMPLE
        );
        assert_eq!(validate(&COPY_RULE_SAMPLE, &COPY_RULE_SCHEMA), *COPY_RULE_SAMPLE);
    }

    #[test]
    fn test_copy_rule_schema_shape() {
        let Schema::ArrayOf(rule) = &*COPY_RULE_SCHEMA else {
            panic!("copy rules are an array");
        };
        let Schema::RecordOf(fields) = rule.as_ref() else {
            panic!("a copy rule is a record");
        };
        assert_eq!(fields["source"], Schema::Scalar(ScalarKind::String));
        assert!(matches!(fields["injection"], Schema::ArrayOf(_)));
    }

    #[test]
    fn test_example_document_keys() {
        let doc = example_document();
        assert!(doc.get(STRUCTURE_CONFIG_KEY).is_some());
        assert!(doc.get(COPY_RULE_KEY).is_some());
    }
}

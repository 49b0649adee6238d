//! Q Business takes data source connector configuration as a free-form document; this converts
//! the JSON from our config file into the SDK's document type.

use aws_smithy_types::{Document, Number};
use std::collections::HashMap;

pub(crate) fn json_to_document(value: &serde_json::Value) -> Document {
    match value {
        serde_json::Value::Null => Document::Null,
        serde_json::Value::Bool(b) => Document::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Document::Number(Number::PosInt(u))
            } else if let Some(i) = n.as_i64() {
                Document::Number(Number::NegInt(i))
            } else if let Some(f) = n.as_f64() {
                Document::Number(Number::Float(f))
            } else {
                Document::String(n.to_string())
            }
        }
        serde_json::Value::String(s) => Document::String(s.clone()),
        serde_json::Value::Array(values) => {
            Document::Array(values.iter().map(json_to_document).collect())
        }
        serde_json::Value::Object(map) => Document::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_document(v)))
                .collect::<HashMap<_, _>>(),
        ),
    }
}

#[cfg(test)]
mod test {
    use super::json_to_document;
    use aws_smithy_types::{Document, Number};
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn numbers_keep_their_kind() {
        assert_eq!(
            json_to_document(&json!(50)),
            Document::Number(Number::PosInt(50))
        );
        assert_eq!(
            json_to_document(&json!(-3)),
            Document::Number(Number::NegInt(-3))
        );
        assert_eq!(
            json_to_document(&json!(1.5)),
            Document::Number(Number::Float(1.5))
        );
    }

    #[test]
    fn s3_connector_configuration() {
        let configuration = json!({
            "type": "S3",
            "syncMode": "FULL_CRAWL",
            "additionalProperties": {
                "bucketName": "regulatory-docs",
                "inclusionPrefixes": ["regulations/"],
                "exclusionPatterns": [],
                "enableDeletionProtection": false,
                "maxFileSizeInMegaBytes": 50,
                "aclConfigurationFilePath": null
            }
        });

        let expected = Document::Object(HashMap::from([
            ("type".to_string(), Document::String("S3".to_string())),
            (
                "syncMode".to_string(),
                Document::String("FULL_CRAWL".to_string()),
            ),
            (
                "additionalProperties".to_string(),
                Document::Object(HashMap::from([
                    (
                        "bucketName".to_string(),
                        Document::String("regulatory-docs".to_string()),
                    ),
                    (
                        "inclusionPrefixes".to_string(),
                        Document::Array(vec![Document::String("regulations/".to_string())]),
                    ),
                    ("exclusionPatterns".to_string(), Document::Array(vec![])),
                    ("enableDeletionProtection".to_string(), Document::Bool(false)),
                    (
                        "maxFileSizeInMegaBytes".to_string(),
                        Document::Number(Number::PosInt(50)),
                    ),
                    ("aclConfigurationFilePath".to_string(), Document::Null),
                ])),
            ),
        ]));

        assert_eq!(json_to_document(&configuration), expected);
    }
}

//! # Manifest Decoder
//!
//! Decodes manifest documents into [`DecodedResource`] values.
//!
//! A document is parsed as a structured record (YAML, or JSON when it starts
//! with `{`), its `apiVersion`/`kind` tag is looked up in the
//! [`KindRegistry`], and the registered typed decoder builds the body.
//! Blank documents, unknown tags and bodies that do not fit the typed schema
//! are all decode errors; nothing is skipped silently.

use super::registry::KindRegistry;
use super::resource::DecodedResource;
use super::split::{split_documents, ManifestDocument};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("document is empty")]
    EmptyDocument,
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("document is not an object")]
    NotAnObject,
    #[error("document is missing {0}")]
    MissingField(&'static str),
    #[error("unsupported resource kind {kind} in {api_version}")]
    UnknownKind { api_version: String, kind: String },
    #[error("invalid {kind} in {api_version}: {source}")]
    InvalidBody {
        api_version: String,
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Decode failure of one document within an entry
#[derive(Debug, Error)]
#[error("document {index}: {source}")]
pub struct DocumentError {
    pub index: usize,
    #[source]
    pub source: DecodeError,
}

/// Decode a single manifest document
///
/// # Errors
///
/// Returns a [`DecodeError`] if the document is blank, malformed, of an
/// unregistered kind, or lacks `metadata.name`.
pub fn decode_document(
    document: &ManifestDocument<'_>,
    registry: &KindRegistry,
) -> Result<DecodedResource, DecodeError> {
    if document.is_blank() {
        return Err(DecodeError::EmptyDocument);
    }

    let value = parse_structured(document.text)?;
    if !value.is_object() {
        return Err(DecodeError::NotAnObject);
    }

    let api_version = string_field(&value, &["apiVersion"])
        .ok_or(DecodeError::MissingField("apiVersion"))?;
    let kind = string_field(&value, &["kind"]).ok_or(DecodeError::MissingField("kind"))?;

    let entry = registry
        .lookup(&api_version, &kind)
        .ok_or_else(|| DecodeError::UnknownKind {
            api_version: api_version.clone(),
            kind: kind.clone(),
        })?;

    let body = entry
        .decode(value)
        .map_err(|source| DecodeError::InvalidBody {
            api_version: api_version.clone(),
            kind: kind.clone(),
            source,
        })?;

    let metadata = body.metadata();
    let name = metadata
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .ok_or(DecodeError::MissingField("metadata.name"))?;
    let namespace = metadata.namespace.clone().unwrap_or_default();

    Ok(DecodedResource {
        kind,
        api_version,
        name,
        namespace,
        body,
    })
}

/// Lazily decode every document of an entry, in order
///
/// Callers that stop at the first error never decode the documents after it.
pub fn decode_documents<'a>(
    blob: &'a str,
    registry: &'a KindRegistry,
) -> impl Iterator<Item = Result<DecodedResource, DocumentError>> + 'a {
    split_documents(blob).into_iter().map(move |document| {
        decode_document(&document, registry).map_err(|source| DocumentError {
            index: document.index,
            source,
        })
    })
}

/// Decode every document of an entry, failing on the first bad one
///
/// # Errors
///
/// Returns the [`DocumentError`] of the first document that fails to decode.
pub fn parse_all(blob: &str, registry: &KindRegistry) -> Result<Vec<DecodedResource>, DocumentError> {
    decode_documents(blob, registry).collect()
}

fn parse_structured(text: &str) -> Result<Value, DecodeError> {
    if text.trim_start().starts_with('{') {
        serde_json::from_str(text).map_err(DecodeError::Json)
    } else {
        Ok(serde_yaml::from_str(text)?)
    }
}

fn string_field(value: &Value, path: &[&str]) -> Option<String> {
    path.iter()
        .try_fold(value, |current, segment| current.get(segment))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::manifest::registry::ResourceBody;

    const INGRESS_JSON: &str = r#"
        {
            "apiVersion": "networking.k8s.io/v1",
            "kind": "Ingress",
            "metadata": {
                "name": "test-ingress"
            },
            "spec": {
                "defaultBackend": {
                    "service": { "name": "testsvc", "port": { "number": 80 } }
                }
            }
        }"#;

    const NETWORK_POLICY_YAML: &str = "
apiVersion: networking.k8s.io/v1
kind: NetworkPolicy
metadata:
  name: deny-all
  namespace: somewhere-else
spec:
  podSelector: {}
  policyTypes:
    - Ingress
";

    const CRON_JOB_YAML: &str = "
apiVersion: batch/v1
kind: CronJob
metadata:
  name: nightly-cleanup
spec:
  schedule: \"0 3 * * *\"
  jobTemplate:
    spec:
      template:
        spec:
          restartPolicy: OnFailure
          containers:
            - name: cleanup
              image: busybox:1.36
              args: [\"sh\", \"-c\", \"echo done\"]
";

    fn doc(text: &str) -> ManifestDocument<'_> {
        ManifestDocument { index: 0, text }
    }

    #[test]
    fn test_decode_json_document() {
        let registry = KindRegistry::builtin();
        let resource = decode_document(&doc(INGRESS_JSON), &registry).unwrap();
        assert_eq!(resource.kind, "Ingress");
        assert_eq!(resource.api_version, "networking.k8s.io/v1");
        assert_eq!(resource.name, "test-ingress");
        assert_eq!(resource.namespace, "");
        assert!(matches!(resource.body, ResourceBody::Ingress(_)));
    }

    #[test]
    fn test_decode_yaml_document_keeps_template_namespace() {
        let registry = KindRegistry::builtin();
        let resource = decode_document(&doc(NETWORK_POLICY_YAML), &registry).unwrap();
        assert_eq!(resource.kind, "NetworkPolicy");
        assert_eq!(resource.name, "deny-all");
        assert_eq!(resource.namespace, "somewhere-else");
    }

    #[test]
    fn test_decode_workload_kind() {
        let registry = KindRegistry::builtin();
        let resource = decode_document(&doc(CRON_JOB_YAML), &registry).unwrap();
        assert_eq!(resource.kind, "CronJob");
        assert_eq!(resource.api_version, "batch/v1");
        assert_eq!(resource.name, "nightly-cleanup");
        match &resource.body {
            ResourceBody::CronJob(cron_job) => {
                let spec = cron_job.spec.as_ref().unwrap();
                assert_eq!(spec.schedule, "0 3 * * *");
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_blank_document_is_an_error() {
        let registry = KindRegistry::builtin();
        let err = decode_document(&doc("  \n\t\n"), &registry).unwrap_err();
        assert!(matches!(err, DecodeError::EmptyDocument));
    }

    #[test]
    fn test_unknown_kind_is_an_error() {
        let registry = KindRegistry::builtin();
        let text = "apiVersion: example.com/v1\nkind: Widget\nmetadata:\n  name: w\n";
        let err = decode_document(&doc(text), &registry).unwrap_err();
        match err {
            DecodeError::UnknownKind { api_version, kind } => {
                assert_eq!(api_version, "example.com/v1");
                assert_eq!(kind, "Widget");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_missing_type_tag_fields() {
        let registry = KindRegistry::builtin();
        let err = decode_document(&doc("kind: ConfigMap\nmetadata:\n  name: x\n"), &registry)
            .unwrap_err();
        assert!(matches!(err, DecodeError::MissingField("apiVersion")));

        let err = decode_document(&doc("apiVersion: v1\nmetadata:\n  name: x\n"), &registry)
            .unwrap_err();
        assert!(matches!(err, DecodeError::MissingField("kind")));
    }

    #[test]
    fn test_missing_name_is_an_error() {
        let registry = KindRegistry::builtin();
        let err = decode_document(
            &doc("apiVersion: v1\nkind: ConfigMap\nmetadata: {}\n"),
            &registry,
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::MissingField("metadata.name")));
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let registry = KindRegistry::builtin();
        let err = decode_document(&doc("apiVersion: [v1\nkind: x"), &registry).unwrap_err();
        assert!(matches!(err, DecodeError::Yaml(_)));
    }

    #[test]
    fn test_scalar_document_is_not_an_object() {
        let registry = KindRegistry::builtin();
        let err = decode_document(&doc("just a string"), &registry).unwrap_err();
        assert!(matches!(err, DecodeError::NotAnObject));
    }

    #[test]
    fn test_body_not_matching_schema_is_an_error() {
        let registry = KindRegistry::builtin();
        let text = "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: x\ndata: [1, 2]\n";
        let err = decode_document(&doc(text), &registry).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidBody { .. }));
    }

    #[test]
    fn test_parse_all_preserves_document_order() {
        let registry = KindRegistry::builtin();
        let blob = format!("{NETWORK_POLICY_YAML}---\n{INGRESS_JSON}");
        let resources = parse_all(&blob, &registry).unwrap();
        let names: Vec<&str> = resources.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["deny-all", "test-ingress"]);
    }

    #[test]
    fn test_parse_all_reports_failing_document_index() {
        let registry = KindRegistry::builtin();
        let blob = format!("{NETWORK_POLICY_YAML}---\nkind: Broken\n");
        let err = parse_all(&blob, &registry).unwrap_err();
        assert_eq!(err.index, 1);
        assert!(matches!(err.source, DecodeError::MissingField("apiVersion")));
    }

    #[test]
    fn test_decode_documents_reports_leading_blank_document() {
        let registry = KindRegistry::builtin();
        let blob = format!("---\n{NETWORK_POLICY_YAML}");
        let mut iter = decode_documents(&blob, &registry);
        let first = iter.next().unwrap();
        assert!(matches!(
            first,
            Err(DocumentError {
                index: 0,
                source: DecodeError::EmptyDocument
            })
        ));
    }
}

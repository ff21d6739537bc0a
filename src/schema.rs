//! CRD breaking-change detection
//!
//! Diffs the openAPIV3Schema of two versions of a CRD document and reports
//! the property paths the new schema dropped. A renamed or removed field is
//! a breaking change for anyone with stored resources.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{Error, Result};

/// Property paths present in `old` but absent in `new`, as dotted paths in
/// sorted order.
pub fn removed_fields(old: &Path, new: &Path) -> Result<Vec<String>> {
    let old_schema = load_schema(old)?;
    let new_schema = load_schema(new)?;

    let mut removed = Vec::new();
    diff_properties(&old_schema, &new_schema, "", &mut removed);
    removed.sort();
    Ok(removed)
}

/// Read a CRD YAML document and pull out the first version's schema.
fn load_schema(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)?;
    let doc: Value = serde_norway::from_str(&raw)?;

    doc.pointer("/spec/versions/0/schema/openAPIV3Schema")
        .cloned()
        .ok_or_else(|| {
            Error::Schema(format!(
                "{} has no spec.versions[0].schema.openAPIV3Schema",
                path.display()
            ))
        })
}

fn diff_properties(old: &Value, new: &Value, prefix: &str, removed: &mut Vec<String>) {
    let Some(old_props) = old.get("properties").and_then(Value::as_object) else {
        return;
    };
    let empty = serde_json::Map::new();
    let new_props = new
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    for (key, old_val) in old_props {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match new_props.get(key) {
            Some(new_val) => diff_properties(old_val, new_val, &path, removed),
            None => removed.push(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    use super::*;

    fn crd(spec_properties: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        write!(
            f,
            r#"apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: things.example.org
spec:
  group: example.org
  versions:
    - name: v1alpha1
      schema:
        openAPIV3Schema:
          type: object
          properties:
            spec:
              type: object
              properties:
{spec_properties}
"#
        )
        .unwrap();
        f
    }

    #[test]
    fn test_removed_nested_fields_reported_sorted() {
        let old = crd(
            "                vpcId:\n                  type: string\n                subnetId:\n                  type: string\n                count:\n                  type: integer\n",
        );
        let new = crd("                count:\n                  type: integer\n");

        let got = removed_fields(old.path(), new.path()).unwrap();
        assert_eq!(got, ["spec.subnetId", "spec.vpcId"]);
    }

    #[test]
    fn test_identical_schemas_report_nothing() {
        let old = crd("                vpcId:\n                  type: string\n");
        let new = crd("                vpcId:\n                  type: string\n");
        assert!(removed_fields(old.path(), new.path()).unwrap().is_empty());
    }

    #[test]
    fn test_type_change_is_not_removal() {
        // A field that survives with a different inner shape only reports
        // the properties that disappeared beneath it.
        let old = crd(
            "                config:\n                  type: object\n                  properties:\n                    a:\n                      type: string\n                    b:\n                      type: string\n",
        );
        let new = crd(
            "                config:\n                  type: object\n                  properties:\n                    a:\n                      type: string\n",
        );

        let got = removed_fields(old.path(), new.path()).unwrap();
        assert_eq!(got, ["spec.config.b"]);
    }

    #[test]
    fn test_missing_schema_is_an_error() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "apiVersion: v1\nkind: ConfigMap\n").unwrap();
        let other = crd("                a:\n                  type: string\n");

        assert!(removed_fields(f.path(), other.path()).is_err());
    }
}

//! Go source parsing — turns a package directory into the structural model

mod go;

pub use go::{parse_go, SourceUnit};

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::model::Package;

/// Parse every Go source file in a package directory into one [`Package`].
/// Test files are skipped; previously generated files are included so the
/// defined-outside filter can see them.
pub fn parse_package(dir: &Path) -> Result<Package> {
    let mut files: Vec<_> = fs::read_dir(dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension().and_then(|e| e.to_str()) == Some("go")
                && !p
                    .file_name()
                    .and_then(|f| f.to_str())
                    .is_some_and(|f| f.ends_with("_test.go"))
        })
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(Error::CodeParse(format!(
            "no Go source files in {}",
            dir.display()
        )));
    }

    let mut pkg = Package::default();
    let mut hasher = Sha256::new();

    for file in &files {
        let source = fs::read_to_string(file)?;
        hasher.update(source.as_bytes());

        let unit = parse_go(&source, file)?;
        if pkg.name.is_empty() {
            pkg.name = unit.package.clone();
        } else if pkg.name != unit.package {
            return Err(Error::CodeParse(format!(
                "package name mismatch in {}: {} vs {}",
                file.display(),
                unit.package,
                pkg.name
            )));
        }

        pkg.structs.extend(unit.structs);
        for (receiver, method) in unit.methods {
            pkg.methods.entry(receiver).or_default().push(method);
        }
    }

    pkg.source_hash = format!("sha256:{}", hex::encode(&hasher.finalize()[..8]));
    Ok(pkg)
}

/// Expand import aliases in a rendered type string, e.g. `metav1.ObjectMeta`
/// to `k8s.io/apimachinery/pkg/apis/meta/v1.ObjectMeta`, so classification
/// can match on full-path suffixes.
pub(crate) fn expand_type_string(
    type_expr: &crate::model::TypeExpr,
    imports: &BTreeMap<String, String>,
) -> String {
    use crate::model::TypeExpr::*;
    match type_expr {
        Named(n) => match &n.package {
            Some(alias) => match imports.get(alias) {
                Some(path) => format!("{}.{}", path, n.name),
                None => format!("{}.{}", alias, n.name),
            },
            None => n.name.clone(),
        },
        Pointer(t) => format!("*{}", expand_type_string(t, imports)),
        Slice(t) => format!("[]{}", expand_type_string(t, imports)),
        Map(k, v) => format!(
            "map[{}]{}",
            expand_type_string(k, imports),
            expand_type_string(v, imports)
        ),
        Other(s) => s.clone(),
    }
}

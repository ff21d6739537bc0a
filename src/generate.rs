//! Generated file assembly
//!
//! Methods are rendered per struct in stable order, prefixed with the
//! generated-file header and an import block accumulated while rendering.
//! Files that would contain no methods are not written.

use std::fs;
use std::path::Path;

use genco::prelude::*;

use crate::error::Result;
pub use crate::methods::MethodSet;
use crate::model::{Package, StructDef};

/// Header added to every generated file so tooling skips it.
pub const HEADER_GENERATED: &str = "Code generated by refgen. DO NOT EDIT.";

/// Accumulates the import paths the rendered method bodies refer to and
/// hands out a stable alias per path. Aliases are the last path segment,
/// disambiguated with a numeric suffix on collision.
#[derive(Debug, Default)]
pub struct Imports {
    by_path: std::collections::BTreeMap<String, String>,
    preferred: std::collections::BTreeMap<String, String>,
}

impl Imports {
    pub fn new() -> Self {
        Imports::default()
    }

    /// Record a preferred alias for an import path. The import itself is
    /// only emitted once some rendered code refers to the path.
    pub fn preset(&mut self, path: &str, alias: &str) {
        self.preferred.insert(path.to_string(), alias.to_string());
    }

    /// The alias to refer to `path` by, registering the import.
    pub fn add(&mut self, path: &str) -> String {
        if let Some(alias) = self.by_path.get(path) {
            return alias.clone();
        }

        let base = match self.preferred.get(path) {
            Some(alias) => alias.clone(),
            None => {
                let derived: String = path
                    .rsplit('/')
                    .next()
                    .unwrap_or(path)
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
                    .collect();
                derived
            }
        };
        let base = if base.is_empty() { "pkg".to_string() } else { base };

        let mut alias = base.clone();
        let mut n = 2;
        while self.by_path.values().any(|a| *a == alias) {
            alias = format!("{}{}", base, n);
            n += 1;
        }
        self.by_path.insert(path.to_string(), alias.clone());
        alias
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// The import block, paths in stable order. Paths without a slash are
    /// standard library imports and are written without an alias.
    fn render(&self) -> go::Tokens {
        let mut tokens = go::Tokens::new();
        tokens.append("import (");
        tokens.push();
        for (path, alias) in &self.by_path {
            if path.contains('/') {
                tokens.append(format!("\t{} \"{}\"", alias, path));
            } else {
                tokens.append(format!("\t\"{}\"", path));
            }
            tokens.push();
        }
        tokens.append(")");
        tokens
    }
}

/// Render a complete generated file: headers, package clause, imports, and
/// the method bodies.
pub fn render_file(
    package_name: &str,
    headers: &[String],
    imports: &Imports,
    body: go::Tokens,
) -> Result<String> {
    let tokens: go::Tokens = quote! {
        $(for h in headers => $(format!("// {}", h))$['\n'])
        $(format!("// {}", HEADER_GENERATED))
        $['\n']
        package $package_name
        $['\n']
        $(if !imports.is_empty() {
            $(imports.render())
            $['\n']
        })
        $body
    };
    tokens
        .to_file_string()
        .map_err(|e| crate::error::Error::Render(e.to_string()))
}

/// Write the method set for every struct in the package to `filename` inside
/// `dir`. Methods already defined by the user outside that file are skipped,
/// and the file is not written at all if no method survives the filters.
/// Returns true if the file was written.
pub fn write_methods(
    pkg: &Package,
    set: &MethodSet,
    dir: &Path,
    filename: &str,
    headers: &[String],
    aliases: &[(&str, &str)],
    matches: &dyn Fn(&Package, &StructDef) -> bool,
) -> Result<bool> {
    let mut imports = Imports::new();
    for (path, alias) in aliases {
        imports.preset(path, alias);
    }

    let mut body = go::Tokens::new();
    let mut wrote_any = false;

    for def in pkg.structs_sorted() {
        if !matches(pkg, def) {
            continue;
        }
        for tokens in set.write(pkg, def, filename, &mut imports)? {
            if wrote_any {
                body.line();
            }
            body.append(tokens);
            body.push();
            wrote_any = true;
        }
    }

    if !wrote_any {
        return Ok(false);
    }

    let rendered = render_file(&pkg.name, headers, &imports, body)?;
    fs::write(dir.join(filename), rendered)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_alias_is_last_path_segment() {
        let mut imports = Imports::new();
        assert_eq!(imports.add("context"), "context");
        assert_eq!(imports.add("example.org/apis/ec2/v1beta1"), "v1beta1");
        assert_eq!(imports.add("github.com/pkg/errors"), "errors");
        // Registering the same path again returns the same alias.
        assert_eq!(imports.add("example.org/apis/ec2/v1beta1"), "v1beta1");
    }

    #[test]
    fn test_preset_alias_used_only_when_referenced() {
        let mut imports = Imports::new();
        imports.preset("example.org/runtime/v1", "xpv1");
        assert!(imports.is_empty());
        assert_eq!(imports.add("example.org/runtime/v1"), "xpv1");
        assert!(!imports.is_empty());
    }

    #[test]
    fn test_alias_collisions_get_numeric_suffix() {
        let mut imports = Imports::new();
        assert_eq!(imports.add("example.org/a/v1beta1"), "v1beta1");
        assert_eq!(imports.add("example.org/b/v1beta1"), "v1beta12");
        assert_eq!(imports.add("example.org/c/v1beta1"), "v1beta13");
    }

    #[test]
    fn test_render_file_contains_header_and_imports() {
        let mut imports = Imports::new();
        imports.add("context");
        imports.add("example.org/client");

        let body: go::Tokens = quote! {
            func noop() {}
        };
        let out = render_file("v1alpha1", &["Copyright 2026.".to_string()], &imports, body).unwrap();

        assert!(out.contains("// Copyright 2026."));
        assert!(out.contains("// Code generated by refgen. DO NOT EDIT."));
        assert!(out.contains("package v1alpha1"));
        assert!(out.contains("\"context\""));
        assert!(out.contains("client \"example.org/client\""));
    }
}

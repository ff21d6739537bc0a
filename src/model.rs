//! Structural model of a parsed Go package
//!
//! This is the input boundary of the generator: an ordered set of struct
//! declarations with field shapes, tags, comments, and the package's import
//! and method tables. Field order is declaration order, which fixes the
//! visitation and emission order everywhere downstream.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A possibly package-qualified type name as written in source, e.g.
/// `Subnet` or `v1beta1.Subnet`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    /// Import alias qualifier, if any.
    pub package: Option<String>,
    pub name: String,
}

impl TypeName {
    pub fn local(name: impl Into<String>) -> Self {
        TypeName {
            package: None,
            name: name.into(),
        }
    }

    /// True if the name has no package qualifier, i.e. it may resolve to a
    /// struct declared in the same package.
    pub fn is_local(&self) -> bool {
        self.package.is_none()
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.package {
            Some(p) => write!(f, "{}.{}", p, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// The declared type of a field, reduced to the shapes the generator
/// understands. Anything else is carried verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Named(TypeName),
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    Map(Box<TypeExpr>, Box<TypeExpr>),
    Other(String),
}

impl TypeExpr {
    /// The named type at the top level, if this is a plain named type.
    pub fn as_named(&self) -> Option<&TypeName> {
        match self {
            TypeExpr::Named(n) => Some(n),
            _ => None,
        }
    }

    /// The innermost pointer target, looking through one slice level.
    /// `*float64` and `[]*float64` both yield `float64`.
    pub fn pointer_target(&self) -> Option<&TypeExpr> {
        match self {
            TypeExpr::Pointer(t) => Some(t),
            TypeExpr::Slice(inner) => match inner.as_ref() {
                TypeExpr::Pointer(t) => Some(t),
                _ => None,
            },
            _ => None,
        }
    }
}

/// One struct field in declaration order.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub type_expr: TypeExpr,
    /// Declared type with import aliases expanded to full import paths,
    /// e.g. `k8s.io/apimachinery/pkg/apis/meta/v1.ObjectMeta`. Used for
    /// suffix-based classification.
    pub type_string: String,
    /// Raw struct tag with backquotes stripped.
    pub tag: String,
    /// Comment group text attached to the field (comment markers stripped).
    pub comment: String,
    pub embedded: bool,
}

/// A struct type declaration.
#[derive(Debug, Clone)]
pub struct StructDef {
    pub name: String,
    /// Comment group text attached to the declaration.
    pub comment: String,
    pub fields: Vec<Field>,
    /// Source file the struct was declared in.
    pub file: PathBuf,
}

/// A method already defined in source for some type.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub file: PathBuf,
}

/// A parsed Go package: every struct declaration, the methods users have
/// already written, and a provenance hash of the sources.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub name: String,
    /// Struct declarations in source order.
    pub structs: Vec<StructDef>,
    /// Methods defined in the package, keyed by receiver base type name.
    pub methods: BTreeMap<String, Vec<MethodDecl>>,
    /// sha256 over the package sources.
    pub source_hash: String,
}

impl Package {
    /// Look up a struct declared in this package by name.
    pub fn get_struct(&self, name: &str) -> Option<&StructDef> {
        self.structs.iter().find(|s| s.name == name)
    }

    /// Structs in stable name order, for deterministic per-type emission.
    pub fn structs_sorted(&self) -> Vec<&StructDef> {
        let mut out: Vec<&StructDef> = self.structs.iter().collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// True if the named type has the named method defined in a file other
    /// than `filename`. Used to skip generating methods the user wrote.
    pub fn has_method_outside(&self, type_name: &str, method: &str, filename: &str) -> bool {
        self.methods
            .get(type_name)
            .map(|ms| {
                ms.iter().any(|m| {
                    m.name == method
                        && m.file.file_name().and_then(|f| f.to_str()) != Some(filename)
                })
            })
            .unwrap_or(false)
    }
}

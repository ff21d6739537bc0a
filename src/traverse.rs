//! Type tree traversal
//!
//! Walks a root struct and every package-local struct reachable from its
//! fields, running processor chains at each declaration. The path handed to
//! field processors records, per step, the declared shape of the traversed
//! field, so downstream generators can emit the right dereferences and loops
//! without re-deriving them from strings.

use crate::error::{Error, Result};
use crate::model::{Field, Package, StructDef, TypeExpr, TypeName};

/// How a field on the path is shaped at its declaration site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Plain,
    Pointer,
    Slice,
    SliceOfPointer,
    MapKey,
    MapValue,
}

/// One step of a field path: the Go field name and its declared shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub name: String,
    pub shape: Shape,
}

impl PathSegment {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        PathSegment {
            name: name.into(),
            shape,
        }
    }
}

/// Render a path as dotted Go field names, without shape decoration.
pub fn dotted(path: &[PathSegment]) -> String {
    path.iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(".")
}

/// Processor invoked once per struct declaration encountered.
pub trait NamedProcessor {
    fn process(&mut self, def: &StructDef, comment: &str) -> Result<()>;
}

/// Processor invoked once per field, with the path from the root struct to
/// that field inclusive.
pub trait FieldProcessor {
    fn process(
        &mut self,
        owner: &StructDef,
        field: &Field,
        path: &[PathSegment],
        comment: &str,
    ) -> Result<()>;
}

/// Walks struct fields depth-first, running the named chain at each struct
/// and the field chain at each field. Descends only into structs declared in
/// the package being traversed; qualified types terminate their branch.
pub struct Traverser<'a> {
    named: Vec<Box<dyn NamedProcessor + 'a>>,
    field: Vec<Box<dyn FieldProcessor + 'a>>,
}

impl<'a> Traverser<'a> {
    pub fn new() -> Self {
        Traverser {
            named: Vec::new(),
            field: Vec::new(),
        }
    }

    pub fn with_named(mut self, p: impl NamedProcessor + 'a) -> Self {
        self.named.push(Box::new(p));
        self
    }

    pub fn with_field(mut self, p: impl FieldProcessor + 'a) -> Self {
        self.field.push(Box::new(p));
        self
    }

    /// Traverse the type tree rooted at `root`. Fails fast on a recursive
    /// type, naming the cycle.
    pub fn traverse(&mut self, pkg: &Package, root: &StructDef) -> Result<()> {
        let mut visiting = Vec::new();
        self.traverse_struct(pkg, root, &mut Vec::new(), &mut visiting)
    }

    fn traverse_struct(
        &mut self,
        pkg: &Package,
        def: &StructDef,
        path: &mut Vec<PathSegment>,
        visiting: &mut Vec<String>,
    ) -> Result<()> {
        if visiting.iter().any(|n| n == &def.name) {
            visiting.push(def.name.clone());
            return Err(Error::Cycle(visiting.join(" -> ")));
        }
        visiting.push(def.name.clone());

        for (i, p) in self.named.iter_mut().enumerate() {
            p.process(def, &def.comment).map_err(|e| Error::Processor {
                role: "named",
                index: i,
                source: Box::new(e),
            })?;
        }

        for field in &def.fields {
            self.traverse_field(pkg, def, field, path, visiting)
                .map_err(|e| e.traversing(format!("{}.{}", def.name, field.name)))?;
        }

        visiting.pop();
        Ok(())
    }

    fn traverse_field(
        &mut self,
        pkg: &Package,
        owner: &StructDef,
        field: &Field,
        path: &mut Vec<PathSegment>,
        visiting: &mut Vec<String>,
    ) -> Result<()> {
        path.push(PathSegment::new(&field.name, field_shape(&field.type_expr)));

        for (i, p) in self.field.iter_mut().enumerate() {
            p.process(owner, field, path, &field.comment)
                .map_err(|e| Error::Processor {
                    role: "field",
                    index: i,
                    source: Box::new(e),
                })?;
        }

        let result = self.descend(pkg, &field.type_expr, path, visiting);
        path.pop();
        result
    }

    fn descend(
        &mut self,
        pkg: &Package,
        type_expr: &TypeExpr,
        path: &mut Vec<PathSegment>,
        visiting: &mut Vec<String>,
    ) -> Result<()> {
        match type_expr {
            TypeExpr::Named(n) => self.descend_named(pkg, n, path, visiting),
            TypeExpr::Pointer(inner) => match inner.as_named() {
                Some(n) => self.descend_named(pkg, n, path, visiting),
                None => Ok(()),
            },
            TypeExpr::Slice(inner) => {
                let named = match inner.as_ref() {
                    TypeExpr::Named(n) => Some(n),
                    TypeExpr::Pointer(t) => t.as_named(),
                    _ => None,
                };
                match named {
                    Some(n) => self.descend_named(pkg, n, path, visiting),
                    None => Ok(()),
                }
            }
            TypeExpr::Map(key, value) => {
                if let Some(n) = map_entry_named(key) {
                    let mut segment = path.pop().ok_or_else(|| Error::from("empty path"))?;
                    segment.shape = Shape::MapKey;
                    path.push(segment);
                    self.descend_named(pkg, n, path, visiting)?;
                }
                if let Some(n) = map_entry_named(value) {
                    let mut segment = path.pop().ok_or_else(|| Error::from("empty path"))?;
                    segment.shape = Shape::MapValue;
                    path.push(segment);
                    self.descend_named(pkg, n, path, visiting)?;
                }
                Ok(())
            }
            TypeExpr::Other(_) => Ok(()),
        }
    }

    fn descend_named(
        &mut self,
        pkg: &Package,
        name: &TypeName,
        path: &mut Vec<PathSegment>,
        visiting: &mut Vec<String>,
    ) -> Result<()> {
        if !name.is_local() {
            return Ok(());
        }
        match pkg.get_struct(&name.name) {
            Some(def) => self.traverse_struct(pkg, def, path, visiting),
            None => Ok(()),
        }
    }
}

impl Default for Traverser<'_> {
    fn default() -> Self {
        Traverser::new()
    }
}

/// The shape a field contributes to the path at its declaration site.
pub fn field_shape(type_expr: &TypeExpr) -> Shape {
    match type_expr {
        TypeExpr::Pointer(_) => Shape::Pointer,
        TypeExpr::Slice(inner) => match inner.as_ref() {
            TypeExpr::Pointer(_) => Shape::SliceOfPointer,
            _ => Shape::Slice,
        },
        _ => Shape::Plain,
    }
}

fn map_entry_named(type_expr: &TypeExpr) -> Option<&TypeName> {
    match type_expr {
        TypeExpr::Named(n) => Some(n),
        TypeExpr::Pointer(inner) => inner.as_named(),
        _ => None,
    }
}

//! Cross-resource reference discovery
//!
//! A field annotated with the reference type marker holds the value of a
//! field on another managed resource. The processor collects everything the
//! resolver generator needs: the remote type, the extractor call, the path to
//! the value field, the names of the sibling reference and selector fields,
//! and the value field's shape.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::markers::parse_markers;
use crate::model::{Field, StructDef, TypeExpr};
use crate::traverse::{FieldProcessor, PathSegment, Shape};

/// Marker naming the referenced type, e.g. `VPC` or
/// `github.com/crossplane-contrib/provider-aws/apis/ec2/v1beta1.VPC`.
pub const REFERENCE_TYPE_MARKER: &str = "crossplane:generate:reference:type";

/// Marker overriding the extractor function call.
pub const REFERENCE_EXTRACTOR_MARKER: &str = "crossplane:generate:reference:extractor";

/// Marker overriding the generated reference field name.
pub const REFERENCE_REF_FIELD_NAME_MARKER: &str = "crossplane:generate:reference:refFieldName";

/// Marker overriding the generated selector field name.
pub const REFERENCE_SELECTOR_FIELD_NAME_MARKER: &str =
    "crossplane:generate:reference:selectorFieldName";

static FUNCTION_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"((.+)\.)?([^.]+\(.*\))").expect("valid function call pattern"));

/// A type named by a marker, split into its import path and base name.
/// `VPC` stays local; `example.org/apis/v1beta1.VPC` is qualified by its
/// import path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub package: Option<String>,
    pub name: String,
}

impl TypeRef {
    /// Split a marker value at the last dot. Anything before it is the
    /// import path, which may itself contain dots and slashes.
    pub fn parse(value: &str) -> TypeRef {
        match value.rsplit_once('.') {
            Some((pkg, name)) => TypeRef {
                package: Some(pkg.to_string()),
                name: name.to_string(),
            },
            None => TypeRef {
                package: None,
                name: value.to_string(),
            },
        }
    }

    /// The corresponding list type, `<Name>List`.
    pub fn list(&self) -> TypeRef {
        TypeRef {
            package: self.package.clone(),
            name: format!("{}List", self.name),
        }
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.package {
            Some(p) => write!(f, "{}.{}", p, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// The function call that extracts the value to be set from the referenced
/// resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extractor {
    /// The runtime's external-name extractor, used when no marker overrides.
    ExternalName,
    /// A bare identifier, e.g. `SubnetARN`.
    Ident(String),
    /// A call without a package qualifier, e.g. `ExtractParamPath("a",true)`.
    Call(String),
    /// A call qualified with an import path.
    QualifiedCall { package: String, call: String },
}

impl Extractor {
    /// Parse an extractor marker value. Accepted forms are a package
    /// qualified call, a bare call, and a plain identifier.
    pub fn parse(value: &str) -> Result<Extractor> {
        if let Some(caps) = FUNCTION_CALL.captures(value) {
            let call = caps
                .get(3)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            return Ok(match caps.get(2) {
                Some(pkg) => Extractor::QualifiedCall {
                    package: pkg.as_str().to_string(),
                    call,
                },
                None => Extractor::Call(call),
            });
        }
        if !value.is_empty()
            && value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Ok(Extractor::Ident(value.to_string()));
        }
        Err(Error::Reference(format!(
            "{:?} is not a valid extractor function",
            value
        )))
    }
}

impl std::fmt::Display for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Extractor::ExternalName => write!(f, "ExternalName()"),
            Extractor::Ident(name) => write!(f, "{}", name),
            Extractor::Call(call) => write!(f, "{}", call),
            Extractor::QualifiedCall { package, call } => write!(f, "{}.{}", package, call),
        }
    }
}

/// Everything needed to generate one resolution call.
#[derive(Debug, Clone)]
pub struct Reference {
    /// The type whose reference the field holds.
    pub remote_type: TypeRef,
    /// The list type of the remote type, used to look up selector matches.
    pub remote_list_type: TypeRef,
    pub extractor: Extractor,
    /// Path from the receiver to the current-value field, shapes included.
    pub value_path: Vec<PathSegment>,
    /// Sibling field holding the reference(s).
    pub ref_field_name: String,
    /// Sibling field holding the selector.
    pub selector_field_name: String,
    pub is_slice: bool,
    pub is_pointer: bool,
    pub is_float_pointer: bool,
    pub is_int_pointer: bool,
}

/// Field processor that records a [`Reference`] for every field carrying the
/// reference type marker. Clones share the collected list, so a clone can be
/// handed to a traverser and the references read back afterwards.
#[derive(Clone)]
pub struct ReferenceProcessor {
    receiver: String,
    refs: std::rc::Rc<std::cell::RefCell<Vec<Reference>>>,
}

impl ReferenceProcessor {
    pub fn new(receiver: impl Into<String>) -> Self {
        ReferenceProcessor {
            receiver: receiver.into(),
            refs: Default::default(),
        }
    }

    pub fn references(&self) -> Vec<Reference> {
        self.refs.borrow().clone()
    }
}

impl FieldProcessor for ReferenceProcessor {
    fn process(
        &mut self,
        _owner: &StructDef,
        field: &Field,
        path: &[PathSegment],
        comment: &str,
    ) -> Result<()> {
        let markers = parse_markers(comment);
        let Some(ref_type) = markers.first(REFERENCE_TYPE_MARKER) else {
            return Ok(());
        };

        // Only plain, pointer, slice, and slice-of-pointer value fields are
        // supported. Anything reached through a map, map-typed fields, and
        // pointers to non-named types cannot hold a resolvable reference.
        if matches!(field.type_expr, TypeExpr::Map(_, _))
            || path
                .iter()
                .any(|s| matches!(s.shape, Shape::MapKey | Shape::MapValue))
        {
            return Ok(());
        }
        if field
            .type_expr
            .pointer_target()
            .is_some_and(|t| t.as_named().is_none())
        {
            return Ok(());
        }

        let is_pointer = field.type_expr.pointer_target().is_some()
            || matches!(field.type_expr, TypeExpr::Pointer(_));
        let is_slice = matches!(field.type_expr, TypeExpr::Slice(_));
        let target = field.type_expr.pointer_target().and_then(|t| t.as_named());
        let is_float_pointer = target.is_some_and(|n| n.is_local() && n.name == "float64");
        let is_int_pointer = target.is_some_and(|n| n.is_local() && n.name == "int64");

        let extractor = match markers.first(REFERENCE_EXTRACTOR_MARKER) {
            Some(value) => {
                Extractor::parse(value).map_err(|e| e.traversing(field.name.clone()))?
            }
            None => Extractor::ExternalName,
        };

        let ref_field_name = match markers.first(REFERENCE_REF_FIELD_NAME_MARKER) {
            Some(name) => name.to_string(),
            None if is_slice => format!("{}Refs", field.name),
            None => format!("{}Ref", field.name),
        };
        let selector_field_name = match markers.first(REFERENCE_SELECTOR_FIELD_NAME_MARKER) {
            Some(name) => name.to_string(),
            None => format!("{}Selector", field.name),
        };

        let remote_type = TypeRef::parse(ref_type);
        let mut value_path = vec![PathSegment::new(&self.receiver, Shape::Plain)];
        value_path.extend_from_slice(path);

        self.refs.borrow_mut().push(Reference {
            remote_list_type: remote_type.list(),
            remote_type,
            extractor,
            value_path,
            ref_field_name,
            selector_field_name,
            is_slice,
            is_pointer,
            is_float_pointer,
            is_int_pointer,
        });
        Ok(())
    }
}

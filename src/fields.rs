//! Common struct field names and composable field matchers
//!
//! Classification is structural: a type is recognized by the fields it has,
//! matched by name and by a suffix of the import-alias-expanded type string.

use std::rc::Rc;

use crate::model::{Field, Package, StructDef, TypeExpr};

// Field names.
pub const NAME_TYPE_META: &str = "TypeMeta";
pub const NAME_OBJECT_META: &str = "ObjectMeta";
pub const NAME_SPEC: &str = "Spec";
pub const NAME_STATUS: &str = "Status";
pub const NAME_ITEMS: &str = "Items";
pub const NAME_RESOURCE_SPEC: &str = "ResourceSpec";
pub const NAME_RESOURCE_STATUS: &str = "ResourceStatus";
pub const NAME_PROVIDER_CONFIG_STATUS: &str = "ProviderConfigStatus";
pub const NAME_PROVIDER_CONFIG_USAGE: &str = "ProviderConfigUsage";
pub const NAME_MANAGED_RESOURCE_SPEC: &str = "ManagedResourceSpec";
pub const NAME_TYPED_PROVIDER_CONFIG_USAGE: &str = "TypedProviderConfigUsage";

// Field type suffixes.
pub const TYPE_SUFFIX_TYPE_META: &str = "k8s.io/apimachinery/pkg/apis/meta/v1.TypeMeta";
pub const TYPE_SUFFIX_OBJECT_META: &str = "k8s.io/apimachinery/pkg/apis/meta/v1.ObjectMeta";
pub const TYPE_SUFFIX_SPEC: &str = NAME_SPEC;
pub const TYPE_SUFFIX_STATUS: &str = NAME_STATUS;
pub const TYPE_SUFFIX_RESOURCE_SPEC: &str =
    "github.com/crossplane/crossplane-runtime/apis/common/v1.ResourceSpec";
pub const TYPE_SUFFIX_RESOURCE_STATUS: &str =
    "github.com/crossplane/crossplane-runtime/apis/common/v1.ResourceStatus";
pub const TYPE_SUFFIX_PROVIDER_CONFIG_STATUS: &str =
    "github.com/crossplane/crossplane-runtime/apis/common/v1.ProviderConfigStatus";
pub const TYPE_SUFFIX_PROVIDER_CONFIG_USAGE: &str =
    "github.com/crossplane/crossplane-runtime/apis/common/v1.ProviderConfigUsage";
// Namespaced (v2-style) resources embed the v2 runtime types instead.
pub const TYPE_SUFFIX_MANAGED_RESOURCE_SPEC: &str =
    "github.com/crossplane/crossplane-runtime/v2/apis/common/v2.ManagedResourceSpec";
pub const TYPE_SUFFIX_TYPED_PROVIDER_CONFIG_USAGE: &str =
    "github.com/crossplane/crossplane-runtime/v2/apis/common/v2.TypedProviderConfigUsage";

/// A predicate over one struct field. The package is available so matchers
/// can look through fields whose types are declared locally.
#[derive(Clone)]
pub struct Matcher(Rc<dyn Fn(&Package, &Field) -> bool>);

impl Matcher {
    pub fn new(f: impl Fn(&Package, &Field) -> bool + 'static) -> Self {
        Matcher(Rc::new(f))
    }

    pub fn matches(&self, pkg: &Package, field: &Field) -> bool {
        (self.0)(pkg, field)
    }

    /// Both this matcher and `other` must match.
    pub fn and(self, other: Matcher) -> Matcher {
        Matcher::new(move |pkg, f| self.matches(pkg, f) && other.matches(pkg, f))
    }
}

/// True if the struct has, for every supplied matcher, at least one field
/// that satisfies it.
pub fn has(pkg: &Package, def: &StructDef, matchers: &[Matcher]) -> bool {
    matchers
        .iter()
        .all(|m| def.fields.iter().any(|f| m.matches(pkg, f)))
}

/// Matches a field with the given name.
pub fn is_named(name: &'static str) -> Matcher {
    Matcher::new(move |_, f| f.name == name)
}

/// Matches a field with the given name whose expanded type string ends with
/// the given suffix.
pub fn is_type_named(type_suffix: &'static str, name: &'static str) -> Matcher {
    is_named(name).and(Matcher::new(move |_, f| f.type_string.ends_with(type_suffix)))
}

/// Matches an embedded field.
pub fn is_embedded() -> Matcher {
    Matcher::new(|_, f| f.embedded)
}

/// Matches a slice-typed field.
pub fn is_slice() -> Matcher {
    Matcher::new(|_, f| matches!(f.type_expr, TypeExpr::Slice(_)))
}

/// Matches a field whose type is a struct declared in the same package that
/// itself satisfies all the supplied matchers.
pub fn has_field_that(matchers: Vec<Matcher>) -> Matcher {
    Matcher::new(move |pkg, f| {
        let named = match &f.type_expr {
            TypeExpr::Named(n) => Some(n),
            TypeExpr::Pointer(inner) => inner.as_named(),
            TypeExpr::Slice(inner) => match inner.as_ref() {
                TypeExpr::Named(n) => Some(n),
                TypeExpr::Pointer(t) => t.as_named(),
                _ => None,
            },
            _ => None,
        };
        let Some(n) = named.filter(|n| n.is_local()) else {
            return false;
        };
        match pkg.get_struct(&n.name) {
            Some(def) => has(pkg, def, &matchers),
            None => false,
        }
    })
}

pub fn is_type_meta() -> Matcher {
    is_type_named(TYPE_SUFFIX_TYPE_META, NAME_TYPE_META)
}

pub fn is_object_meta() -> Matcher {
    is_type_named(TYPE_SUFFIX_OBJECT_META, NAME_OBJECT_META)
}

pub fn is_spec() -> Matcher {
    is_type_named(TYPE_SUFFIX_SPEC, NAME_SPEC)
}

pub fn is_status() -> Matcher {
    is_type_named(TYPE_SUFFIX_STATUS, NAME_STATUS)
}

pub fn is_items() -> Matcher {
    is_named(NAME_ITEMS)
}

pub fn is_resource_spec() -> Matcher {
    is_type_named(TYPE_SUFFIX_RESOURCE_SPEC, NAME_RESOURCE_SPEC)
}

pub fn is_resource_status() -> Matcher {
    is_type_named(TYPE_SUFFIX_RESOURCE_STATUS, NAME_RESOURCE_STATUS)
}

pub fn is_provider_config_status() -> Matcher {
    is_type_named(TYPE_SUFFIX_PROVIDER_CONFIG_STATUS, NAME_PROVIDER_CONFIG_STATUS)
}

pub fn is_provider_config_usage() -> Matcher {
    is_type_named(TYPE_SUFFIX_PROVIDER_CONFIG_USAGE, NAME_PROVIDER_CONFIG_USAGE)
}

pub fn is_managed_resource_spec() -> Matcher {
    is_type_named(TYPE_SUFFIX_MANAGED_RESOURCE_SPEC, NAME_MANAGED_RESOURCE_SPEC)
}

pub fn is_typed_provider_config_usage() -> Matcher {
    is_type_named(
        TYPE_SUFFIX_TYPED_PROVIDER_CONFIG_USAGE,
        NAME_TYPED_PROVIDER_CONFIG_USAGE,
    )
}

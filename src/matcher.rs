//! Object classifiers
//!
//! Decide which structs in a package get which method sets, by structural
//! shape and by comment markers.

use crate::fields::{self, Matcher};
use crate::markers::parse_markers;
use crate::model::{Package, StructDef};

/// A predicate deciding whether a struct should receive a method set.
pub type Object = Box<dyn Fn(&Package, &StructDef) -> bool>;

fn shaped(matchers: Vec<Matcher>) -> Object {
    Box::new(move |pkg, def| fields::has(pkg, def, &matchers))
}

/// A managed resource: embedded type and object metadata, a spec embedding
/// the runtime's resource spec, and a status embedding its resource status.
pub fn managed() -> Object {
    shaped(vec![
        fields::is_type_meta().and(fields::is_embedded()),
        fields::is_object_meta().and(fields::is_embedded()),
        fields::is_spec().and(fields::has_field_that(vec![
            fields::is_resource_spec().and(fields::is_embedded()),
        ])),
        fields::is_status().and(fields::has_field_that(vec![
            fields::is_resource_status().and(fields::is_embedded()),
        ])),
    ])
}

/// A namespaced (v2-style) managed resource: like [`managed`], but the spec
/// embeds the v2 runtime's managed resource spec.
pub fn managed_v2() -> Object {
    shaped(vec![
        fields::is_type_meta().and(fields::is_embedded()),
        fields::is_object_meta().and(fields::is_embedded()),
        fields::is_spec().and(fields::has_field_that(vec![
            fields::is_managed_resource_spec().and(fields::is_embedded()),
        ])),
        fields::is_status().and(fields::has_field_that(vec![
            fields::is_resource_status().and(fields::is_embedded()),
        ])),
    ])
}

/// A list of managed resources: embedded type metadata and a slice of items
/// that are themselves managed resources.
pub fn managed_list() -> Object {
    shaped(vec![
        fields::is_type_meta().and(fields::is_embedded()),
        fields::is_items()
            .and(fields::is_slice())
            .and(fields::has_field_that(vec![
                fields::is_type_meta().and(fields::is_embedded()),
                fields::is_object_meta().and(fields::is_embedded()),
                fields::is_spec().and(fields::has_field_that(vec![
                    fields::is_resource_spec().and(fields::is_embedded()),
                ])),
                fields::is_status().and(fields::has_field_that(vec![
                    fields::is_resource_status().and(fields::is_embedded()),
                ])),
            ])),
    ])
}

/// A list of namespaced managed resources.
pub fn managed_list_v2() -> Object {
    shaped(vec![
        fields::is_type_meta().and(fields::is_embedded()),
        fields::is_items()
            .and(fields::is_slice())
            .and(fields::has_field_that(vec![
                fields::is_type_meta().and(fields::is_embedded()),
                fields::is_object_meta().and(fields::is_embedded()),
                fields::is_spec().and(fields::has_field_that(vec![
                    fields::is_managed_resource_spec().and(fields::is_embedded()),
                ])),
                fields::is_status().and(fields::has_field_that(vec![
                    fields::is_resource_status().and(fields::is_embedded()),
                ])),
            ])),
    ])
}

/// A provider config: metadata, any spec, and a status embedding the
/// runtime's provider config status.
pub fn provider_config() -> Object {
    shaped(vec![
        fields::is_type_meta().and(fields::is_embedded()),
        fields::is_object_meta().and(fields::is_embedded()),
        fields::is_spec(),
        fields::is_status().and(fields::has_field_that(vec![
            fields::is_provider_config_status().and(fields::is_embedded()),
        ])),
    ])
}

/// A provider config usage: metadata plus the embedded runtime usage type.
pub fn provider_config_usage() -> Object {
    shaped(vec![
        fields::is_type_meta().and(fields::is_embedded()),
        fields::is_object_meta().and(fields::is_embedded()),
        fields::is_provider_config_usage().and(fields::is_embedded()),
    ])
}

/// A namespaced provider config usage: metadata plus the embedded v2
/// runtime usage type.
pub fn typed_provider_config_usage() -> Object {
    shaped(vec![
        fields::is_type_meta().and(fields::is_embedded()),
        fields::is_object_meta().and(fields::is_embedded()),
        fields::is_typed_provider_config_usage().and(fields::is_embedded()),
    ])
}

/// A list of provider config usages.
pub fn provider_config_usage_list() -> Object {
    shaped(vec![
        fields::is_type_meta().and(fields::is_embedded()),
        fields::is_items()
            .and(fields::is_slice())
            .and(fields::has_field_that(vec![
                fields::is_type_meta().and(fields::is_embedded()),
                fields::is_object_meta().and(fields::is_embedded()),
                fields::is_provider_config_usage().and(fields::is_embedded()),
            ])),
    ])
}

/// A list of namespaced provider config usages.
pub fn typed_provider_config_usage_list() -> Object {
    shaped(vec![
        fields::is_type_meta().and(fields::is_embedded()),
        fields::is_items()
            .and(fields::is_slice())
            .and(fields::has_field_that(vec![
                fields::is_type_meta().and(fields::is_embedded()),
                fields::is_object_meta().and(fields::is_embedded()),
                fields::is_typed_provider_config_usage().and(fields::is_embedded()),
            ])),
    ])
}

/// True if the struct's comment carries marker `k` with value `v`.
pub fn has_marker(k: &'static str, v: &'static str) -> Object {
    Box::new(move |_, def| {
        parse_markers(&def.comment)
            .values(k)
            .iter()
            .any(|val| val == v)
    })
}

/// True if the struct's comment does not carry marker `k` with value `v`.
pub fn does_not_have_marker(k: &'static str, v: &'static str) -> Object {
    let has = has_marker(k, v);
    Box::new(move |pkg, def| !has(pkg, def))
}

/// True if every supplied matcher is true.
pub fn all_of(matchers: Vec<Object>) -> Object {
    Box::new(move |pkg, def| matchers.iter().all(|m| m(pkg, def)))
}

/// True if any supplied matcher is true.
pub fn any_of(matchers: Vec<Object>) -> Object {
    Box::new(move |pkg, def| matchers.iter().any(|m| m(pkg, def)))
}

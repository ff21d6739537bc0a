//! End-to-end generation tests: parse a Go package from disk, classify its
//! types, and write the generated method files.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use refgen::generate::{write_methods, MethodSet};
use refgen::{matcher, methods, parse, resolver};

const RUNTIME: &str = "github.com/crossplane/crossplane-runtime/apis/common/v1";
const RESOURCE: &str = "github.com/crossplane/crossplane-runtime/pkg/resource";
const REFERENCE: &str = "github.com/crossplane/crossplane-runtime/pkg/reference";
const CLIENT: &str = "sigs.k8s.io/controller-runtime/pkg/client";

const ALIASES: &[(&str, &str)] = &[
    (RUNTIME, "xpv1"),
    (RESOURCE, "resource"),
    (REFERENCE, "reference"),
    (CLIENT, "client"),
];

const TYPES_GO: &str = r#"package v1alpha1

import (
	xpv1 "github.com/crossplane/crossplane-runtime/apis/common/v1"
	metav1 "k8s.io/apimachinery/pkg/apis/meta/v1"
)

// BucketParameters define the desired state of a Bucket.
type BucketParameters struct {
	// +crossplane:generate:reference:type=VPC
	VPCID *string `json:"vpcId,omitempty"`

	VPCIDRef *xpv1.Reference `json:"vpcIdRef,omitempty"`

	VPCIDSelector *xpv1.Selector `json:"vpcIdSelector,omitempty"`
}

// A BucketSpec defines the desired state of a Bucket.
type BucketSpec struct {
	xpv1.ResourceSpec `json:",inline"`
	ForProvider       BucketParameters `json:"forProvider"`
}

// A BucketStatus represents the observed state of a Bucket.
type BucketStatus struct {
	xpv1.ResourceStatus `json:",inline"`
}

// A Bucket is a managed resource.
type Bucket struct {
	metav1.TypeMeta   `json:",inline"`
	metav1.ObjectMeta `json:"metadata,omitempty"`

	Spec   BucketSpec   `json:"spec"`
	Status BucketStatus `json:"status,omitempty"`
}

// BucketList contains a list of Buckets.
type BucketList struct {
	metav1.TypeMeta `json:",inline"`
	metav1.ListMeta `json:"metadata,omitempty"`
	Items           []Bucket `json:"items"`
}
"#;

/// Same resource, but the spec embeds the v2 runtime's managed resource
/// spec, marking it namespaced.
const TYPES_V2_GO: &str = r#"package v1alpha1

import (
	xpv1 "github.com/crossplane/crossplane-runtime/apis/common/v1"
	xpv2 "github.com/crossplane/crossplane-runtime/v2/apis/common/v2"
	metav1 "k8s.io/apimachinery/pkg/apis/meta/v1"
)

// BucketParameters define the desired state of a Bucket.
type BucketParameters struct {
	// +crossplane:generate:reference:type=VPC
	VPCID *string `json:"vpcId,omitempty"`

	VPCIDRef *xpv1.Reference `json:"vpcIdRef,omitempty"`

	VPCIDSelector *xpv1.Selector `json:"vpcIdSelector,omitempty"`
}

// A BucketSpec defines the desired state of a Bucket.
type BucketSpec struct {
	xpv2.ManagedResourceSpec `json:",inline"`
	ForProvider              BucketParameters `json:"forProvider"`
}

// A BucketStatus represents the observed state of a Bucket.
type BucketStatus struct {
	xpv1.ResourceStatus `json:",inline"`
}

// A Bucket is a namespaced managed resource.
type Bucket struct {
	metav1.TypeMeta   `json:",inline"`
	metav1.ObjectMeta `json:"metadata,omitempty"`

	Spec   BucketSpec   `json:"spec"`
	Status BucketStatus `json:"status,omitempty"`
}
"#;

fn write_fixture(dir: &Path, name: &str, source: &str) {
    fs::write(dir.join(name), source).unwrap();
}

fn managed_set() -> MethodSet {
    MethodSet::new()
        .with("SetConditions", methods::set_conditions("mg", RUNTIME))
        .with("GetCondition", methods::get_condition("mg", RUNTIME))
        .with(
            "SetDeletionPolicy",
            methods::set_deletion_policy("mg", RUNTIME),
        )
        .with(
            "GetDeletionPolicy",
            methods::get_deletion_policy("mg", RUNTIME),
        )
}

#[test]
fn test_managed_methods_file_is_generated() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path(), "types.go", TYPES_GO);

    let pkg = parse::parse_package(dir.path()).unwrap();
    let wrote = write_methods(
        &pkg,
        &managed_set(),
        dir.path(),
        "zz_generated.managed.go",
        &["Copyright 2026 Example Corp.".to_string()],
        ALIASES,
        &matcher::managed(),
    )
    .unwrap();

    assert!(wrote);
    let out = fs::read_to_string(dir.path().join("zz_generated.managed.go")).unwrap();
    assert!(out.starts_with("// Copyright 2026 Example Corp."));
    assert!(out.contains("// Code generated by refgen. DO NOT EDIT."));
    assert!(out.contains("package v1alpha1"));
    assert!(out.contains(&format!("xpv1 \"{}\"", RUNTIME)));
    assert!(out.contains("// SetConditions of this Bucket."));
    assert!(out.contains("func (mg *Bucket) SetConditions(c ...xpv1.Condition) {"));
    assert!(out.contains("func (mg *Bucket) GetCondition(ct xpv1.ConditionType) xpv1.Condition {"));
    assert!(out.contains("mg.Spec.DeletionPolicy = r"));
    // The list and helper types get nothing from the managed set.
    assert!(!out.contains("BucketList"));
    assert!(!out.contains("BucketParameters"));
}

#[test]
fn test_resolvers_file_is_generated() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path(), "types.go", TYPES_GO);

    let pkg = parse::parse_package(dir.path()).unwrap();
    let set = MethodSet::new().with(
        "ResolveReferences",
        resolver::resolve_references("mg", CLIENT, REFERENCE),
    );
    let wrote = write_methods(
        &pkg,
        &set,
        dir.path(),
        "zz_generated.resolvers.go",
        &[],
        ALIASES,
        &matcher::managed(),
    )
    .unwrap();

    assert!(wrote);
    let out = fs::read_to_string(dir.path().join("zz_generated.resolvers.go")).unwrap();
    assert!(out.contains(
        "func (mg *Bucket) ResolveReferences(ctx context.Context, c client.Reader) error {"
    ));
    assert!(out.contains("r := reference.NewAPIResolver(c, mg)"));
    assert!(out.contains("CurrentValue: reference.FromPtrValue(mg.Spec.ForProvider.VPCID),"));
    assert!(out.contains("Extract: reference.ExternalName(),"));
    assert!(out.contains("Reference: mg.Spec.ForProvider.VPCIDRef,"));
    assert!(out.contains("Selector: mg.Spec.ForProvider.VPCIDSelector,"));
    assert!(out.contains("Managed: &VPC{},"));
    assert!(out.contains("List: &VPCList{},"));
    assert!(out.contains("return errors.Wrap(err, \"mg.Spec.ForProvider.VPCID\")"));
    assert!(out.contains("mg.Spec.ForProvider.VPCID = reference.ToPtrValue(rsp.ResolvedValue)"));
    assert!(out.contains(&format!("errors \"{}\"", "github.com/pkg/errors")));
    assert!(out.contains("\"context\""));
}

#[test]
fn test_namespaced_resource_gets_typed_and_local_accessors() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path(), "types.go", TYPES_V2_GO);

    let pkg = parse::parse_package(dir.path()).unwrap();
    let set = MethodSet::new()
        .with("SetConditions", methods::set_conditions("mg", RUNTIME))
        .with(
            "GetProviderConfigReference",
            methods::get_typed_provider_config_reference("mg", RUNTIME),
        )
        .with(
            "SetWriteConnectionSecretToReference",
            methods::set_local_write_connection_secret_to_reference("mg", RUNTIME),
        );

    // The namespaced shape is not a match for the cluster-scoped family.
    let wrote = write_methods(
        &pkg,
        &set,
        dir.path(),
        "zz_generated.managed.go",
        &[],
        ALIASES,
        &matcher::managed(),
    )
    .unwrap();
    assert!(!wrote);

    let wrote = write_methods(
        &pkg,
        &set,
        dir.path(),
        "zz_generated.managed.go",
        &[],
        ALIASES,
        &matcher::managed_v2(),
    )
    .unwrap();
    assert!(wrote);

    let out = fs::read_to_string(dir.path().join("zz_generated.managed.go")).unwrap();
    assert!(out.contains(
        "func (mg *Bucket) GetProviderConfigReference() *xpv1.ProviderConfigReference {"
    ));
    assert!(out.contains(
        "func (mg *Bucket) SetWriteConnectionSecretToReference(r *xpv1.LocalSecretReference) {"
    ));
    assert!(out.contains("mg.Spec.WriteConnectionSecretToReference = r"));
    assert!(!out.contains("DeletionPolicy"));
}

#[test]
fn test_namespaced_resolvers_use_namespaced_resolver() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path(), "types.go", TYPES_V2_GO);

    let pkg = parse::parse_package(dir.path()).unwrap();
    let set = MethodSet::new().with(
        "ResolveReferences",
        resolver::resolve_namespaced_references("mg", CLIENT, REFERENCE),
    );
    let wrote = write_methods(
        &pkg,
        &set,
        dir.path(),
        "zz_generated.resolvers.go",
        &[],
        ALIASES,
        &matcher::managed_v2(),
    )
    .unwrap();

    assert!(wrote);
    let out = fs::read_to_string(dir.path().join("zz_generated.resolvers.go")).unwrap();
    assert!(out.contains(
        "func (mg *Bucket) ResolveReferences(ctx context.Context, c client.Reader) error {"
    ));
    assert!(out.contains("r := reference.NewAPINamespacedResolver(c, mg)"));
    assert!(out.contains("reference.NamespacedResolutionRequest{"));
    assert!(out.contains("return errors.Wrap(err, \"mg.Spec.ForProvider.VPCID\")"));
    assert!(!out.contains("NewAPIResolver("));
}

#[test]
fn test_no_matching_type_writes_no_file() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path(), "types.go", TYPES_GO);

    let pkg = parse::parse_package(dir.path()).unwrap();
    let wrote = write_methods(
        &pkg,
        &managed_set(),
        dir.path(),
        "zz_generated.pc.go",
        &[],
        ALIASES,
        &matcher::provider_config(),
    )
    .unwrap();

    assert!(!wrote);
    assert!(!dir.path().join("zz_generated.pc.go").exists());
}

#[test]
fn test_disable_marker_excludes_type() {
    let disabled = TYPES_GO.replace(
        "// A Bucket is a managed resource.",
        "// A Bucket is a managed resource.\n// +crossplane:generate:methods=false",
    );
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path(), "types.go", &disabled);

    let pkg = parse::parse_package(dir.path()).unwrap();
    let matches = matcher::all_of(vec![
        matcher::managed(),
        matcher::does_not_have_marker("crossplane:generate:methods", "false"),
    ]);
    let wrote = write_methods(
        &pkg,
        &managed_set(),
        dir.path(),
        "zz_generated.managed.go",
        &[],
        ALIASES,
        &matches,
    )
    .unwrap();

    assert!(!wrote);
}

#[test]
fn test_user_defined_method_is_not_regenerated() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path(), "types.go", TYPES_GO);
    write_fixture(
        dir.path(),
        "conditions.go",
        r#"package v1alpha1

import xpv1 "github.com/crossplane/crossplane-runtime/apis/common/v1"

// SetConditions with custom handling.
func (mg *Bucket) SetConditions(c ...xpv1.Condition) {
	mg.Status.SetConditions(c...)
}
"#,
    );

    let pkg = parse::parse_package(dir.path()).unwrap();
    let wrote = write_methods(
        &pkg,
        &managed_set(),
        dir.path(),
        "zz_generated.managed.go",
        &[],
        ALIASES,
        &matcher::managed(),
    )
    .unwrap();

    assert!(wrote);
    let out = fs::read_to_string(dir.path().join("zz_generated.managed.go")).unwrap();
    assert!(!out.contains("SetConditions"));
    assert!(out.contains("GetCondition"));
}

#[test]
fn test_regeneration_replaces_previous_output() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path(), "types.go", TYPES_GO);

    let run = || {
        let pkg = parse::parse_package(dir.path()).unwrap();
        write_methods(
            &pkg,
            &managed_set(),
            dir.path(),
            "zz_generated.managed.go",
            &[],
            ALIASES,
            &matcher::managed(),
        )
        .unwrap()
    };

    assert!(run());
    let first = fs::read_to_string(dir.path().join("zz_generated.managed.go")).unwrap();
    // The second run parses its own previous output; methods in the target
    // file do not count as user-defined, so the result is stable.
    assert!(run());
    let second = fs::read_to_string(dir.path().join("zz_generated.managed.go")).unwrap();
    assert_eq!(first, second);
}

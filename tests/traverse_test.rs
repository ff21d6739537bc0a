//! Integration tests for reference discovery and resolver nesting across a
//! realistic package: collection order, guard and loop composition for
//! nested paths, and cycle reporting.

use std::fs;

use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::TempDir;

use refgen::generate::Imports;
use refgen::traverse::dotted;
use refgen::{parse, resolver};

fn package_with(types_go: &str) -> (TempDir, refgen::model::Package) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("types.go"), types_go).unwrap();
    let pkg = parse::parse_package(dir.path()).unwrap();
    (dir, pkg)
}

fn render_resolver(pkg: &refgen::model::Package, root: &str) -> String {
    let method = resolver::resolve_references(
        "mg",
        "sigs.k8s.io/controller-runtime/pkg/client",
        "github.com/crossplane/crossplane-runtime/pkg/reference",
    );
    let mut imports = Imports::new();
    let tokens = method(pkg, pkg.get_struct(root).unwrap(), &mut imports)
        .unwrap()
        .unwrap();
    tokens.to_string().unwrap()
}

#[test]
fn test_references_collected_depth_first_in_declaration_order() {
    let (_dir, pkg) = package_with(
        r#"package v1alpha1

type Cluster struct {
	Spec ClusterSpec `json:"spec"`
}

type ClusterSpec struct {
	ForProvider ClusterParameters `json:"forProvider"`
}

type ClusterParameters struct {
	// +crossplane:generate:reference:type=VPC
	VPCID string `json:"vpcId"`

	Network NetworkSettings `json:"network"`

	// +crossplane:generate:reference:type=Role
	RoleARN string `json:"roleArn"`
}

type NetworkSettings struct {
	// +crossplane:generate:reference:type=Subnet
	SubnetID string `json:"subnetId"`
}
"#,
    );

    let refs = resolver::collect(&pkg, pkg.get_struct("Cluster").unwrap(), "mg").unwrap();
    let paths: Vec<String> = refs.iter().map(|r| dotted(&r.value_path)).collect();

    // Fields are visited in declaration order and nested structs are
    // descended into at the point of the field that names them.
    assert_eq!(
        paths,
        [
            "mg.Spec.ForProvider.VPCID",
            "mg.Spec.ForProvider.Network.SubnetID",
            "mg.Spec.ForProvider.RoleARN",
        ]
    );
}

#[test]
fn test_pointer_guard_wraps_indexed_loop() {
    let (_dir, pkg) = package_with(
        r#"package v1alpha1

type Cluster struct {
	Spec ClusterSpec `json:"spec"`
}

type ClusterSpec struct {
	ForProvider *ClusterParameters `json:"forProvider,omitempty"`
}

type ClusterParameters struct {
	Rules []Rule `json:"rules,omitempty"`
}

type Rule struct {
	// +crossplane:generate:reference:type=SecurityGroup
	GroupID string `json:"groupId"`
}
"#,
    );
    let out = render_resolver(&pkg, "Cluster");

    let guard = out.find("if mg.Spec.ForProvider != nil {").unwrap();
    let looped = out
        .find("for i3 := 0; i3 < len(mg.Spec.ForProvider.Rules); i3++ {")
        .unwrap();
    assert!(guard < looped);
    assert!(out.contains("CurrentValue: mg.Spec.ForProvider.Rules[i3].GroupID,"));
    assert!(out.contains("Reference: mg.Spec.ForProvider.Rules[i3].GroupIDRef,"));
    assert!(out.contains("return errors.Wrap(err, \"mg.Spec.ForProvider.Rules[i3].GroupID\")"));
}

#[test]
fn test_sibling_slices_get_distinct_loop_indices() {
    let (_dir, pkg) = package_with(
        r#"package v1alpha1

type Cluster struct {
	Spec ClusterSpec `json:"spec"`
}

type ClusterSpec struct {
	Ingress []Rule `json:"ingress,omitempty"`
	Egress  []Rule `json:"egress,omitempty"`
}

type Rule struct {
	// +crossplane:generate:reference:type=SecurityGroup
	GroupID string `json:"groupId"`
}
"#,
    );
    let out = render_resolver(&pkg, "Cluster");

    // Both slices sit at depth 2, so both loops use i2; the rewritten
    // prefixes keep the calls apart.
    assert!(out.contains("for i2 := 0; i2 < len(mg.Spec.Ingress); i2++ {"));
    assert!(out.contains("for i2 := 0; i2 < len(mg.Spec.Egress); i2++ {"));
    assert!(out.contains("CurrentValue: mg.Spec.Ingress[i2].GroupID,"));
    assert!(out.contains("CurrentValue: mg.Spec.Egress[i2].GroupID,"));
}

#[rstest]
#[case("VPCID *string", "CurrentValue: reference.FromPtrValue(mg.Spec.VPCID),")]
#[case("VPCID string", "CurrentValue: mg.Spec.VPCID,")]
#[case(
    "VPCID *int64",
    "CurrentValue: reference.FromIntPtrValue(mg.Spec.VPCID),"
)]
#[case(
    "VPCID *float64",
    "CurrentValue: reference.FromFloatPtrValue(mg.Spec.VPCID),"
)]
fn test_leaf_shape_selects_adapter(#[case] decl: &str, #[case] want: &str) {
    let source = format!(
        r#"package v1alpha1

type Cluster struct {{
	Spec ClusterSpec `json:"spec"`
}}

type ClusterSpec struct {{
	// +crossplane:generate:reference:type=VPC
	{decl} `json:"vpcId,omitempty"`
}}
"#
    );
    let (_dir, pkg) = package_with(&source);
    let out = render_resolver(&pkg, "Cluster");
    assert!(out.contains(want), "{}", out);
}

#[test]
fn test_recursive_spec_type_reports_cycle() {
    let (_dir, pkg) = package_with(
        r#"package v1alpha1

type Filter struct {
	Name string  `json:"name"`
	And  *Filter `json:"and,omitempty"`
}
"#,
    );

    let err = resolver::collect(&pkg, pkg.get_struct("Filter").unwrap(), "mg").unwrap_err();
    let mut e: &dyn std::error::Error = &err;
    while let Some(next) = e.source() {
        e = next;
    }
    let msg = format!("{}", e);
    assert!(msg.contains("Filter -> Filter"), "{}", msg);
}

#[test]
fn test_reference_inside_map_value_is_ignored() {
    let (_dir, pkg) = package_with(
        r#"package v1alpha1

type Cluster struct {
	Spec ClusterSpec `json:"spec"`
}

type ClusterSpec struct {
	Endpoints map[string]Endpoint `json:"endpoints,omitempty"`
}

type Endpoint struct {
	// +crossplane:generate:reference:type=VPC
	VPCID string `json:"vpcId"`
}
"#,
    );

    let refs = resolver::collect(&pkg, pkg.get_struct("Cluster").unwrap(), "mg").unwrap();
    assert!(refs.is_empty());
}

#[test]
fn test_parse_rejects_mixed_packages() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.go"), "package v1alpha1\n").unwrap();
    fs::write(dir.path().join("b.go"), "package v1beta1\n").unwrap();

    assert!(parse::parse_package(dir.path()).is_err());
}

//! refgen CLI
//!
//! Commands:
//!   generate         - Generate method sets for Go API packages
//!   references       - List discovered reference annotations
//!   breaking-changes - Diff two CRD schemas for removed fields

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;

use refgen::{
    generate, matcher, methods, parse, resolver, schema, traverse, Result, VERSION,
};

// Import paths used in generated code.
const RUNTIME_IMPORT: &str = "github.com/crossplane/crossplane-runtime/apis/common/v1";
const RUNTIME_ALIAS: &str = "xpv1";
const RESOURCE_IMPORT: &str = "github.com/crossplane/crossplane-runtime/pkg/resource";
const RESOURCE_ALIAS: &str = "resource";
const REFERENCE_IMPORT: &str = "github.com/crossplane/crossplane-runtime/pkg/reference";
const REFERENCE_ALIAS: &str = "reference";
const CLIENT_IMPORT: &str = "sigs.k8s.io/controller-runtime/pkg/client";
const CLIENT_ALIAS: &str = "client";

/// Marker that disables generation for a type that otherwise classifies as
/// one of the known shapes.
const DISABLE_MARKER: &str = "crossplane:generate:methods";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "generate" => cmd_generate(&args[2..]),
        "references" => cmd_references(&args[2..]),
        "breaking-changes" => cmd_breaking_changes(&args[2..]),
        "version" | "--version" | "-v" => {
            println!("refgen {}", VERSION);
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            Err("Unknown command".into())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"
refgen - method set and reference resolver generation for Go API types

USAGE:
    refgen <COMMAND> [OPTIONS]

COMMANDS:
    generate <dir>[/...]             Generate method sets for the package in
                                     <dir> (or every package below it)
    references <dir> [--json]        List reference annotations discovered in
                                     the package
    breaking-changes <old> <new>     Report CRD schema fields removed by the
                                     new document [--json]
    version                          Print version

OPTIONS (generate):
    --header-file <file>             Prepend the file's contents as a comment
    --filename-managed <name>        Default: zz_generated.managed.go
    --filename-resolvers <name>      Default: zz_generated.resolvers.go
    --filename-managed-list <name>   Default: zz_generated.managedlist.go
    --filename-pc <name>             Default: zz_generated.pc.go
    --filename-pcu <name>            Default: zz_generated.pcu.go
    --filename-pcu-list <name>       Default: zz_generated.pculist.go

EXAMPLES:
    refgen generate ./apis/...
    refgen references apis/ec2/v1beta1 --json
    refgen breaking-changes old.yaml new.yaml
"#
    );
}

/// Value of `--flag <value>`, if present.
fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn flag_or(args: &[String], flag: &str, default: &str) -> String {
    flag_value(args, flag).unwrap_or_else(|| default.to_string())
}

/// First positional argument, skipping flags and their values.
fn pattern_arg(args: &[String]) -> Option<&String> {
    let mut i = 0;
    while i < args.len() {
        if args[i].starts_with("--") {
            i += if args[i] == "--json" { 1 } else { 2 };
        } else {
            return Some(&args[i]);
        }
    }
    None
}

fn cmd_generate(args: &[String]) -> Result<()> {
    let Some(pattern) = pattern_arg(args) else {
        return Err("Usage: refgen generate <dir>[/...]".into());
    };

    let headers = match flag_value(args, "--header-file") {
        Some(path) => fs::read_to_string(&path)?
            .lines()
            .map(String::from)
            .collect(),
        None => Vec::new(),
    };

    let filename_managed = flag_or(args, "--filename-managed", "zz_generated.managed.go");
    let filename_resolvers = flag_or(args, "--filename-resolvers", "zz_generated.resolvers.go");
    let filename_managed_list =
        flag_or(args, "--filename-managed-list", "zz_generated.managedlist.go");
    let filename_pc = flag_or(args, "--filename-pc", "zz_generated.pc.go");
    let filename_pcu = flag_or(args, "--filename-pcu", "zz_generated.pcu.go");
    let filename_pcu_list = flag_or(args, "--filename-pcu-list", "zz_generated.pculist.go");

    for dir in package_dirs(pattern)? {
        let pkg = parse::parse_package(&dir)?;

        let families = [
            (managed_set(), matcher::managed(), &filename_managed),
            (managed_v2_set(), matcher::managed_v2(), &filename_managed),
            (managed_list_set(), matcher::managed_list(), &filename_managed_list),
            (
                managed_list_set(),
                matcher::managed_list_v2(),
                &filename_managed_list,
            ),
            (provider_config_set(), matcher::provider_config(), &filename_pc),
            (
                provider_config_usage_set(),
                matcher::provider_config_usage(),
                &filename_pcu,
            ),
            (
                provider_config_usage_v2_set(),
                matcher::typed_provider_config_usage(),
                &filename_pcu,
            ),
            (
                provider_config_usage_list_set(),
                matcher::provider_config_usage_list(),
                &filename_pcu_list,
            ),
            (
                provider_config_usage_list_set(),
                matcher::typed_provider_config_usage_list(),
                &filename_pcu_list,
            ),
            (resolvers_set(), matcher::managed(), &filename_resolvers),
            (resolvers_v2_set(), matcher::managed_v2(), &filename_resolvers),
        ];

        for (set, shape, filename) in families {
            let matches = matcher::all_of(vec![
                shape,
                matcher::does_not_have_marker(DISABLE_MARKER, "false"),
            ]);
            let wrote = generate::write_methods(
                &pkg,
                &set,
                &dir,
                filename,
                &headers,
                &[
                    (RUNTIME_IMPORT, RUNTIME_ALIAS),
                    (RESOURCE_IMPORT, RESOURCE_ALIAS),
                    (REFERENCE_IMPORT, REFERENCE_ALIAS),
                    (CLIENT_IMPORT, CLIENT_ALIAS),
                ],
                &matches,
            )?;
            if wrote {
                println!("Generated: {}", dir.join(filename.as_str()).display());
            }
        }
    }

    Ok(())
}

/// The resource.Managed method set.
fn managed_set() -> methods::MethodSet {
    let receiver = "mg";
    methods::MethodSet::new()
        .with("SetConditions", methods::set_conditions(receiver, RUNTIME_IMPORT))
        .with("GetCondition", methods::get_condition(receiver, RUNTIME_IMPORT))
        .with(
            "GetProviderConfigReference",
            methods::get_provider_config_reference(receiver, RUNTIME_IMPORT),
        )
        .with(
            "SetProviderConfigReference",
            methods::set_provider_config_reference(receiver, RUNTIME_IMPORT),
        )
        .with(
            "GetWriteConnectionSecretToReference",
            methods::get_write_connection_secret_to_reference(receiver, RUNTIME_IMPORT),
        )
        .with(
            "SetWriteConnectionSecretToReference",
            methods::set_write_connection_secret_to_reference(receiver, RUNTIME_IMPORT),
        )
        .with(
            "GetManagementPolicies",
            methods::get_management_policies(receiver, RUNTIME_IMPORT),
        )
        .with(
            "SetManagementPolicies",
            methods::set_management_policies(receiver, RUNTIME_IMPORT),
        )
        .with(
            "GetDeletionPolicy",
            methods::get_deletion_policy(receiver, RUNTIME_IMPORT),
        )
        .with(
            "SetDeletionPolicy",
            methods::set_deletion_policy(receiver, RUNTIME_IMPORT),
        )
}

/// The resource.Managed method set for namespaced resources: a typed
/// provider config reference, a namespace-local connection secret, and no
/// deletion policy.
fn managed_v2_set() -> methods::MethodSet {
    let receiver = "mg";
    methods::MethodSet::new()
        .with("SetConditions", methods::set_conditions(receiver, RUNTIME_IMPORT))
        .with("GetCondition", methods::get_condition(receiver, RUNTIME_IMPORT))
        .with(
            "GetProviderConfigReference",
            methods::get_typed_provider_config_reference(receiver, RUNTIME_IMPORT),
        )
        .with(
            "SetProviderConfigReference",
            methods::set_typed_provider_config_reference(receiver, RUNTIME_IMPORT),
        )
        .with(
            "GetWriteConnectionSecretToReference",
            methods::get_local_write_connection_secret_to_reference(receiver, RUNTIME_IMPORT),
        )
        .with(
            "SetWriteConnectionSecretToReference",
            methods::set_local_write_connection_secret_to_reference(receiver, RUNTIME_IMPORT),
        )
        .with(
            "GetManagementPolicies",
            methods::get_management_policies(receiver, RUNTIME_IMPORT),
        )
        .with(
            "SetManagementPolicies",
            methods::set_management_policies(receiver, RUNTIME_IMPORT),
        )
}

/// The ResolveReferences method set.
fn resolvers_set() -> methods::MethodSet {
    methods::MethodSet::new().with(
        "ResolveReferences",
        resolver::resolve_references("mg", CLIENT_IMPORT, REFERENCE_IMPORT),
    )
}

/// The ResolveReferences method set for namespaced resources.
fn resolvers_v2_set() -> methods::MethodSet {
    methods::MethodSet::new().with(
        "ResolveReferences",
        resolver::resolve_namespaced_references("mg", CLIENT_IMPORT, REFERENCE_IMPORT),
    )
}

/// The resource.ManagedList method set.
fn managed_list_set() -> methods::MethodSet {
    methods::MethodSet::new().with("GetItems", methods::managed_get_items("l", RESOURCE_IMPORT))
}

/// The resource.ProviderConfig method set.
fn provider_config_set() -> methods::MethodSet {
    let receiver = "p";
    methods::MethodSet::new()
        .with("SetUsers", methods::set_users(receiver))
        .with("GetUsers", methods::get_users(receiver))
        .with("SetConditions", methods::set_conditions(receiver, RUNTIME_IMPORT))
        .with("GetCondition", methods::get_condition(receiver, RUNTIME_IMPORT))
}

/// The method set for namespaced provider config usages, whose provider
/// config reference carries a kind.
fn provider_config_usage_v2_set() -> methods::MethodSet {
    let receiver = "p";
    methods::MethodSet::new()
        .with(
            "SetProviderConfigReference",
            methods::set_root_provider_config_typed_reference(receiver, RUNTIME_IMPORT),
        )
        .with(
            "GetProviderConfigReference",
            methods::get_root_provider_config_typed_reference(receiver, RUNTIME_IMPORT),
        )
        .with(
            "SetResourceReference",
            methods::set_resource_reference(receiver, RUNTIME_IMPORT),
        )
        .with(
            "GetResourceReference",
            methods::get_resource_reference(receiver, RUNTIME_IMPORT),
        )
}

/// The resource.ProviderConfigUsage method set.
fn provider_config_usage_set() -> methods::MethodSet {
    let receiver = "p";
    methods::MethodSet::new()
        .with(
            "SetProviderConfigReference",
            methods::set_root_provider_config_reference(receiver, RUNTIME_IMPORT),
        )
        .with(
            "GetProviderConfigReference",
            methods::get_root_provider_config_reference(receiver, RUNTIME_IMPORT),
        )
        .with(
            "SetResourceReference",
            methods::set_resource_reference(receiver, RUNTIME_IMPORT),
        )
        .with(
            "GetResourceReference",
            methods::get_resource_reference(receiver, RUNTIME_IMPORT),
        )
}

/// The resource.ProviderConfigUsageList method set.
fn provider_config_usage_list_set() -> methods::MethodSet {
    methods::MethodSet::new().with(
        "GetItems",
        methods::provider_config_usage_get_items("p", RESOURCE_IMPORT),
    )
}

/// Package directories matching the pattern. `dir/...` selects every
/// directory below `dir` (inclusive) that contains Go sources.
fn package_dirs(pattern: &str) -> Result<Vec<PathBuf>> {
    let Some(root) = pattern.strip_suffix("/...") else {
        return Ok(vec![PathBuf::from(pattern)]);
    };

    let mut dirs = Vec::new();
    collect_go_dirs(Path::new(root), &mut dirs)?;
    if dirs.is_empty() {
        return Err(format!("no Go packages under {}", root).into());
    }
    Ok(dirs)
}

fn collect_go_dirs(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let mut has_go = false;
    let mut entries: Vec<_> = fs::read_dir(dir)?.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if path.is_dir() {
            if name.starts_with('.') || name == "vendor" {
                continue;
            }
            collect_go_dirs(&path, out)?;
        } else if name.ends_with(".go") && !name.ends_with("_test.go") {
            has_go = true;
        }
    }

    if has_go {
        out.push(dir.to_path_buf());
        out.sort();
    }
    Ok(())
}

#[derive(Serialize)]
struct ReferenceReport {
    type_name: String,
    path: String,
    remote_type: String,
    extractor: String,
    ref_field: String,
    selector_field: String,
    is_slice: bool,
    is_pointer: bool,
}

fn cmd_references(args: &[String]) -> Result<()> {
    let Some(dir) = pattern_arg(args) else {
        return Err("Usage: refgen references <dir> [--json]".into());
    };
    let json_output = args.iter().any(|a| a == "--json");

    let pkg = parse::parse_package(Path::new(dir))?;
    let is_managed = matcher::managed();

    let mut reports = Vec::new();
    for def in pkg.structs_sorted() {
        if !is_managed(&pkg, def) {
            continue;
        }
        for r in resolver::collect(&pkg, def, "mg")? {
            reports.push(ReferenceReport {
                type_name: def.name.clone(),
                path: traverse::dotted(&r.value_path),
                remote_type: r.remote_type.to_string(),
                extractor: r.extractor.to_string(),
                ref_field: r.ref_field_name,
                selector_field: r.selector_field_name,
                is_slice: r.is_slice,
                is_pointer: r.is_pointer,
            });
        }
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for r in &reports {
        println!(
            "{}: {} -> {} (ref {}, selector {})",
            r.type_name, r.path, r.remote_type, r.ref_field, r.selector_field
        );
    }
    Ok(())
}

fn cmd_breaking_changes(args: &[String]) -> Result<()> {
    let paths: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();
    let [old, new] = paths.as_slice() else {
        return Err("Usage: refgen breaking-changes <old.yaml> <new.yaml> [--json]".into());
    };
    let json_output = args.iter().any(|a| a == "--json");

    let removed = schema::removed_fields(Path::new(old), Path::new(new))?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&removed)?);
        return Ok(());
    }

    for path in &removed {
        println!("{}", path);
    }
    if !removed.is_empty() {
        return Err(format!("{} field(s) removed", removed.len()).into());
    }
    Ok(())
}

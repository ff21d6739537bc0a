//! ResolveReferences generation
//!
//! Walks a struct's type tree to collect reference descriptors, then
//! synthesizes one method that resolves each of them in discovery order.
//! Every resolution call is wrapped, outermost-first, in the nil guards and
//! counted loops its value path requires: pointer-shaped segments get an
//! `if x != nil` guard, slice-shaped segments get a loop whose index
//! variable is numbered by the segment's depth. The leaf segment is never
//! guarded; pointer leaves are handled by the value adapters instead.

use genco::prelude::*;

use crate::error::Result;
use crate::generate::Imports;
use crate::methods::Method;
use crate::model::{Package, StructDef};
use crate::reference::{Extractor, Reference, ReferenceProcessor, TypeRef};
use crate::traverse::{PathSegment, Shape, Traverser};

const ERRORS_IMPORT: &str = "github.com/pkg/errors";

/// The resolver entry point and request/response type names the generated
/// method refers to. Cluster-scoped and namespaced resources use different
/// families of the same shapes.
#[derive(Debug, Clone, Copy)]
struct ResolverNames {
    api_resolver: &'static str,
    request: &'static str,
    response: &'static str,
    multi_request: &'static str,
    multi_response: &'static str,
}

const CLUSTER_SCOPED: ResolverNames = ResolverNames {
    api_resolver: "NewAPIResolver",
    request: "ResolutionRequest",
    response: "ResolutionResponse",
    multi_request: "MultiResolutionRequest",
    multi_response: "MultiResolutionResponse",
};

const NAMESPACED: ResolverNames = ResolverNames {
    api_resolver: "NewAPINamespacedResolver",
    request: "NamespacedResolutionRequest",
    response: "NamespacedResolutionResponse",
    multi_request: "MultiNamespacedResolutionRequest",
    multi_response: "MultiNamespacedResolutionResponse",
};

/// A method generator that writes ResolveReferences for structs that have at
/// least one reference-annotated field in their type tree, and declines for
/// the rest.
pub fn resolve_references(receiver: &str, client_path: &str, reference_path: &str) -> Method {
    resolve_references_common(receiver, client_path, reference_path, CLUSTER_SCOPED)
}

/// Like [`resolve_references`], but resolves through the namespaced resolver
/// family for namespaced resources.
pub fn resolve_namespaced_references(
    receiver: &str,
    client_path: &str,
    reference_path: &str,
) -> Method {
    resolve_references_common(receiver, client_path, reference_path, NAMESPACED)
}

fn resolve_references_common(
    receiver: &str,
    client_path: &str,
    reference_path: &str,
    names: ResolverNames,
) -> Method {
    let receiver = receiver.to_string();
    let client_path = client_path.to_string();
    let reference_path = reference_path.to_string();

    Box::new(move |pkg, def, imports| {
        let refs = collect(pkg, def, &receiver)?;
        if refs.is_empty() {
            return Ok(None);
        }
        Ok(Some(render_method(
            def,
            &receiver,
            &client_path,
            &reference_path,
            names,
            &refs,
            imports,
        )))
    })
}

/// Collect the references reachable from the struct's field tree.
pub fn collect(pkg: &Package, def: &StructDef, receiver: &str) -> Result<Vec<Reference>> {
    let rp = ReferenceProcessor::new(receiver);
    let mut traverser = Traverser::new().with_field(rp.clone());
    traverser.traverse(pkg, def)?;
    Ok(rp.references())
}

fn render_method(
    def: &StructDef,
    receiver: &str,
    client_path: &str,
    reference_path: &str,
    names: ResolverNames,
    refs: &[Reference],
    imports: &mut Imports,
) -> go::Tokens {
    let context = imports.add("context");
    let client = imports.add(client_path);
    let reference = imports.add(reference_path);
    let errors = imports.add(ERRORS_IMPORT);

    let has_single = refs.iter().any(|r| !r.is_slice);
    let has_multi = refs.iter().any(|r| r.is_slice);

    let mut calls = go::Tokens::new();
    for (i, r) in refs.iter().enumerate() {
        if i > 0 {
            calls.line();
        }
        let call = render_reference(r, &reference, &errors, names, imports);
        calls.append(call);
        calls.push();
    }

    quote! {
        $(format!("// ResolveReferences of this {}.", def.name))
        func ($receiver *$(&def.name)) ResolveReferences(ctx $(&context).Context, c $(&client).Reader) error {
            r := $(&reference).$(names.api_resolver)(c, $receiver)
            $['\n']
            $(if has_single {
                var rsp $(&reference).$(names.response)
            })
            $(if has_multi {
                var mrsp $(&reference).$(names.multi_response)
            })
            var err error
            $['\n']
            $calls
            $['\n']
            return nil
        }
    }
}

/// Wrap one resolution call in the guards and loops its path needs and
/// render it. The path is rewritten as nesting is applied, so the rendered
/// access expressions and the failure context both carry the loop indices.
fn render_reference(
    r: &Reference,
    reference: &str,
    errors: &str,
    resolver_names: ResolverNames,
    imports: &mut Imports,
) -> go::Tokens {
    let mut names: Vec<String> = r.value_path.iter().map(|s| s.name.clone()).collect();
    encapsulate(1, &mut names, &r.value_path, &mut |names| {
        if r.is_slice {
            multi_resolution_call(r, names, reference, errors, resolver_names.multi_request, imports)
        } else {
            single_resolution_call(r, names, reference, errors, resolver_names.request, imports)
        }
    })
}

/// Apply guard/loop nesting for the intermediate segments, outermost-first.
/// The receiver (index 0) and the leaf are never wrapped.
fn encapsulate(
    index: usize,
    names: &mut Vec<String>,
    segments: &[PathSegment],
    call: &mut dyn FnMut(&[String]) -> go::Tokens,
) -> go::Tokens {
    if index + 1 >= segments.len() {
        return call(names);
    }
    let prefix = names[..=index].join(".");
    match segments[index].shape {
        Shape::Pointer => {
            quote! {
                if $(&prefix) != nil {
                    $(encapsulate(index + 1, names, segments, call))
                }
            }
        }
        Shape::Slice | Shape::SliceOfPointer => {
            let i = format!("i{}", index);
            names[index] = format!("{}[{}]", names[index], i);
            quote! {
                for $(&i) := 0; $(&i) < len($(&prefix)); $(&i)++ {
                    $(encapsulate(index + 1, names, segments, call))
                }
            }
        }
        _ => encapsulate(index + 1, names, segments, call),
    }
}

/// `&v1beta1.VPC{}` or `&VPC{}` for a package-local type.
fn composite_literal(t: &TypeRef, imports: &mut Imports) -> String {
    match &t.package {
        Some(path) => format!("&{}.{}{{}}", imports.add(path), t.name),
        None => format!("&{}{{}}", t.name),
    }
}

fn extractor_call(e: &Extractor, reference: &str, imports: &mut Imports) -> String {
    match e {
        Extractor::ExternalName => format!("{}.ExternalName()", reference),
        Extractor::Ident(name) => name.clone(),
        Extractor::Call(call) => call.clone(),
        Extractor::QualifiedCall { package, call } => {
            format!("{}.{}", imports.add(package), call)
        }
    }
}

fn single_resolution_call(
    r: &Reference,
    names: &[String],
    reference: &str,
    errors: &str,
    request: &'static str,
    imports: &mut Imports,
) -> go::Tokens {
    let prefix = names[..names.len() - 1].join(".");
    let value_path = names.join(".");
    let ref_path = format!("{}.{}", prefix, r.ref_field_name);
    let selector_path = format!("{}.{}", prefix, r.selector_field_name);

    let (to_ptr, from_ptr) = pointer_adapters(r, false);
    let current_value = if r.is_pointer {
        format!("{}.{}({})", reference, from_ptr, value_path)
    } else {
        value_path.clone()
    };
    let set_value = if r.is_pointer {
        format!("{} = {}.{}(rsp.ResolvedValue)", value_path, reference, to_ptr)
    } else {
        format!("{} = rsp.ResolvedValue", value_path)
    };

    let managed = composite_literal(&r.remote_type, imports);
    let list = composite_literal(&r.remote_list_type, imports);
    let extract = extractor_call(&r.extractor, reference, imports);

    quote! {
        rsp, err = r.Resolve(ctx, $reference.$request{
            CurrentValue: $(&current_value),
            Extract: $(&extract),
            Reference: $(&ref_path),
            Selector: $(&selector_path),
            To: $reference.To{
                List: $(&list),
                Managed: $(&managed),
            },
        })
        if err != nil {
            return $errors.Wrap(err, $(quoted(&value_path)))
        }
        $(&set_value)
        $(&ref_path) = rsp.ResolvedReference
    }
}

fn multi_resolution_call(
    r: &Reference,
    names: &[String],
    reference: &str,
    errors: &str,
    request: &'static str,
    imports: &mut Imports,
) -> go::Tokens {
    let prefix = names[..names.len() - 1].join(".");
    let value_path = names.join(".");
    let ref_path = format!("{}.{}", prefix, r.ref_field_name);
    let selector_path = format!("{}.{}", prefix, r.selector_field_name);

    let (to_ptr, from_ptr) = pointer_adapters(r, true);
    let current_values = if r.is_pointer {
        format!("{}.{}({})", reference, from_ptr, value_path)
    } else {
        value_path.clone()
    };
    let set_values = if r.is_pointer {
        format!(
            "{} = {}.{}(mrsp.ResolvedValues)",
            value_path, reference, to_ptr
        )
    } else {
        format!("{} = mrsp.ResolvedValues", value_path)
    };

    let managed = composite_literal(&r.remote_type, imports);
    let list = composite_literal(&r.remote_list_type, imports);
    let extract = extractor_call(&r.extractor, reference, imports);

    quote! {
        mrsp, err = r.ResolveMultiple(ctx, $reference.$request{
            CurrentValues: $(&current_values),
            Extract: $(&extract),
            References: $(&ref_path),
            Selector: $(&selector_path),
            To: $reference.To{
                List: $(&list),
                Managed: $(&managed),
            },
        })
        if err != nil {
            return $errors.Wrap(err, $(quoted(&value_path)))
        }
        $(&set_values)
        $(&ref_path) = mrsp.ResolvedReferences
    }
}

/// The adapter pair for the reference's value type: (to pointer, from
/// pointer), pluralized for multi resolution.
fn pointer_adapters(r: &Reference, plural: bool) -> (String, String) {
    let infix = if r.is_float_pointer {
        "FloatPtrValue"
    } else if r.is_int_pointer {
        "IntPtrValue"
    } else {
        "PtrValue"
    };
    let s = if plural { "s" } else { "" };
    (format!("To{}{}", infix, s), format!("From{}{}", infix, s))
}

//! Method generators
//!
//! Each generator produces one method for a struct, or declines. A
//! [`MethodSet`] maps method names to generators and emits them in name
//! order, skipping any method the user already wrote in another file.

use std::collections::BTreeMap;

use genco::prelude::*;

use crate::error::Result;
use crate::fields;
use crate::generate::Imports;
use crate::model::{Package, StructDef};

/// A function that renders one method for a struct, or declines with `None`.
pub type Method = Box<dyn Fn(&Package, &StructDef, &mut Imports) -> Result<Option<go::Tokens>>>;

/// A named collection of method generators.
#[derive(Default)]
pub struct MethodSet {
    methods: BTreeMap<String, Method>,
}

impl MethodSet {
    pub fn new() -> Self {
        MethodSet::default()
    }

    pub fn with(mut self, name: &str, method: Method) -> Self {
        self.methods.insert(name.to_string(), method);
        self
    }

    /// Render the set for one struct, in method name order. A method the
    /// user already defined for the type outside `filename` is skipped.
    pub fn write(
        &self,
        pkg: &Package,
        def: &StructDef,
        filename: &str,
        imports: &mut Imports,
    ) -> Result<Vec<go::Tokens>> {
        let mut out = Vec::new();
        for (name, method) in &self.methods {
            if pkg.has_method_outside(&def.name, name, filename) {
                continue;
            }
            if let Some(tokens) = method(pkg, def, imports)? {
                out.push(tokens);
            }
        }
        Ok(out)
    }
}

/// A setter that assigns the parameter to a field under Spec or Status,
/// e.g. `mg.Spec.DeletionPolicy = r`.
fn field_setter(
    receiver: &str,
    method: &str,
    param_type_path: &str,
    param_type: &str,
    by_pointer: bool,
    holder: &'static str,
    field: &'static str,
) -> Method {
    let receiver = receiver.to_string();
    let method = method.to_string();
    let path = param_type_path.to_string();
    let param_type = param_type.to_string();
    let star = if by_pointer { "*" } else { "" };
    Box::new(move |_, def, imports| {
        let alias = imports.add(&path);
        Ok(Some(quote! {
            $(format!("// {} of this {}.", method, def.name))
            func ($(&receiver) *$(&def.name)) $(&method)(r $star$(&alias).$(&param_type)) {
                $(&receiver).$(holder).$(field) = r
            }
        }))
    })
}

/// A getter that returns a field under Spec or Status.
fn field_getter(
    receiver: &str,
    method: &str,
    return_type_path: &str,
    return_type: &str,
    by_pointer: bool,
    holder: &'static str,
    field: &'static str,
) -> Method {
    let receiver = receiver.to_string();
    let method = method.to_string();
    let path = return_type_path.to_string();
    let return_type = return_type.to_string();
    let star = if by_pointer { "*" } else { "" };
    Box::new(move |_, def, imports| {
        let alias = imports.add(&path);
        Ok(Some(quote! {
            $(format!("// {} of this {}.", method, def.name))
            func ($(&receiver) *$(&def.name)) $(&method)() $star$(&alias).$(&return_type) {
                return $(&receiver).$(holder).$(field)
            }
        }))
    })
}

/// SetConditions delegates to the embedded status.
pub fn set_conditions(receiver: &str, runtime: &str) -> Method {
    let receiver = receiver.to_string();
    let runtime = runtime.to_string();
    Box::new(move |_, def, imports| {
        let alias = imports.add(&runtime);
        Ok(Some(quote! {
            $(format!("// SetConditions of this {}.", def.name))
            func ($(&receiver) *$(&def.name)) SetConditions(c ...$(&alias).Condition) {
                $(&receiver).$(fields::NAME_STATUS).SetConditions(c...)
            }
        }))
    })
}

/// GetCondition delegates to the embedded status.
pub fn get_condition(receiver: &str, runtime: &str) -> Method {
    let receiver = receiver.to_string();
    let runtime = runtime.to_string();
    Box::new(move |_, def, imports| {
        let alias = imports.add(&runtime);
        Ok(Some(quote! {
            $(format!("// GetCondition of this {}.", def.name))
            func ($(&receiver) *$(&def.name)) GetCondition(ct $(&alias).ConditionType) $(&alias).Condition {
                return $(&receiver).$(fields::NAME_STATUS).GetCondition(ct)
            }
        }))
    })
}

pub fn set_provider_config_reference(receiver: &str, runtime: &str) -> Method {
    field_setter(
        receiver,
        "SetProviderConfigReference",
        runtime,
        "Reference",
        true,
        fields::NAME_SPEC,
        "ProviderConfigReference",
    )
}

pub fn get_provider_config_reference(receiver: &str, runtime: &str) -> Method {
    field_getter(
        receiver,
        "GetProviderConfigReference",
        runtime,
        "Reference",
        true,
        fields::NAME_SPEC,
        "ProviderConfigReference",
    )
}

/// SetProviderConfigReference for namespaced resources, whose reference
/// carries a kind.
pub fn set_typed_provider_config_reference(receiver: &str, runtime: &str) -> Method {
    field_setter(
        receiver,
        "SetProviderConfigReference",
        runtime,
        "ProviderConfigReference",
        true,
        fields::NAME_SPEC,
        "ProviderConfigReference",
    )
}

/// GetProviderConfigReference for namespaced resources.
pub fn get_typed_provider_config_reference(receiver: &str, runtime: &str) -> Method {
    field_getter(
        receiver,
        "GetProviderConfigReference",
        runtime,
        "ProviderConfigReference",
        true,
        fields::NAME_SPEC,
        "ProviderConfigReference",
    )
}

pub fn set_management_policies(receiver: &str, runtime: &str) -> Method {
    field_setter(
        receiver,
        "SetManagementPolicies",
        runtime,
        "ManagementPolicies",
        false,
        fields::NAME_SPEC,
        "ManagementPolicies",
    )
}

pub fn get_management_policies(receiver: &str, runtime: &str) -> Method {
    field_getter(
        receiver,
        "GetManagementPolicies",
        runtime,
        "ManagementPolicies",
        false,
        fields::NAME_SPEC,
        "ManagementPolicies",
    )
}

pub fn set_deletion_policy(receiver: &str, runtime: &str) -> Method {
    field_setter(
        receiver,
        "SetDeletionPolicy",
        runtime,
        "DeletionPolicy",
        false,
        fields::NAME_SPEC,
        "DeletionPolicy",
    )
}

pub fn get_deletion_policy(receiver: &str, runtime: &str) -> Method {
    field_getter(
        receiver,
        "GetDeletionPolicy",
        runtime,
        "DeletionPolicy",
        false,
        fields::NAME_SPEC,
        "DeletionPolicy",
    )
}

pub fn set_write_connection_secret_to_reference(receiver: &str, runtime: &str) -> Method {
    field_setter(
        receiver,
        "SetWriteConnectionSecretToReference",
        runtime,
        "SecretReference",
        true,
        fields::NAME_SPEC,
        "WriteConnectionSecretToReference",
    )
}

pub fn get_write_connection_secret_to_reference(receiver: &str, runtime: &str) -> Method {
    field_getter(
        receiver,
        "GetWriteConnectionSecretToReference",
        runtime,
        "SecretReference",
        true,
        fields::NAME_SPEC,
        "WriteConnectionSecretToReference",
    )
}

/// SetWriteConnectionSecretToReference for namespaced resources, whose
/// connection secret lives in the resource's own namespace.
pub fn set_local_write_connection_secret_to_reference(receiver: &str, runtime: &str) -> Method {
    field_setter(
        receiver,
        "SetWriteConnectionSecretToReference",
        runtime,
        "LocalSecretReference",
        true,
        fields::NAME_SPEC,
        "WriteConnectionSecretToReference",
    )
}

/// GetWriteConnectionSecretToReference for namespaced resources.
pub fn get_local_write_connection_secret_to_reference(receiver: &str, runtime: &str) -> Method {
    field_getter(
        receiver,
        "GetWriteConnectionSecretToReference",
        runtime,
        "LocalSecretReference",
        true,
        fields::NAME_SPEC,
        "WriteConnectionSecretToReference",
    )
}

/// SetUsers for provider configs, stored on the status.
pub fn set_users(receiver: &str) -> Method {
    let receiver = receiver.to_string();
    Box::new(move |_, def, _| {
        Ok(Some(quote! {
            $(format!("// SetUsers of this {}.", def.name))
            func ($(&receiver) *$(&def.name)) SetUsers(i int64) {
                $(&receiver).$(fields::NAME_STATUS).Users = i
            }
        }))
    })
}

/// GetUsers for provider configs.
pub fn get_users(receiver: &str) -> Method {
    let receiver = receiver.to_string();
    Box::new(move |_, def, _| {
        Ok(Some(quote! {
            $(format!("// GetUsers of this {}.", def.name))
            func ($(&receiver) *$(&def.name)) GetUsers() int64 {
                return $(&receiver).$(fields::NAME_STATUS).Users
            }
        }))
    })
}

/// SetProviderConfigReference for usages, which keep the reference at the
/// root of the type rather than under a spec.
pub fn set_root_provider_config_reference(receiver: &str, runtime: &str) -> Method {
    let receiver = receiver.to_string();
    let runtime = runtime.to_string();
    Box::new(move |_, def, imports| {
        let alias = imports.add(&runtime);
        Ok(Some(quote! {
            $(format!("// SetProviderConfigReference of this {}.", def.name))
            func ($(&receiver) *$(&def.name)) SetProviderConfigReference(r $(&alias).Reference) {
                $(&receiver).ProviderConfigReference = r
            }
        }))
    })
}

/// GetProviderConfigReference for usages.
pub fn get_root_provider_config_reference(receiver: &str, runtime: &str) -> Method {
    let receiver = receiver.to_string();
    let runtime = runtime.to_string();
    Box::new(move |_, def, imports| {
        let alias = imports.add(&runtime);
        Ok(Some(quote! {
            $(format!("// GetProviderConfigReference of this {}.", def.name))
            func ($(&receiver) *$(&def.name)) GetProviderConfigReference() $(&alias).Reference {
                return $(&receiver).ProviderConfigReference
            }
        }))
    })
}

/// SetProviderConfigReference for namespaced usages, a root field whose
/// reference carries a kind.
pub fn set_root_provider_config_typed_reference(receiver: &str, runtime: &str) -> Method {
    let receiver = receiver.to_string();
    let runtime = runtime.to_string();
    Box::new(move |_, def, imports| {
        let alias = imports.add(&runtime);
        Ok(Some(quote! {
            $(format!("// SetProviderConfigReference of this {}.", def.name))
            func ($(&receiver) *$(&def.name)) SetProviderConfigReference(r $(&alias).ProviderConfigReference) {
                $(&receiver).ProviderConfigReference = r
            }
        }))
    })
}

/// GetProviderConfigReference for namespaced usages.
pub fn get_root_provider_config_typed_reference(receiver: &str, runtime: &str) -> Method {
    let receiver = receiver.to_string();
    let runtime = runtime.to_string();
    Box::new(move |_, def, imports| {
        let alias = imports.add(&runtime);
        Ok(Some(quote! {
            $(format!("// GetProviderConfigReference of this {}.", def.name))
            func ($(&receiver) *$(&def.name)) GetProviderConfigReference() $(&alias).ProviderConfigReference {
                return $(&receiver).ProviderConfigReference
            }
        }))
    })
}

/// SetResourceReference for usages, also a root field.
pub fn set_resource_reference(receiver: &str, runtime: &str) -> Method {
    let receiver = receiver.to_string();
    let runtime = runtime.to_string();
    Box::new(move |_, def, imports| {
        let alias = imports.add(&runtime);
        Ok(Some(quote! {
            $(format!("// SetResourceReference of this {}.", def.name))
            func ($(&receiver) *$(&def.name)) SetResourceReference(r $(&alias).TypedReference) {
                $(&receiver).ResourceReference = r
            }
        }))
    })
}

/// GetResourceReference for usages.
pub fn get_resource_reference(receiver: &str, runtime: &str) -> Method {
    let receiver = receiver.to_string();
    let runtime = runtime.to_string();
    Box::new(move |_, def, imports| {
        let alias = imports.add(&runtime);
        Ok(Some(quote! {
            $(format!("// GetResourceReference of this {}.", def.name))
            func ($(&receiver) *$(&def.name)) GetResourceReference() $(&alias).TypedReference {
                return $(&receiver).ResourceReference
            }
        }))
    })
}

/// GetItems for list types, adapting the items slice to the runtime's
/// managed resource interface.
pub fn managed_get_items(receiver: &str, resource: &str) -> Method {
    let receiver = receiver.to_string();
    let resource = resource.to_string();
    Box::new(move |_, def, imports| {
        let alias = imports.add(&resource);
        Ok(Some(quote! {
            $(format!("// GetItems of this {}.", def.name))
            func ($(&receiver) *$(&def.name)) GetItems() []$(&alias).Managed {
                items := make([]$(&alias).Managed, len($(&receiver).Items))
                for i := range $(&receiver).Items {
                    items[i] = &$(&receiver).Items[i]
                }
                return items
            }
        }))
    })
}

/// GetItems for provider config usage lists.
pub fn provider_config_usage_get_items(receiver: &str, resource: &str) -> Method {
    let receiver = receiver.to_string();
    let resource = resource.to_string();
    Box::new(move |_, def, imports| {
        let alias = imports.add(&resource);
        Ok(Some(quote! {
            $(format!("// GetItems of this {}.", def.name))
            func ($(&receiver) *$(&def.name)) GetItems() []$(&alias).ProviderConfigUsage {
                items := make([]$(&alias).ProviderConfigUsage, len($(&receiver).Items))
                for i := range $(&receiver).Items {
                    items[i] = &$(&receiver).Items[i]
                }
                return items
            }
        }))
    })
}

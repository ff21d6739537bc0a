//! Go parser - parses Go source into struct declarations with comments
//!
//! Comment groups are associated to declarations by line adjacency: a run of
//! consecutive comment lines ending on the line immediately above a
//! declaration is that declaration's comment, with the `//` markers stripped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tree_sitter::{Node, Parser};

use crate::error::{Error, Result};
use crate::model::{Field, MethodDecl, StructDef, TypeExpr, TypeName};

use super::expand_type_string;

/// One parsed source file, before merging into a package.
pub struct SourceUnit {
    pub package: String,
    pub imports: BTreeMap<String, String>,
    pub structs: Vec<StructDef>,
    pub methods: Vec<(String, MethodDecl)>,
}

/// Parse a single Go source file.
pub fn parse_go(source: &str, file: &Path) -> Result<SourceUnit> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| Error::CodeParse(format!("Failed to set language: {}", e)))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| Error::CodeParse(format!("Failed to parse {}", file.display())))?;

    let root = tree.root_node();
    let comments = collect_comment_groups(root, source);

    let mut unit = SourceUnit {
        package: String::new(),
        imports: BTreeMap::new(),
        structs: Vec::new(),
        methods: Vec::new(),
    };

    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        match child.kind() {
            "package_clause" => {
                let mut c = child.walk();
                for n in child.children(&mut c) {
                    if n.kind() == "package_identifier" {
                        unit.package = text(n, source).to_string();
                    }
                }
            }
            "import_declaration" => {
                parse_imports(child, source, &mut unit.imports);
            }
            "type_declaration" => {
                parse_type_declaration(child, source, file, &comments, &mut unit);
            }
            "method_declaration" => {
                if let Some((receiver, name)) = parse_method(child, source) {
                    unit.methods.push((
                        receiver,
                        MethodDecl {
                            name,
                            file: PathBuf::from(file),
                        },
                    ));
                }
            }
            _ => {}
        }
    }

    if unit.package.is_empty() {
        return Err(Error::CodeParse(format!(
            "no package clause in {}",
            file.display()
        )));
    }
    Ok(unit)
}

fn text<'a>(node: Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Comment groups keyed by the row their last line occupies.
fn collect_comment_groups(root: Node, source: &str) -> BTreeMap<usize, String> {
    let mut lines: Vec<(usize, String)> = Vec::new();
    collect_comments(root, source, &mut lines);

    let mut groups: BTreeMap<usize, String> = BTreeMap::new();
    let mut current = String::new();
    let mut last_row: Option<usize> = None;

    for (row, line) in lines {
        match last_row {
            Some(prev) if row == prev + 1 => {
                current.push('\n');
                current.push_str(&line);
            }
            Some(prev) => {
                groups.insert(prev, std::mem::take(&mut current));
                current = line;
            }
            None => current = line,
        }
        last_row = Some(row);
    }
    if let Some(prev) = last_row {
        groups.insert(prev, current);
    }
    groups
}

fn collect_comments(node: Node, source: &str, out: &mut Vec<(usize, String)>) {
    if node.kind() == "comment" {
        out.push((node.end_position().row, comment_text(text(node, source))));
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_comments(child, source, out);
    }
}

/// Strip comment markers the way Go's `CommentGroup.Text` does for the
/// common cases: `// x` becomes `x`, block comments lose their delimiters.
fn comment_text(raw: &str) -> String {
    if let Some(rest) = raw.strip_prefix("//") {
        return rest.strip_prefix(' ').unwrap_or(rest).to_string();
    }
    raw.trim_start_matches("/*")
        .trim_end_matches("*/")
        .trim()
        .to_string()
}

fn parse_imports(node: Node, source: &str, imports: &mut BTreeMap<String, String>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "import_spec" => parse_import_spec(child, source, imports),
            "import_spec_list" => {
                let mut c = child.walk();
                for spec in child.children(&mut c) {
                    if spec.kind() == "import_spec" {
                        parse_import_spec(spec, source, imports);
                    }
                }
            }
            _ => {}
        }
    }
}

fn parse_import_spec(node: Node, source: &str, imports: &mut BTreeMap<String, String>) {
    let mut alias = None;
    let mut path = None;

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "package_identifier" => alias = Some(text(child, source).to_string()),
            "interpreted_string_literal" | "raw_string_literal" => {
                path = Some(text(child, source).trim_matches('"').to_string());
            }
            _ => {}
        }
    }

    if let Some(path) = path {
        let alias = alias.unwrap_or_else(|| {
            path.rsplit('/').next().unwrap_or(path.as_str()).to_string()
        });
        imports.insert(alias, path);
    }
}

fn parse_type_declaration(
    node: Node,
    source: &str,
    file: &Path,
    comments: &BTreeMap<usize, String>,
    unit: &mut SourceUnit,
) {
    let mut cursor = node.walk();
    for spec in node.children(&mut cursor) {
        if spec.kind() != "type_spec" {
            continue;
        }

        let mut name = String::new();
        let mut struct_body = None;
        let mut c = spec.walk();
        for n in spec.children(&mut c) {
            match n.kind() {
                "type_identifier" if name.is_empty() => {
                    name = text(n, source).to_string();
                }
                "struct_type" => struct_body = Some(n),
                _ => {}
            }
        }

        let Some(body) = struct_body else { continue };

        let row = spec.start_position().row;
        let comment = comment_above(comments, row);

        unit.structs.push(StructDef {
            name,
            comment,
            fields: parse_struct_fields(body, source, comments, &unit.imports),
            file: PathBuf::from(file),
        });
    }
}

fn comment_above(comments: &BTreeMap<usize, String>, row: usize) -> String {
    if row == 0 {
        return String::new();
    }
    comments.get(&(row - 1)).cloned().unwrap_or_default()
}

fn parse_struct_fields(
    body: Node,
    source: &str,
    comments: &BTreeMap<usize, String>,
    imports: &BTreeMap<String, String>,
) -> Vec<Field> {
    let mut fields = Vec::new();

    let mut cursor = body.walk();
    for list in body.children(&mut cursor) {
        if list.kind() != "field_declaration_list" {
            continue;
        }
        let mut c = list.walk();
        for decl in list.children(&mut c) {
            if decl.kind() == "field_declaration" {
                parse_field_declaration(decl, source, comments, imports, &mut fields);
            }
        }
    }

    fields
}

fn parse_field_declaration(
    decl: Node,
    source: &str,
    comments: &BTreeMap<usize, String>,
    imports: &BTreeMap<String, String>,
    fields: &mut Vec<Field>,
) {
    let mut names: Vec<String> = Vec::new();
    let mut type_expr = None;
    let mut tag = String::new();

    let mut cursor = decl.walk();
    for child in decl.children(&mut cursor) {
        match child.kind() {
            "field_identifier" => names.push(text(child, source).to_string()),
            "raw_string_literal" => {
                tag = text(child, source).trim_matches('`').to_string();
            }
            "interpreted_string_literal" => {
                tag = text(child, source).trim_matches('"').to_string();
            }
            "," => {}
            _ => {
                // First non-name, non-tag node is the declared type.
                if type_expr.is_none() {
                    type_expr = Some(parse_type_expr(child, source));
                }
            }
        }
    }

    let Some(type_expr) = type_expr else { return };
    let type_string = expand_type_string(&type_expr, imports);
    let comment = comment_above(comments, decl.start_position().row);

    if names.is_empty() {
        // Embedded field: the name is the type's base name.
        if let Some(name) = embedded_name(&type_expr) {
            fields.push(Field {
                name,
                type_expr,
                type_string,
                tag,
                comment,
                embedded: true,
            });
        }
        return;
    }

    for name in names {
        fields.push(Field {
            name,
            type_expr: type_expr.clone(),
            type_string: type_string.clone(),
            tag: tag.clone(),
            comment: comment.clone(),
            embedded: false,
        });
    }
}

fn embedded_name(type_expr: &TypeExpr) -> Option<String> {
    match type_expr {
        TypeExpr::Named(n) => Some(n.name.clone()),
        TypeExpr::Pointer(inner) => embedded_name(inner),
        _ => None,
    }
}

fn parse_type_expr(node: Node, source: &str) -> TypeExpr {
    match node.kind() {
        "type_identifier" => TypeExpr::Named(TypeName::local(text(node, source))),
        "qualified_type" => {
            let mut package = None;
            let mut name = String::new();
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                match child.kind() {
                    "package_identifier" => package = Some(text(child, source).to_string()),
                    "type_identifier" => name = text(child, source).to_string(),
                    _ => {}
                }
            }
            TypeExpr::Named(TypeName { package, name })
        }
        "pointer_type" => match element_type(node) {
            Some(elem) => TypeExpr::Pointer(Box::new(parse_type_expr(elem, source))),
            None => TypeExpr::Other(text(node, source).to_string()),
        },
        "slice_type" => match element_type(node) {
            Some(elem) => TypeExpr::Slice(Box::new(parse_type_expr(elem, source))),
            None => TypeExpr::Other(text(node, source).to_string()),
        },
        "map_type" => {
            let mut parts = Vec::new();
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if !matches!(child.kind(), "map" | "[" | "]") {
                    parts.push(parse_type_expr(child, source));
                }
            }
            match (parts.first(), parts.get(1)) {
                (Some(k), Some(v)) => TypeExpr::Map(Box::new(k.clone()), Box::new(v.clone())),
                _ => TypeExpr::Other(text(node, source).to_string()),
            }
        }
        _ => TypeExpr::Other(text(node, source).to_string()),
    }
}

/// The single type child of a pointer or slice node, skipping punctuation.
fn element_type(node: Node) -> Option<Node> {
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .find(|c| !matches!(c.kind(), "*" | "[" | "]"))
}

fn parse_method(node: Node, source: &str) -> Option<(String, String)> {
    let mut receiver = None;
    let mut name = None;

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "parameter_list" if receiver.is_none() => {
                receiver = receiver_base_type(child, source);
            }
            "field_identifier" => {
                name = Some(text(child, source).to_string());
            }
            _ => {}
        }
    }

    Some((receiver?, name?))
}

fn receiver_base_type(params: Node, source: &str) -> Option<String> {
    let mut cursor = params.walk();
    for decl in params.children(&mut cursor) {
        if decl.kind() != "parameter_declaration" {
            continue;
        }
        let mut c = decl.walk();
        for n in decl.children(&mut c) {
            match n.kind() {
                "type_identifier" => return Some(text(n, source).to_string()),
                "pointer_type" => {
                    if let Some(elem) = element_type(n) {
                        if elem.kind() == "type_identifier" {
                            return Some(text(elem, source).to_string());
                        }
                    }
                }
                _ => {}
            }
        }
    }
    None
}

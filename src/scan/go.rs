use std::collections::HashMap;
use std::path::Path;

use tree_sitter::{Node, Parser as TSParser};

use crate::error::ScanError;
use crate::message::{Message, PluralForm};
use crate::scan::literal;

pub const GO_I18N_IMPORT: &str = "github.com/nicksnyder/go-i18n/v2/i18n";

const MESSAGE_TYPES: [&str; 2] = ["Message", "LocalizeConfig"];

// Bound on const-to-const indirection while resolving identifiers
const MAX_RESOLVE_DEPTH: usize = 32;

/// Extract go-i18n message literals from one Go source file.
///
/// Files that do not import go-i18n yield nothing. A file tree-sitter cannot
/// parse cleanly is an error.
pub fn extract_messages(path: &Path, source: &str) -> Result<Vec<Message>, ScanError> {
    let mut ts_parser = TSParser::new();
    ts_parser.set_language(&tree_sitter_go::LANGUAGE.into())?;

    let tree = ts_parser
        .parse(source, None)
        .ok_or_else(|| ScanError::Parse(path.to_path_buf()))?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(ScanError::Parse(path.to_path_buf()));
    }

    let Some(package) = i18n_package_name(root, source) else {
        return Ok(Vec::new());
    };

    let mut extractor = Extractor {
        source,
        package,
        bindings: HashMap::new(),
        messages: Vec::new(),
    };
    extractor.collect_bindings(root);
    extractor.walk(root);
    Ok(extractor.messages)
}

/// Local name under which the file imports go-i18n
fn i18n_package_name(root: Node, source: &str) -> Option<String> {
    let mut found = None;
    visit(root, &mut |node| {
        if found.is_some() || node.kind() != "import_spec" {
            return;
        }
        let Some(path) = node.child_by_field_name("path") else {
            return;
        };
        if literal::unquote(node_text(path, source)).as_deref() != Some(GO_I18N_IMPORT) {
            return;
        }
        found = Some(match node.child_by_field_name("name") {
            Some(name) => node_text(name, source).to_string(),
            None => "i18n".to_string(),
        });
    });
    found
}

fn visit<'t>(node: Node<'t>, f: &mut impl FnMut(Node<'t>)) {
    f(node);
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit(child, f);
    }
}

/// `const_spec`/`var_spec` nodes of a declaration, not descending into
/// their values
fn collect_specs<'t>(node: Node<'t>, specs: &mut Vec<Node<'t>>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "const_spec" | "var_spec" => specs.push(child),
            _ => collect_specs(child, specs),
        }
    }
}

fn node_text<'s>(node: Node, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

struct Extractor<'s, 't> {
    source: &'s str,
    package: String,
    /// Names bound by `const`/`var` specs to their value expression
    bindings: HashMap<String, Node<'t>>,
    messages: Vec<Message>,
}

impl<'s, 't> Extractor<'s, 't> {
    /// Only package-level declarations are bound; names declared inside
    /// function bodies are left unresolved.
    fn collect_bindings(&mut self, root: Node<'t>) {
        let mut specs = Vec::new();
        let mut cursor = root.walk();
        for decl in root.named_children(&mut cursor) {
            if matches!(decl.kind(), "const_declaration" | "var_declaration") {
                collect_specs(decl, &mut specs);
            }
        }

        for spec in specs {
            let Some(values) = spec.child_by_field_name("value") else {
                continue;
            };
            let mut cursor = spec.walk();
            let names: Vec<Node> = spec
                .children_by_field_name("name", &mut cursor)
                .filter(|n| n.kind() == "identifier")
                .collect();
            let mut value_cursor = values.walk();
            let exprs: Vec<Node> = values
                .named_children(&mut value_cursor)
                .filter(|n| n.kind() != "comment")
                .collect();

            for (name, expr) in names.into_iter().zip(exprs) {
                self.bindings
                    .insert(node_text(name, self.source).to_string(), expr);
            }
        }
    }

    fn walk(&mut self, node: Node<'t>) {
        if node.kind() == "composite_literal" {
            self.composite_literal(node);
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk(child);
        }
    }

    fn composite_literal(&mut self, node: Node<'t>) {
        let (Some(ty), Some(body)) = (
            node.child_by_field_name("type"),
            node.child_by_field_name("body"),
        ) else {
            return;
        };

        match ty.kind() {
            "qualified_type" | "pointer_type" => {
                if self.is_message_type(ty) {
                    self.extract_message(body);
                }
            }
            "slice_type" | "array_type" | "implicit_length_array_type" => {
                if ty
                    .child_by_field_name("element")
                    .is_some_and(|el| self.is_message_type(el))
                {
                    for element in elements(body) {
                        self.extract_elided(element);
                    }
                }
            }
            "map_type" => {
                if ty
                    .child_by_field_name("value")
                    .is_some_and(|v| self.is_message_type(v))
                {
                    for element in elements(body) {
                        if element.kind() == "keyed_element" {
                            if let Some(value) = keyed_parts(element).map(|(_, v)| v) {
                                self.extract_elided(value);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// `pkg.Message`, `*pkg.Message`, `pkg.LocalizeConfig`, ...
    fn is_message_type(&self, ty: Node) -> bool {
        let ty = match ty.kind() {
            "pointer_type" | "parenthesized_type" => match first_named(ty) {
                Some(inner) => inner,
                None => return false,
            },
            _ => ty,
        };
        if ty.kind() != "qualified_type" {
            return false;
        }
        let package = ty
            .child_by_field_name("package")
            .map(|n| node_text(n, self.source));
        let name = ty
            .child_by_field_name("name")
            .map(|n| node_text(n, self.source));
        package == Some(self.package.as_str()) && name.is_some_and(|n| MESSAGE_TYPES.contains(&n))
    }

    /// An element of a message slice or map whose type was elided, `{ID: ...}`.
    /// Elements spelled out as composite literals are picked up by the walk.
    fn extract_elided(&mut self, element: Node<'t>) {
        let element = unwrap_element(element);
        if element.kind() == "literal_value" {
            self.extract_message(element);
        }
    }

    fn extract_message(&mut self, body: Node<'t>) {
        let mut fields: HashMap<String, String> = HashMap::new();
        for element in elements(body) {
            if element.kind() != "keyed_element" {
                continue;
            }
            let Some((key, value)) = keyed_parts(element) else {
                continue;
            };
            if !matches!(key.kind(), "identifier" | "field_identifier") {
                continue;
            }
            if let Some(text) = self.resolve_string(value, 0) {
                fields.insert(node_text(key, self.source).to_string(), text);
            }
        }
        if fields.is_empty() {
            return;
        }

        let id = fields
            .get("MessageID")
            .filter(|id| !id.is_empty())
            .or_else(|| fields.get("ID"))
            .cloned()
            .unwrap_or_default();
        if id.is_empty() {
            return;
        }

        let mut message = Message::new(&id);
        message.description = fields.remove("Description");
        for (field, form) in [
            ("Zero", PluralForm::Zero),
            ("One", PluralForm::One),
            ("Two", PluralForm::Two),
            ("Few", PluralForm::Few),
            ("Many", PluralForm::Many),
            ("Other", PluralForm::Other),
        ] {
            if let Some(text) = fields.remove(field) {
                message.set_form(form, text);
            }
        }
        self.messages.push(message);
    }

    /// Value of a string-typed expression: literals, `+` concatenation and
    /// names bound to such expressions.
    fn resolve_string(&self, node: Node<'t>, depth: usize) -> Option<String> {
        if depth > MAX_RESOLVE_DEPTH {
            return None;
        }
        let node = unwrap_element(node);
        match node.kind() {
            "interpreted_string_literal" | "raw_string_literal" => {
                literal::unquote(node_text(node, self.source))
            }
            "binary_expression" => {
                let operator = node.child_by_field_name("operator")?;
                if node_text(operator, self.source) != "+" {
                    return None;
                }
                let left = self.resolve_string(node.child_by_field_name("left")?, depth + 1)?;
                let right = self.resolve_string(node.child_by_field_name("right")?, depth + 1)?;
                Some(left + &right)
            }
            "parenthesized_expression" => self.resolve_string(first_named(node)?, depth + 1),
            "identifier" => {
                let bound = *self.bindings.get(node_text(node, self.source))?;
                self.resolve_string(bound, depth + 1)
            }
            _ => None,
        }
    }
}

fn first_named(node: Node) -> Option<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .find(|n| n.kind() != "comment")
}

/// Elements of a `literal_value`, comments skipped
fn elements(body: Node) -> Vec<Node> {
    let mut cursor = body.walk();
    body.named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect()
}

/// Key and value of a `keyed_element`, with `literal_element` wrappers removed
fn keyed_parts(element: Node) -> Option<(Node, Node)> {
    let parts = elements(element);
    if parts.len() < 2 {
        return None;
    }
    Some((unwrap_element(parts[0]), unwrap_element(parts[parts.len() - 1])))
}

fn unwrap_element(node: Node) -> Node {
    if node.kind() == "literal_element" {
        if let Some(inner) = first_named(node) {
            return inner;
        }
    }
    node
}

//! paramdup samples - fixture generator
//!
//! Builds a class whose methods cover the parameter shapes the duplication
//! pass has to handle: every base type, nullable or not, bare or wrapped in a
//! container, with and without a passing modifier. Each method takes exactly
//! one parameter, so every one of them qualifies under the default policy.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use paramdup_ast::{
    Block, CompilationUnit, Item, ItemKind, Lexeme, LexemeKind, MethodBody, MethodDecl, ParamModifier,
    Parameter, SourceTree, TypeDecl, TypeExpr,
};
use tracing::debug;

pub const BASE_TYPES: &[&str] = &["int", "string", "bool", "double", "float", "MyClass"];

pub const MODIFIERS: &[ParamModifier] = &[ParamModifier::Ref, ParamModifier::Out, ParamModifier::In];

/// Name given to every generated parameter
pub const PARAM_NAME: &str = "param1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    List,
    Dictionary,
}

impl Container {
    pub const ALL: [Container; 2] = [Container::List, Container::Dictionary];

    /// `List<T>` or `Dictionary<string, T>`
    pub fn wrap(self, element: TypeExpr) -> TypeExpr {
        match self {
            Container::List => TypeExpr::generic("List", vec![element]),
            Container::Dictionary => {
                TypeExpr::generic("Dictionary", vec![TypeExpr::named("string"), element])
            }
        }
    }
}

/// Base types followed by their nullable variants
pub fn base_types() -> Vec<TypeExpr> {
    let plain = BASE_TYPES.iter().map(|name| TypeExpr::named(*name));
    let nullable = BASE_TYPES.iter().map(|name| TypeExpr::named(*name).nullable());
    plain.chain(nullable).collect()
}

/// One parameter per shape, in generation order.
///
/// For each base type: the bare type, then each container; then for each
/// modifier the same three again.
pub fn parameter_shapes() -> Vec<Parameter> {
    let mut shapes = Vec::new();
    for base in base_types() {
        let types: Vec<TypeExpr> = std::iter::once(base.clone())
            .chain(Container::ALL.iter().map(|c| c.wrap(base.clone())))
            .collect();

        shapes.extend(types.iter().map(|ty| Parameter::new(ty.clone(), PARAM_NAME)));
        for &modifier in MODIFIERS {
            shapes.extend(
                types
                    .iter()
                    .map(|ty| Parameter::new(ty.clone(), PARAM_NAME).with_modifier(modifier)),
            );
        }
    }
    shapes
}

fn method(name: String, param: Parameter) -> Item {
    Item::new(ItemKind::Method(MethodDecl {
        modifiers: vec!["public".to_string()],
        return_type: TypeExpr::named("void"),
        name,
        type_params: vec![],
        params: vec![Arc::new(param)],
        constraints: vec![],
        body: MethodBody::Block(Block::empty()),
    }))
}

/// `public class <class_name>` holding `test_1`, `test_2`, ... one per shape
pub fn generate_class(class_name: &str) -> SourceTree {
    let members = parameter_shapes()
        .into_iter()
        .enumerate()
        .map(|(i, param)| Arc::new(method(format!("test_{}", i + 1), param)))
        .collect();

    let class = Item::new(ItemKind::Type(TypeDecl {
        header: vec![
            Lexeme::new(LexemeKind::Keyword, "public"),
            Lexeme::new(LexemeKind::Keyword, "class"),
            Lexeme::new(LexemeKind::Ident, class_name),
        ],
        members,
        trailing: vec![],
        has_body: true,
        semicolon: false,
    }));

    let unit = CompilationUnit {
        items: vec![Arc::new(class)],
        ..CompilationUnit::default()
    };
    SourceTree::new(unit, None)
}

/// Rendered source of [`generate_class`]
pub fn render_class(class_name: &str) -> String {
    generate_class(class_name).render()
}

/// Write `<class_name>.cs` into `dir` and return its path
pub fn write_sample(dir: &Path, class_name: &str) -> io::Result<PathBuf> {
    let path = dir.join(format!("{}.cs", class_name));
    let source = render_class(class_name);
    fs::write(&path, &source)?;
    debug!(methods = parameter_shapes().len(), "wrote {}", path.display());
    Ok(path)
}

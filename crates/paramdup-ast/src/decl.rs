//! Declaration nodes (compilation unit, namespaces, types, members)

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Block, Lexeme, NodeId, Span, Stmt, Trivia, TypeExpr};

/// The root of a parsed file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub items: Vec<Arc<Item>>,
    /// Comments and directives after the last item
    pub trailing: Vec<Trivia>,
    pub span: Span,
}

/// A declaration with its leading annotations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: NodeId,
    pub leading: Vec<Trivia>,
    pub attributes: Vec<AttributeList>,
    pub kind: ItemKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// `namespace A.B { ... }` or `namespace A.B;`
    Namespace(NamespaceDecl),

    /// `class`, `struct`, `interface` and `record` declarations
    Type(TypeDecl),

    /// Method declaration: `public int Add(int a, int b) { ... }`
    Method(MethodDecl),

    /// Any other member or top-level line, kept as lines and blocks
    Other(OtherDecl),
}

/// An attribute section: `[Serializable]`, `[return: NotNull]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeList {
    /// Lexemes including the surrounding brackets
    pub lexemes: Vec<Lexeme>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceDecl {
    pub name: String,
    pub file_scoped: bool,
    pub items: Vec<Arc<Item>>,
    pub trailing: Vec<Trivia>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Modifiers, keyword, name, type parameters, base list and constraints
    pub header: Vec<Lexeme>,
    pub members: Vec<Arc<Item>>,
    pub trailing: Vec<Trivia>,
    /// `false` for bodiless records: `record Point(int X, int Y);`
    pub has_body: bool,
    /// Followed by `;`
    pub semicolon: bool,
}

/// A method declaration, the function-like unit rewritten by paramdup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub modifiers: Vec<String>,
    pub return_type: TypeExpr,
    /// Possibly interface-qualified: `IDisposable.Dispose`
    pub name: String,
    /// Lexemes between the angle brackets of `<T, U>`, empty when not generic
    pub type_params: Vec<Lexeme>,
    pub params: Vec<Arc<Parameter>>,
    /// `where T : class` clauses
    pub constraints: Vec<Lexeme>,
    pub body: MethodBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodBody {
    /// `{ ... }`
    Block(Block),
    /// `=> expr;`
    Expression(Vec<Lexeme>),
    /// `;` (abstract, interface, extern and partial methods)
    None,
}

/// A formal parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: NodeId,
    pub attributes: Vec<AttributeList>,
    pub modifiers: Vec<ParamModifier>,
    pub ty: TypeExpr,
    pub name: String,
    /// Default value lexemes after `=`
    pub default: Option<Vec<Lexeme>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamModifier {
    Ref,
    Out,
    In,
    Params,
    This,
    Scoped,
    Readonly,
}

/// Members the rewriter never looks into: fields, properties, constructors,
/// operators, enums, delegates, `using` directives, ...
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherDecl {
    pub statements: Vec<Stmt>,
}

impl ParamModifier {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamModifier::Ref => "ref",
            ParamModifier::Out => "out",
            ParamModifier::In => "in",
            ParamModifier::Params => "params",
            ParamModifier::This => "this",
            ParamModifier::Scoped => "scoped",
            ParamModifier::Readonly => "readonly",
        }
    }

    pub fn from_keyword(text: &str) -> Option<Self> {
        match text {
            "ref" => Some(ParamModifier::Ref),
            "out" => Some(ParamModifier::Out),
            "in" => Some(ParamModifier::In),
            "params" => Some(ParamModifier::Params),
            "this" => Some(ParamModifier::This),
            "scoped" => Some(ParamModifier::Scoped),
            "readonly" => Some(ParamModifier::Readonly),
            _ => None,
        }
    }
}

impl Item {
    /// A detached item; it receives an id when inserted into a tree.
    pub fn new(kind: ItemKind) -> Self {
        Self {
            id: NodeId::DETACHED,
            leading: vec![],
            attributes: vec![],
            kind,
            span: Span::dummy(),
        }
    }

    pub fn as_method(&self) -> Option<&MethodDecl> {
        match &self.kind {
            ItemKind::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn is_method(&self) -> bool {
        self.as_method().is_some()
    }

    /// Child items in source order
    pub fn items(&self) -> &[Arc<Item>] {
        match &self.kind {
            ItemKind::Namespace(ns) => &ns.items,
            ItemKind::Type(ty) => &ty.members,
            ItemKind::Method(_) | ItemKind::Other(_) => &[],
        }
    }

    pub(crate) fn items_mut(&mut self) -> Option<&mut Vec<Arc<Item>>> {
        match &mut self.kind {
            ItemKind::Namespace(ns) => Some(&mut ns.items),
            ItemKind::Type(ty) => Some(&mut ty.members),
            ItemKind::Method(_) | ItemKind::Other(_) => None,
        }
    }
}

impl MethodDecl {
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }
}

impl Parameter {
    /// A detached parameter with no modifiers, attributes or default.
    pub fn new(ty: TypeExpr, name: impl Into<String>) -> Self {
        Self {
            id: NodeId::DETACHED,
            attributes: vec![],
            modifiers: vec![],
            ty,
            name: name.into(),
            default: None,
            span: Span::dummy(),
        }
    }

    pub fn with_modifier(mut self, modifier: ParamModifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// A detached copy under a new name, keeping type, modifiers,
    /// attributes and default value.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            id: NodeId::DETACHED,
            name: name.into(),
            span: Span::dummy(),
            ..self.clone()
        }
    }
}

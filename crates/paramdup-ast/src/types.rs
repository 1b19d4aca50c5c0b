//! Type expressions as they appear in signatures

use serde::{Deserialize, Serialize};

/// A type expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeExpr {
    /// Named type: `int`, `System.String`, `List<T>`, `global::Foo`
    Named(TypeName),

    /// Tuple type: `(int, string name)`
    Tuple(Vec<TupleElement>),

    /// Array type: `int[]`, `int[,]`
    Array { element: Box<TypeExpr>, rank: usize },

    /// Nullable type: `int?`, `string?`
    Nullable(Box<TypeExpr>),

    /// Unsafe pointer type: `byte*`
    Pointer(Box<TypeExpr>),
}

/// A possibly qualified, possibly generic type name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeName {
    pub segments: Vec<NameSegment>,
}

/// One segment of a qualified name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameSegment {
    pub name: String,
    pub args: Vec<TypeExpr>,
    /// Joined to the previous segment with `::` instead of `.`
    pub alias_qualified: bool,
}

/// An element of a tuple type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleElement {
    pub ty: TypeExpr,
    pub name: Option<String>,
}

impl TypeExpr {
    /// A simple unqualified name: `int`, `MyClass`
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::generic(name, vec![])
    }

    /// A generic name: `List<int>`
    pub fn generic(name: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        TypeExpr::Named(TypeName {
            segments: vec![NameSegment {
                name: name.into(),
                args,
                alias_qualified: false,
            }],
        })
    }

    pub fn nullable(self) -> Self {
        TypeExpr::Nullable(Box::new(self))
    }

    pub fn array(self, rank: usize) -> Self {
        TypeExpr::Array {
            element: Box::new(self),
            rank,
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, TypeExpr::Nullable(_))
    }
}

impl TypeName {
    /// The last segment's name: `String` for `System.String`
    pub fn name(&self) -> &str {
        self.segments.last().map(|s| s.name.as_str()).unwrap_or("")
    }
}

//! paramdup parser - recursive descent parser for C# source files
//!
//! Parses C# source into a [`SourceTree`]. Namespaces, types, methods and
//! method parameters are parsed structurally; method bodies and all other
//! members are kept as lines and nested blocks. Parsing never partially
//! succeeds: malformed input yields a [`ParseError`] with the offending span.

mod error;
mod parser;

pub use error::*;
pub use parser::*;

use std::path::PathBuf;

use paramdup_ast::SourceTree;
use paramdup_lexer::tokenize;

/// Parse a source string into a tree with no originating file
pub fn parse(source: &str) -> Result<SourceTree, ParseError> {
    let tokens = tokenize(source);
    let mut parser = Parser::new(source, tokens);
    let unit = parser.parse_unit()?;
    Ok(SourceTree::new(unit, None))
}

/// Parse a source string read from `path`
pub fn parse_file(source: &str, path: impl Into<PathBuf>) -> Result<SourceTree, ParseError> {
    Ok(parse(source)?.with_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramdup_ast::{ItemKind, MethodBody, ParamModifier, Trivia, TypeExpr};
    use pretty_assertions::assert_eq;

    fn method_names(tree: &SourceTree) -> Vec<String> {
        tree.methods()
            .iter()
            .filter_map(|m| m.as_method())
            .map(|m| m.name.clone())
            .collect()
    }

    #[test]
    fn test_parse_class_with_method() {
        let source = r#"
using System;

namespace Demo
{
    public class Calc
    {
        public int Add(int a, int b)
        {
            return a + b;
        }
    }
}
"#;
        let result = parse(source);
        assert!(result.is_ok(), "Failed to parse: {:?}", result.err());
        let tree = result.unwrap();

        assert_eq!(tree.unit().items.len(), 2);
        assert!(matches!(tree.unit().items[1].kind, ItemKind::Namespace(_)));

        let methods = tree.methods();
        assert_eq!(methods.len(), 1);
        let add = methods[0].as_method().unwrap();
        assert_eq!(add.name, "Add");
        assert_eq!(add.modifiers, vec!["public"]);
        assert_eq!(add.return_type, TypeExpr::named("int"));
        assert_eq!(add.param_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(matches!(add.body, MethodBody::Block(_)));
    }

    #[test]
    fn test_parse_file_records_path() {
        let tree = parse_file("class A { }", "src/A.cs").unwrap();
        assert_eq!(tree.path(), Some(std::path::Path::new("src/A.cs")));
    }

    #[test]
    fn test_methods_only_are_function_like() {
        let source = r#"
public class Shapes
{
    private int count;
    public int Count { get; set; } = 5;
    public event EventHandler Changed;
    public delegate void Handler(int x);
    public enum Color { Red, Green }

    public Shapes(int count) : this() { }
    static Shapes() { }
    ~Shapes() { }
    public int this[int i] => i;
    public static Shapes operator +(Shapes a, Shapes b) => a;
    public static implicit operator int(Shapes s) => s.count;

    public void Draw(int x)
    {
        void Local(int y) { }
        Local(x);
    }
}
"#;
        let tree = parse(source).unwrap();
        assert_eq!(method_names(&tree), vec!["Draw"]);
    }

    #[test]
    fn test_parse_method_shapes() {
        let source = r#"
interface IShape
{
    double Area();
}

abstract class Base : IShape, IDisposable
{
    public abstract double Area();
    void IDisposable.Dispose() { }
    public static T Max<T>(T a, T b) where T : IComparable<T> => a.CompareTo(b) > 0 ? a : b;
    partial void OnChanged(string name);
    public async Task<(int Min, int Max)> RangeAsync() => (0, 1);
    public ref readonly int First(int[] items) => ref items[0];
}
"#;
        let tree = parse(source).unwrap();
        assert_eq!(
            method_names(&tree),
            vec!["Area", "Area", "IDisposable.Dispose", "Max", "OnChanged", "RangeAsync", "First"]
        );

        let methods = tree.methods();
        let max = methods[3].as_method().unwrap();
        assert_eq!(max.type_params.len(), 1);
        assert!(!max.constraints.is_empty());
        assert!(matches!(max.body, MethodBody::Expression(_)));

        let first = methods[6].as_method().unwrap();
        assert_eq!(first.modifiers, vec!["public", "ref", "readonly"]);
    }

    #[test]
    fn test_parse_parameter_shapes() {
        let source = r#"
static class Ext
{
    public static void All(this string s, ref int a, out string b, in double c, [NotNull] int? n = null, List<Dictionary<string, int>> m = default, (int x, int y) p = default, params object[] rest) { }
}
"#;
        let tree = parse(source).unwrap();
        let methods = tree.methods();
        let all = methods[0].as_method().unwrap();
        assert_eq!(all.param_count(), 8);

        let modifiers: Vec<Vec<ParamModifier>> =
            all.params.iter().map(|p| p.modifiers.clone()).collect();
        assert_eq!(
            modifiers,
            vec![
                vec![ParamModifier::This],
                vec![ParamModifier::Ref],
                vec![ParamModifier::Out],
                vec![ParamModifier::In],
                vec![],
                vec![],
                vec![],
                vec![ParamModifier::Params],
            ]
        );

        let n = &all.params[4];
        assert_eq!(n.attributes.len(), 1);
        assert_eq!(n.ty, TypeExpr::named("int").nullable());
        assert!(n.default.is_some());

        let m = &all.params[5];
        assert_eq!(
            m.ty,
            TypeExpr::generic(
                "List",
                vec![TypeExpr::generic(
                    "Dictionary",
                    vec![TypeExpr::named("string"), TypeExpr::named("int")]
                )]
            )
        );

        assert!(matches!(all.params[6].ty, TypeExpr::Tuple(_)));
        assert_eq!(all.params[7].ty, TypeExpr::named("object").array(1));
    }

    #[test]
    fn test_parse_file_scoped_namespace_and_records() {
        let source = r#"
namespace App.Models;

public record Point(int X, int Y);

public record class Person(string Name)
{
    public string Greet(string other) => $"Hi {other}, I am {Name}";
}
"#;
        let tree = parse(source).unwrap();
        let ItemKind::Namespace(ns) = &tree.unit().items[0].kind else {
            panic!("Expected namespace");
        };
        assert!(ns.file_scoped);
        assert_eq!(ns.name, "App.Models");
        assert_eq!(ns.items.len(), 2);
        assert_eq!(method_names(&tree), vec!["Greet"]);
    }

    #[test]
    fn test_comments_become_trivia() {
        let source = r#"
class A
{
    /// <summary>Doc</summary>
    // second
    /* block
       spanning lines */
    void M(int x) { }
    /* end */ #region tail
}
"#;
        let tree = parse(source).unwrap();
        let class = &tree.unit().items[0];
        let ItemKind::Type(ty) = &class.kind else {
            panic!("Expected type");
        };
        assert_eq!(
            ty.members[0].leading,
            vec![
                Trivia::LineComment("/// <summary>Doc</summary>".to_string()),
                Trivia::LineComment("// second".to_string()),
                Trivia::BlockComment("/* block\n       spanning lines */".to_string()),
            ]
        );
        assert_eq!(
            ty.trailing,
            vec![
                Trivia::BlockComment("/* end */".to_string()),
                Trivia::Directive("#region tail".to_string()),
            ]
        );
    }

    #[test]
    fn test_render_canonical_layout() {
        let source = r#"using System;
namespace Demo {
    // A class
    public class Calc {
        private int total;
        public int Add(int a) { total += a; return total; }
        public Calc() { total = 0; }
    }
}"#;
        let expected = r#"using System;

namespace Demo
{
    // A class
    public class Calc
    {
        private int total;

        public int Add(int a)
        {
            total += a;
            return total;
        }

        public Calc()
        {
            total = 0;
        }
    }
}
"#;
        let tree = parse(source).unwrap();
        assert_eq!(tree.render(), expected);
    }

    #[test]
    fn test_render_is_idempotent() {
        let source = r#"
using System;
using System.Collections.Generic;
using System.Linq;

namespace Demo.Samples
{
    [Serializable]
    public sealed class Inventory<T> : IEnumerable<T> where T : class, new()
    {
        private readonly Dictionary<string, List<T>> items = new();
        public int Count => items.Count;
        public string Name { get; private set; } = "default";

        /// <summary>Adds an item.</summary>
        [Obsolete("use Put")]
        public void Add(string key, T item = null)
        {
            if (!items.TryGetValue(key, out var list)) { list = new List<T>(); items[key] = list; }
            list.Add(item ?? new T());
            var evens = list.Where((x, i) => i % 2 == 0).Select(x => x?.ToString()).ToList();
            for (int i = 0; i < evens.Count; i++) { Console.WriteLine($"{i}: {evens[i]}"); }
            var point = new Point { X = -1, Y = items.Count >= 2 ? 1 : 0 };
            switch (key) { case "a": break; default: throw new ArgumentException(nameof(key)); }
            list.ForEach(x => { Console.WriteLine(x); });
        }

        public static int Parse(string text) => int.Parse(text) << 2 >> 1;

        IEnumerator<T> IEnumerable<T>.GetEnumerator() => items.Values.SelectMany(v => v).GetEnumerator();
    }
}
"#;
        let first = parse(source).unwrap().render();
        let second = parse(&first).unwrap().render();
        assert_eq!(first, second);
    }

    #[test]
    fn test_error_unclosed_brace() {
        let result = parse("class A { void M(int x) { }");
        assert!(matches!(result, Err(ParseError::UnexpectedEof { .. })));
    }

    #[test]
    fn test_error_stray_closing_brace() {
        let result = parse("class A { } }");
        assert!(matches!(result, Err(ParseError::UnbalancedDelimiter { .. })));
    }

    #[test]
    fn test_error_mismatched_attribute() {
        let result = parse("[Obsolete(\"x\"] class A { }");
        assert!(matches!(result, Err(ParseError::UnbalancedDelimiter { .. })));
    }

    #[test]
    fn test_error_invalid_token() {
        let err = parse("class A { int x = `; }").unwrap_err();
        assert!(matches!(err, ParseError::InvalidToken { .. }));
        assert_eq!(err.span().start, 18);
    }

    #[test]
    fn test_empty_source() {
        let tree = parse("").unwrap();
        assert!(tree.unit().items.is_empty());
        assert_eq!(tree.render(), "");
    }
}

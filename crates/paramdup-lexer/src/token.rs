//! Token definitions for C#

use logos::{Lexer, Logos};
use paramdup_ast::LexemeKind;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f\x{FEFF}]+")]
pub enum TokenKind {
    // === Comments and directives (kept, they are reproduced in output) ===
    #[regex(r"//[^\n]*")]
    LineComment,
    #[token("/*", block_comment)]
    BlockComment,
    #[regex(r"#[^\n]*")]
    Directive,

    // === Keywords ===
    #[token("using")]
    Using,
    #[token("namespace")]
    Namespace,
    #[token("class")]
    Class,
    #[token("struct")]
    Struct,
    #[token("interface")]
    Interface,
    #[token("enum")]
    Enum,
    #[token("delegate")]
    Delegate,
    #[token("event")]
    Event,
    #[token("operator")]
    Operator,
    #[token("implicit")]
    Implicit,
    #[token("explicit")]
    Explicit,
    #[token("this")]
    This,
    #[token("base")]
    Base,
    #[token("new")]
    New,
    #[token("ref")]
    Ref,
    #[token("out")]
    Out,
    #[token("in")]
    In,
    #[token("params")]
    Params,
    #[token("return")]
    Return,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("foreach")]
    Foreach,
    #[token("do")]
    Do,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("try")]
    Try,
    #[token("catch")]
    Catch,
    #[token("finally")]
    Finally,
    #[token("throw")]
    Throw,
    #[token("lock")]
    Lock,
    #[token("fixed")]
    Fixed,
    #[token("typeof")]
    Typeof,
    #[token("sizeof")]
    Sizeof,
    #[token("checked")]
    Checked,
    #[token("unchecked")]
    Unchecked,
    #[token("is")]
    Is,
    #[token("as")]
    As,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // === Operators ===
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    Ne,
    #[token("=>")]
    FatArrow,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token("<<")]
    Shl,
    #[token("<<=")]
    ShlEq,
    // `>>`, `>=` and `>>=` are left as separate `>` tokens so that nested
    // type arguments (`List<List<int>>`) close one level at a time.
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("??")]
    QuestionQuestion,
    #[token("??=")]
    QuestionQuestionEq,
    #[token("?.")]
    QuestionDot,
    #[token("->")]
    Arrow,
    #[token("::")]
    ColonColon,
    #[token("..")]
    DotDot,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // === Punctuation ===
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token("?")]
    Question,

    // === Literals ===
    #[regex(r"[0-9][0-9_]*[uUlL]*", priority = 2)]
    #[regex(r"0[xX][0-9a-fA-F_]+[uUlL]*")]
    #[regex(r"0[bB][01_]+[uUlL]*")]
    Int,

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?[fFdDmM]?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+[fFdDmM]?")]
    #[regex(r"[0-9][0-9_]*[fFdDmM]")]
    Float,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r#"@"([^"]|"")*""#)]
    #[token("$\"", interpolated)]
    #[token("$@\"", verbatim_interpolated)]
    #[token("@$\"", verbatim_interpolated)]
    #[regex(r#"\$*""""#, raw_string)]
    String,

    #[regex(r"'([^'\\\n]|\\.)+'")]
    Char,

    // === Identifiers ===
    // Built-in type names and contextual keywords (`var`, `record`,
    // `where`, `async`, ...) are identifiers.
    #[regex(r"@?[\p{L}_][\p{L}\p{N}_]*")]
    Ident,

    // === Special ===
    Error,
    Eof,
}

/// Scan to the closing `*/`. Block comments do not nest.
fn block_comment(lex: &mut Lexer<TokenKind>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => false,
    }
}

/// Scan the rest of a raw string (`"""..."""`, `$"""..."""`,
/// `$$"""..."""`). The closing run must be exactly as long as the
/// opening one.
fn raw_string(lex: &mut Lexer<TokenKind>) -> bool {
    let opening = lex.slice().trim_start_matches('$').len();
    let extra = lex.remainder().bytes().take_while(|&b| b == b'"').count();
    lex.bump(extra);
    match raw_string_len(lex.remainder(), opening + extra) {
        Some(len) => {
            lex.bump(len);
            true
        }
        None => false,
    }
}

fn raw_string_len(rest: &str, quotes: usize) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'"' {
            i += 1;
            continue;
        }
        let run = bytes[i..].iter().take_while(|&&b| b == b'"').count();
        if run == quotes {
            return Some(i + run);
        }
        if run > quotes {
            return None;
        }
        i += run;
    }
    None
}

/// Scan the rest of `$"...{hole}..."`.
fn interpolated(lex: &mut Lexer<TokenKind>) -> bool {
    scan_interpolated(lex, false)
}

/// Scan the rest of `$@"..."` or `@$"..."`.
fn verbatim_interpolated(lex: &mut Lexer<TokenKind>) -> bool {
    scan_interpolated(lex, true)
}

fn scan_interpolated(lex: &mut Lexer<TokenKind>, verbatim: bool) -> bool {
    match interpolated_len(lex.remainder(), verbatim) {
        Some(len) => {
            lex.bump(len);
            true
        }
        None => false,
    }
}

/// Length of the remaining string body up to and including the closing
/// quote. Holes may contain nested strings and braces.
fn interpolated_len(rest: &str, verbatim: bool) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if depth == 0 && !verbatim => i += 2,
            b'"' if depth == 0 => {
                if verbatim && bytes.get(i + 1) == Some(&b'"') {
                    i += 2;
                } else {
                    return Some(i + 1);
                }
            }
            b'{' if depth == 0 && bytes.get(i + 1) == Some(&b'{') => i += 2,
            b'}' if depth == 0 && bytes.get(i + 1) == Some(&b'}') => i += 2,
            b'\n' if depth == 0 && !verbatim => return None,
            b'{' => {
                depth += 1;
                i += 1;
            }
            b'}' => {
                depth = depth.saturating_sub(1);
                i += 1;
            }
            b'"' => {
                // A plain string inside a hole
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}

impl TokenKind {
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Using
                | TokenKind::Namespace
                | TokenKind::Class
                | TokenKind::Struct
                | TokenKind::Interface
                | TokenKind::Enum
                | TokenKind::Delegate
                | TokenKind::Event
                | TokenKind::Operator
                | TokenKind::Implicit
                | TokenKind::Explicit
                | TokenKind::This
                | TokenKind::Base
                | TokenKind::New
                | TokenKind::Ref
                | TokenKind::Out
                | TokenKind::In
                | TokenKind::Params
                | TokenKind::Return
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Foreach
                | TokenKind::Do
                | TokenKind::Switch
                | TokenKind::Case
                | TokenKind::Default
                | TokenKind::Try
                | TokenKind::Catch
                | TokenKind::Finally
                | TokenKind::Throw
                | TokenKind::Lock
                | TokenKind::Fixed
                | TokenKind::Typeof
                | TokenKind::Sizeof
                | TokenKind::Checked
                | TokenKind::Unchecked
                | TokenKind::Is
                | TokenKind::As
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        )
    }

    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            TokenKind::LineComment | TokenKind::BlockComment | TokenKind::Directive
        )
    }

    /// How the token is stored in the tree
    pub fn lexeme_kind(&self) -> LexemeKind {
        match self {
            TokenKind::LineComment => LexemeKind::LineComment,
            TokenKind::BlockComment => LexemeKind::BlockComment,
            TokenKind::Directive => LexemeKind::Directive,
            TokenKind::Ident => LexemeKind::Ident,
            TokenKind::Int | TokenKind::Float | TokenKind::String | TokenKind::Char => {
                LexemeKind::Literal
            }
            kind if kind.is_keyword() => LexemeKind::Keyword,
            _ => LexemeKind::Punct,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::LineComment | TokenKind::BlockComment => "comment",
            TokenKind::Directive => "preprocessor directive",
            TokenKind::Using => "'using'",
            TokenKind::Namespace => "'namespace'",
            TokenKind::Class => "'class'",
            TokenKind::Struct => "'struct'",
            TokenKind::Interface => "'interface'",
            TokenKind::Enum => "'enum'",
            TokenKind::Delegate => "'delegate'",
            TokenKind::Event => "'event'",
            TokenKind::Operator => "'operator'",
            TokenKind::Implicit => "'implicit'",
            TokenKind::Explicit => "'explicit'",
            TokenKind::This => "'this'",
            TokenKind::Base => "'base'",
            TokenKind::New => "'new'",
            TokenKind::Ref => "'ref'",
            TokenKind::Out => "'out'",
            TokenKind::In => "'in'",
            TokenKind::Params => "'params'",
            TokenKind::Return => "'return'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::While => "'while'",
            TokenKind::For => "'for'",
            TokenKind::Foreach => "'foreach'",
            TokenKind::Do => "'do'",
            TokenKind::Switch => "'switch'",
            TokenKind::Case => "'case'",
            TokenKind::Default => "'default'",
            TokenKind::Try => "'try'",
            TokenKind::Catch => "'catch'",
            TokenKind::Finally => "'finally'",
            TokenKind::Throw => "'throw'",
            TokenKind::Lock => "'lock'",
            TokenKind::Fixed => "'fixed'",
            TokenKind::Typeof => "'typeof'",
            TokenKind::Sizeof => "'sizeof'",
            TokenKind::Checked => "'checked'",
            TokenKind::Unchecked => "'unchecked'",
            TokenKind::Is => "'is'",
            TokenKind::As => "'as'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Null => "'null'",
            TokenKind::Eq => "'='",
            TokenKind::EqEq => "'=='",
            TokenKind::Ne => "'!='",
            TokenKind::FatArrow => "'=>'",
            TokenKind::Lt => "'<'",
            TokenKind::Le => "'<='",
            TokenKind::Shl => "'<<'",
            TokenKind::ShlEq => "'<<='",
            TokenKind::Gt => "'>'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Amp => "'&'",
            TokenKind::Pipe => "'|'",
            TokenKind::Caret => "'^'",
            TokenKind::Bang => "'!'",
            TokenKind::Tilde => "'~'",
            TokenKind::PlusPlus => "'++'",
            TokenKind::MinusMinus => "'--'",
            TokenKind::PlusEq => "'+='",
            TokenKind::MinusEq => "'-='",
            TokenKind::StarEq => "'*='",
            TokenKind::SlashEq => "'/='",
            TokenKind::PercentEq => "'%='",
            TokenKind::AmpEq => "'&='",
            TokenKind::PipeEq => "'|='",
            TokenKind::CaretEq => "'^='",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::QuestionQuestion => "'??'",
            TokenKind::QuestionQuestionEq => "'??='",
            TokenKind::QuestionDot => "'?.'",
            TokenKind::Arrow => "'->'",
            TokenKind::ColonColon => "'::'",
            TokenKind::DotDot => "'..'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::Dot => "'.'",
            TokenKind::Question => "'?'",
            TokenKind::Int => "integer",
            TokenKind::Float => "float",
            TokenKind::String => "string",
            TokenKind::Char => "character",
            TokenKind::Ident => "identifier",
            TokenKind::Error => "invalid token",
            TokenKind::Eof => "end of file",
        }
    }
}

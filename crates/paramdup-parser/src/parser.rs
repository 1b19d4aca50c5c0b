//! Recursive descent parser implementation
//!
//! Declarations are parsed structurally down to method parameters. Method
//! bodies and every member that is not a method are kept as lines and
//! nested blocks. Member kinds are recognized by shape: a member is a method
//! when it reads as `modifiers type name<...>(params)` followed by a body,
//! otherwise the parser rewinds and keeps it as an opaque member.

use std::sync::Arc;

use paramdup_ast::*;
use paramdup_lexer::{Token, TokenKind};

use crate::ParseError;

/// Words that may precede a member's type or keyword
const MODIFIERS: &[&str] = &[
    "public", "private", "protected", "internal", "static", "abstract", "virtual", "override",
    "sealed", "extern", "unsafe", "readonly", "partial", "async", "file", "required",
    "volatile", "const", "new", "ref",
];

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let end = source.len();
            tokens.push(Token {
                kind: TokenKind::Eof,
                span: Span::new(end, end),
                glued: false,
            });
        }
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    // === Utilities ===

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn peek_ahead(&self, n: usize) -> TokenKind {
        self.kind_at(self.pos + n)
    }

    fn kind_at(&self, index: usize) -> TokenKind {
        self.tokens
            .get(index)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn text_at(&self, index: usize) -> &'a str {
        self.tokens
            .get(index)
            .map(|t| t.text(self.source))
            .unwrap_or("")
    }

    fn advance(&mut self) -> Token {
        let token = *self.current();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.peek())
    }

    fn at_word(&self, word: &str) -> bool {
        self.at(TokenKind::Ident) && self.text() == word
    }

    fn consume(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::unexpected(
                kind.describe(),
                self.peek(),
                self.current().span,
            ))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        let token = self.consume(TokenKind::Ident)?;
        Ok(token.text(self.source).to_string())
    }

    fn text(&self) -> &'a str {
        self.current().text(self.source)
    }

    fn span(&self) -> Span {
        self.current().span
    }

    fn prev_end(&self) -> usize {
        match self.pos.checked_sub(1) {
            Some(prev) => self.tokens[prev].span.end,
            None => 0,
        }
    }

    fn bump_lexeme(&mut self) -> Lexeme {
        let lexeme = self.current().lexeme(self.source);
        self.advance();
        lexeme
    }

    // === Compilation unit ===

    pub fn parse_unit(&mut self) -> Result<CompilationUnit, ParseError> {
        if let Some(token) = self.tokens.iter().find(|t| t.kind == TokenKind::Error) {
            return Err(ParseError::InvalidToken {
                text: token.text(self.source).to_string(),
                span: token.span,
            });
        }

        let (items, trailing) = self.parse_items(TokenKind::Eof)?;
        Ok(CompilationUnit {
            items,
            trailing,
            span: Span::new(0, self.source.len()),
        })
    }

    /// Parse items up to `end` (not consumed). Trivia before `end` is
    /// returned separately as the container's trailing trivia.
    fn parse_items(&mut self, end: TokenKind) -> Result<(Vec<Arc<Item>>, Vec<Trivia>), ParseError> {
        let mut items = Vec::new();
        loop {
            let leading = self.parse_trivia();
            if self.at(end) {
                return Ok((items, leading));
            }
            match self.peek() {
                TokenKind::Eof => return Err(ParseError::UnexpectedEof { span: self.span() }),
                TokenKind::RBrace => {
                    return Err(ParseError::UnbalancedDelimiter {
                        delimiter: "}".to_string(),
                        span: self.span(),
                    })
                }
                _ => {}
            }
            items.push(Arc::new(self.parse_item(leading)?));
        }
    }

    fn parse_trivia(&mut self) -> Vec<Trivia> {
        let mut trivia = Vec::new();
        while self.peek().is_trivia() {
            let kind = self.peek();
            let text = self.bump_lexeme().text;
            trivia.push(match kind {
                TokenKind::LineComment => Trivia::LineComment(text),
                TokenKind::BlockComment => Trivia::BlockComment(text),
                _ => Trivia::Directive(text),
            });
        }
        trivia
    }

    // === Items ===

    fn parse_item(&mut self, leading: Vec<Trivia>) -> Result<Item, ParseError> {
        let start = self.span();

        if self.at_global_attribute() {
            let line = self.parse_balanced()?;
            let other = OtherDecl {
                statements: vec![Stmt::Line(line)],
            };
            return Ok(self.finish_item(start, leading, vec![], ItemKind::Other(other)));
        }

        let mut attributes = Vec::new();
        while self.at(TokenKind::LBracket) {
            attributes.push(AttributeList {
                lexemes: self.parse_balanced()?,
            });
        }

        let keyword = self.skip_modifiers(self.pos);
        let kind = match self.kind_at(keyword) {
            TokenKind::Namespace => ItemKind::Namespace(self.parse_namespace()?),
            TokenKind::Class | TokenKind::Struct | TokenKind::Interface => {
                ItemKind::Type(self.parse_type_decl()?)
            }
            TokenKind::Ident
                if self.text_at(keyword) == "record"
                    && matches!(
                        self.kind_at(keyword + 1),
                        TokenKind::Ident | TokenKind::Class | TokenKind::Struct
                    ) =>
            {
                ItemKind::Type(self.parse_type_decl()?)
            }
            _ => match self.try_parse_method() {
                Some(method) => ItemKind::Method(method),
                None => ItemKind::Other(self.parse_other()?),
            },
        };

        Ok(self.finish_item(start, leading, attributes, kind))
    }

    fn finish_item(
        &self,
        start: Span,
        leading: Vec<Trivia>,
        attributes: Vec<AttributeList>,
        kind: ItemKind,
    ) -> Item {
        let mut item = Item::new(kind);
        item.leading = leading;
        item.attributes = attributes;
        item.span = Span::new(start.start, self.prev_end());
        item
    }

    /// `[assembly: ...]` and `[module: ...]` stand alone
    fn at_global_attribute(&self) -> bool {
        self.at(TokenKind::LBracket)
            && self.peek_ahead(1) == TokenKind::Ident
            && matches!(self.text_at(self.pos + 1), "assembly" | "module")
            && self.peek_ahead(2) == TokenKind::Colon
    }

    fn is_modifier_at(&self, index: usize) -> bool {
        let word = match self.kind_at(index) {
            TokenKind::Ident | TokenKind::New | TokenKind::Ref => self.text_at(index),
            _ => return false,
        };
        MODIFIERS.contains(&word)
            && matches!(
                self.kind_at(index + 1),
                TokenKind::Ident
                    | TokenKind::Ref
                    | TokenKind::New
                    | TokenKind::LParen
                    | TokenKind::Class
                    | TokenKind::Struct
                    | TokenKind::Interface
                    | TokenKind::Enum
                    | TokenKind::Delegate
                    | TokenKind::Event
                    | TokenKind::Implicit
                    | TokenKind::Explicit
            )
    }

    /// Index of the first token after the modifiers starting at `index`
    fn skip_modifiers(&self, mut index: usize) -> usize {
        while self.is_modifier_at(index) {
            index += 1;
        }
        index
    }

    fn parse_namespace(&mut self) -> Result<NamespaceDecl, ParseError> {
        self.consume(TokenKind::Namespace)?;
        let mut name = self.expect_ident()?;
        while self.at(TokenKind::Dot) {
            self.advance();
            name.push('.');
            name.push_str(&self.expect_ident()?);
        }

        if self.at(TokenKind::Semicolon) {
            self.advance();
            let (items, trailing) = self.parse_items(TokenKind::Eof)?;
            return Ok(NamespaceDecl {
                name,
                file_scoped: true,
                items,
                trailing,
            });
        }

        self.consume(TokenKind::LBrace)?;
        let (items, trailing) = self.parse_items(TokenKind::RBrace)?;
        self.consume(TokenKind::RBrace)?;
        Ok(NamespaceDecl {
            name,
            file_scoped: false,
            items,
            trailing,
        })
    }

    fn parse_type_decl(&mut self) -> Result<TypeDecl, ParseError> {
        let header = self.collect_until(|kind| matches!(kind, TokenKind::LBrace | TokenKind::Semicolon))?;

        if self.at(TokenKind::Semicolon) {
            self.advance();
            return Ok(TypeDecl {
                header,
                members: vec![],
                trailing: vec![],
                has_body: false,
                semicolon: true,
            });
        }

        self.consume(TokenKind::LBrace)?;
        let (members, trailing) = self.parse_items(TokenKind::RBrace)?;
        self.consume(TokenKind::RBrace)?;
        let semicolon = self.at(TokenKind::Semicolon);
        if semicolon {
            self.advance();
        }

        Ok(TypeDecl {
            header,
            members,
            trailing,
            has_body: true,
            semicolon,
        })
    }

    // === Methods ===

    /// Parse a method declaration, or rewind and return `None` when the
    /// member does not have the shape of one.
    fn try_parse_method(&mut self) -> Option<MethodDecl> {
        let checkpoint = self.pos;
        match self.parse_method() {
            Ok(method) => Some(method),
            Err(_) => {
                self.pos = checkpoint;
                None
            }
        }
    }

    fn parse_method(&mut self) -> Result<MethodDecl, ParseError> {
        let mut modifiers = Vec::new();
        while self.is_modifier_at(self.pos) {
            modifiers.push(self.text().to_string());
            self.advance();
        }

        let return_type = self.parse_type()?;

        // Explicit interface implementations: `void IDisposable.Dispose()`
        let mut name = self.expect_ident()?;
        while self.at(TokenKind::Dot) && self.peek_ahead(1) == TokenKind::Ident {
            self.advance();
            name.push('.');
            name.push_str(&self.expect_ident()?);
        }

        let type_params = if self.at(TokenKind::Lt) {
            self.parse_type_params()?
        } else {
            vec![]
        };

        self.consume(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                params.push(Arc::new(self.parse_parameter()?));
                if self.at(TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.consume(TokenKind::RParen)?;

        let constraints = if self.at_word("where") {
            self.collect_until(|kind| {
                matches!(kind, TokenKind::LBrace | TokenKind::FatArrow | TokenKind::Semicolon)
            })?
        } else {
            vec![]
        };

        let body = match self.peek() {
            TokenKind::LBrace => MethodBody::Block(self.parse_block()?),
            TokenKind::FatArrow => {
                self.advance();
                let expr = self.collect_until(|kind| kind == TokenKind::Semicolon)?;
                self.consume(TokenKind::Semicolon)?;
                MethodBody::Expression(expr)
            }
            TokenKind::Semicolon => {
                self.advance();
                MethodBody::None
            }
            other => return Err(ParseError::unexpected("method body", other, self.span())),
        };

        Ok(MethodDecl {
            modifiers,
            return_type,
            name,
            type_params,
            params,
            constraints,
            body,
        })
    }

    /// Lexemes between `<` and the matching `>`
    fn parse_type_params(&mut self) -> Result<Vec<Lexeme>, ParseError> {
        self.consume(TokenKind::Lt)?;
        let mut lexemes = Vec::new();
        let mut depth = 1usize;
        loop {
            match self.peek() {
                TokenKind::Lt => depth += 1,
                TokenKind::Gt => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return Ok(lexemes);
                    }
                }
                TokenKind::LBrace | TokenKind::Semicolon | TokenKind::Eof => {
                    return Err(ParseError::unexpected("'>'", self.peek(), self.span()));
                }
                _ => {}
            }
            lexemes.push(self.bump_lexeme());
        }
    }

    fn parse_parameter(&mut self) -> Result<Parameter, ParseError> {
        let start = self.span();

        let mut attributes = Vec::new();
        while self.at(TokenKind::LBracket) {
            attributes.push(AttributeList {
                lexemes: self.parse_balanced()?,
            });
        }

        let mut modifiers = Vec::new();
        loop {
            let modifier = match self.peek() {
                TokenKind::Ref
                | TokenKind::Out
                | TokenKind::In
                | TokenKind::Params
                | TokenKind::This => ParamModifier::from_keyword(self.text()),
                // `scoped` and `readonly` are contextual
                TokenKind::Ident
                    if matches!(
                        self.peek_ahead(1),
                        TokenKind::Ident | TokenKind::Ref | TokenKind::In | TokenKind::Out | TokenKind::LParen
                    ) =>
                {
                    ParamModifier::from_keyword(self.text())
                }
                _ => None,
            };
            match modifier {
                Some(modifier) => {
                    modifiers.push(modifier);
                    self.advance();
                }
                None => break,
            }
        }

        let ty = self.parse_type()?;
        let name = self.expect_ident()?;

        let default = if self.at(TokenKind::Eq) {
            self.advance();
            let value = self.collect_until(|kind| kind == TokenKind::Comma)?;
            if value.is_empty() {
                return Err(ParseError::unexpected("default value", self.peek(), self.span()));
            }
            Some(value)
        } else {
            None
        };

        Ok(Parameter {
            id: NodeId::DETACHED,
            attributes,
            modifiers,
            ty,
            name,
            default,
            span: Span::new(start.start, self.prev_end()),
        })
    }

    // === Types ===

    fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        let mut ty = match self.peek() {
            TokenKind::LParen => self.parse_tuple_type()?,
            TokenKind::Ident => TypeExpr::Named(self.parse_type_name()?),
            _ => return Err(ParseError::ExpectedType { span: self.span() }),
        };

        loop {
            match self.peek() {
                TokenKind::Question => {
                    self.advance();
                    ty = ty.nullable();
                }
                TokenKind::Star => {
                    self.advance();
                    ty = TypeExpr::Pointer(Box::new(ty));
                }
                TokenKind::LBracket if self.at_rank_specifier() => {
                    self.advance();
                    let mut rank = 1;
                    while self.at(TokenKind::Comma) {
                        self.advance();
                        rank += 1;
                    }
                    self.consume(TokenKind::RBracket)?;
                    ty = ty.array(rank);
                }
                _ => return Ok(ty),
            }
        }
    }

    /// `[]` or `[,,]`
    fn at_rank_specifier(&self) -> bool {
        let mut index = self.pos + 1;
        while self.kind_at(index) == TokenKind::Comma {
            index += 1;
        }
        self.kind_at(index) == TokenKind::RBracket
    }

    fn parse_type_name(&mut self) -> Result<TypeName, ParseError> {
        let mut segments = vec![self.parse_name_segment(false)?];
        loop {
            let alias_qualified = match self.peek() {
                TokenKind::Dot => false,
                TokenKind::ColonColon => true,
                _ => break,
            };
            if self.peek_ahead(1) != TokenKind::Ident {
                break;
            }
            self.advance();
            segments.push(self.parse_name_segment(alias_qualified)?);
        }
        Ok(TypeName { segments })
    }

    fn parse_name_segment(&mut self, alias_qualified: bool) -> Result<NameSegment, ParseError> {
        let name = self.expect_ident()?;
        let mut args = Vec::new();
        if self.at(TokenKind::Lt) {
            self.advance();
            loop {
                args.push(self.parse_type()?);
                if self.at(TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
            self.consume(TokenKind::Gt)?;
        }
        Ok(NameSegment {
            name,
            args,
            alias_qualified,
        })
    }

    fn parse_tuple_type(&mut self) -> Result<TypeExpr, ParseError> {
        let start = self.span();
        self.consume(TokenKind::LParen)?;
        let mut elements = Vec::new();
        loop {
            let ty = self.parse_type()?;
            let name = if self.at(TokenKind::Ident) {
                Some(self.expect_ident()?)
            } else {
                None
            };
            elements.push(TupleElement { ty, name });
            if self.at(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.consume(TokenKind::RParen)?;

        if elements.len() < 2 {
            return Err(ParseError::ExpectedType { span: start });
        }
        Ok(TypeExpr::Tuple(elements))
    }

    // === Opaque members and bodies ===

    /// A member kept as lines and blocks. It ends after a line terminated
    /// by `;`, or after a block not followed by `;` or `=`.
    fn parse_other(&mut self) -> Result<OtherDecl, ParseError> {
        let mut statements = Vec::new();
        loop {
            match self.peek() {
                TokenKind::RBrace | TokenKind::Eof => {
                    if statements.is_empty() {
                        return Err(ParseError::ExpectedDeclaration { span: self.span() });
                    }
                    return Ok(OtherDecl { statements });
                }
                TokenKind::LBrace => {
                    statements.push(Stmt::Block(self.parse_block()?));
                    if !self.at_any(&[TokenKind::Semicolon, TokenKind::Eq]) {
                        return Ok(OtherDecl { statements });
                    }
                }
                _ => {
                    let line = self.parse_line();
                    let terminated = line
                        .last()
                        .is_some_and(|l| l.kind == LexemeKind::Punct && l.is(";"));
                    statements.push(Stmt::Line(line));
                    if terminated {
                        return Ok(OtherDecl { statements });
                    }
                }
            }
        }
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let start = self.span();
        self.consume(TokenKind::LBrace)?;

        let mut statements = Vec::new();
        loop {
            match self.peek() {
                TokenKind::RBrace | TokenKind::Eof => break,
                TokenKind::LBrace => statements.push(Stmt::Block(self.parse_block()?)),
                _ => statements.push(Stmt::Line(self.parse_line())),
            }
        }

        self.consume(TokenKind::RBrace)?;
        Ok(Block {
            statements,
            span: Span::new(start.start, self.prev_end()),
        })
    }

    /// One statement line. It ends after `;` outside parentheses, or before
    /// a brace. A comment or directive at the start of a line stands alone.
    fn parse_line(&mut self) -> Vec<Lexeme> {
        if self.peek().is_trivia() {
            return vec![self.bump_lexeme()];
        }

        let mut lexemes = Vec::new();
        let mut depth = 0i32;
        loop {
            match self.peek() {
                TokenKind::LBrace | TokenKind::RBrace | TokenKind::Eof => return lexemes,
                TokenKind::Semicolon if depth <= 0 => {
                    lexemes.push(self.bump_lexeme());
                    return lexemes;
                }
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth -= 1,
                _ => {}
            }
            lexemes.push(self.bump_lexeme());
        }
    }

    // === Delimited runs ===

    /// A bracketed run such as an attribute section, delimiters included
    fn parse_balanced(&mut self) -> Result<Vec<Lexeme>, ParseError> {
        let mut lexemes = Vec::new();
        let mut open = Vec::new();
        loop {
            self.track_delimiter(&mut open)?;
            lexemes.push(self.bump_lexeme());
            if open.is_empty() {
                return Ok(lexemes);
            }
        }
    }

    /// Lexemes up to a token accepted by `stop` (not consumed) outside any
    /// nested delimiters, or up to a closing delimiter that was not opened
    /// here.
    fn collect_until(&mut self, stop: impl Fn(TokenKind) -> bool) -> Result<Vec<Lexeme>, ParseError> {
        let mut lexemes = Vec::new();
        let mut open = Vec::new();
        loop {
            let kind = self.peek();
            if open.is_empty() && (stop(kind) || closing_of(kind).is_some()) {
                return Ok(lexemes);
            }
            self.track_delimiter(&mut open)?;
            lexemes.push(self.bump_lexeme());
        }
    }

    fn track_delimiter(&self, open: &mut Vec<TokenKind>) -> Result<(), ParseError> {
        let kind = self.peek();
        match kind {
            TokenKind::Eof => Err(ParseError::UnexpectedEof { span: self.span() }),
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                open.push(kind);
                Ok(())
            }
            _ => match closing_of(kind) {
                Some(opener) if open.last() == Some(&opener) => {
                    open.pop();
                    Ok(())
                }
                Some(_) => Err(ParseError::UnbalancedDelimiter {
                    delimiter: self.text().to_string(),
                    span: self.span(),
                }),
                None => Ok(()),
            },
        }
    }
}

/// The opening delimiter matched by a closing one
fn closing_of(kind: TokenKind) -> Option<TokenKind> {
    match kind {
        TokenKind::RParen => Some(TokenKind::LParen),
        TokenKind::RBracket => Some(TokenKind::LBracket),
        TokenKind::RBrace => Some(TokenKind::LBrace),
        _ => None,
    }
}

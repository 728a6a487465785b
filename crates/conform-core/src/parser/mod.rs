//! Declaration parser - tokenizer, AST types, and recursive descent parser
//!
//! Converts declaration text into a [`ModuleNode`]. The grammar:
//!
//! ```text
//! module      := declaration* EOF
//! declaration := attachment* ("contract" | "type") NAME (":" NAME ("," NAME)*)? "{" member* "}"
//! attachment  := "@" "implements" "(" NAME ("," NAME)* ")"
//! member      := modifiers "fn" NAME function ";"
//!              | "prop" NAME "{" (modifiers ("get" | "set" | "del") function ";")* "}"
//!              | "attr" NAME (":" type)? ("=" literal)? ";"
//! function    := params ("->" type)? ("wraps" modifiers "fn" function)?
//! modifiers   := ("static" | "class")? "async"? "gen"?
//! params      := "(" (param ("," param)*)? ","? ")"
//! param       := "**" NAME (":" type)? | "*" (NAME (":" type)?)? | NAME (":" type)? ("=" literal)?
//! ```

pub mod ast;
pub mod tokenizer;

use serde_json::Value;

use crate::model::{AccessorDecl, AttributeDecl, Binding, Flavor, FunctionDecl, MemberBody};
use crate::signature::{ParameterSpec, TypeTag};
use crate::{Error, Result};

use ast::{DeclarationKind, DeclarationNode, MemberNode, ModuleNode, SpannedValue};
use tokenizer::{Span, SpannedToken, Token, Tokenizer};

/// Deepest allowed nesting of list literals, type arguments and `wraps` chains
pub const MAX_NESTING: usize = 64;

/// Parse declaration text into a module AST
///
/// # Errors
/// Returns `ParseError` with line:column for the first syntax violation.
pub fn parse(input: &str) -> Result<ModuleNode> {
    let tokens = Tokenizer::new(input).tokenize()?;
    Parser::new(tokens).parse_module()
}

struct Parser {
    tokens: Vec<SpannedToken>,
    position: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<SpannedToken>) -> Self {
        Parser {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    // ── Token helpers ──────────────────────────────────────

    fn peek(&self) -> &Token {
        &self.tokens[self.position].token
    }

    fn span(&self) -> Span {
        self.tokens[self.position].span.clone()
    }

    /// Consume the current token; the trailing `Eof` is never consumed
    fn advance(&mut self) -> SpannedToken {
        let token = self.tokens[self.position].clone();
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    fn check(&self, token: &Token) -> bool {
        self.peek() == token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, context: &str) -> Result<Span> {
        if self.check(token) {
            Ok(self.advance().span)
        } else {
            Err(self.error(&format!("expected {} {}", token, context)))
        }
    }

    fn error(&self, expected: &str) -> Error {
        Error::ParseError(format!("{}, found {} at {}", expected, self.peek(), self.span()))
    }

    /// Run `parse` one nesting level deeper, failing past [`MAX_NESTING`]
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING {
            return Err(Error::ParseError(format!("nesting too deep at {}", self.span())));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Identifier, or a keyword used as a name (`type`, `class`, ...)
    fn expect_name(&mut self, what: &str) -> Result<SpannedValue<String>> {
        let span = self.span();
        let text = match self.peek() {
            Token::Identifier(name) => name.clone(),
            other => match other.keyword_text() {
                Some(keyword) => keyword.to_string(),
                None => return Err(self.error(&format!("expected {}", what))),
            },
        };
        self.advance();
        Ok(SpannedValue::new(text, span))
    }

    // ── Declarations ───────────────────────────────────────

    fn parse_module(&mut self) -> Result<ModuleNode> {
        let mut declarations = Vec::new();
        while !self.check(&Token::Eof) {
            declarations.push(self.parse_declaration()?);
        }
        Ok(ModuleNode { declarations })
    }

    fn parse_declaration(&mut self) -> Result<DeclarationNode> {
        let span = self.span();
        let implements = self.parse_attachments()?;

        let kind = match self.peek() {
            Token::Contract => DeclarationKind::Contract,
            Token::Type => DeclarationKind::Type,
            _ => return Err(self.error("expected 'contract' or 'type'")),
        };
        self.advance();

        let name = self.expect_name("declaration name")?;
        if kind == DeclarationKind::Contract && !implements.is_empty() {
            return Err(Error::ParseError(format!(
                "@implements cannot be applied to contract '{}' at {}",
                name.value, name.span
            )));
        }

        let mut bases = Vec::new();
        if self.eat(&Token::Colon) {
            loop {
                bases.push(self.expect_name("base name")?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }

        self.expect(&Token::LBrace, "to open declaration body")?;
        let mut members = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.check(&Token::Eof) {
                return Err(self.error(&format!("expected '}}' to close '{}'", name.value)));
            }
            members.push(self.parse_member()?);
        }
        self.advance();

        Ok(DeclarationNode {
            kind,
            name,
            bases,
            implements,
            members,
            span,
        })
    }

    fn parse_attachments(&mut self) -> Result<Vec<SpannedValue<String>>> {
        let mut contracts = Vec::new();
        while self.eat(&Token::At) {
            let decorator = self.expect_name("decorator name")?;
            if decorator.value != "implements" {
                return Err(Error::ParseError(format!(
                    "unknown decorator '@{}' at {}",
                    decorator.value, decorator.span
                )));
            }
            self.expect(&Token::LParen, "after '@implements'")?;
            while !self.check(&Token::RParen) {
                contracts.push(self.expect_name("contract name")?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(&Token::RParen, "to close '@implements('")?;
        }
        Ok(contracts)
    }

    // ── Members ────────────────────────────────────────────

    fn parse_member(&mut self) -> Result<MemberNode> {
        let span = self.span();
        match self.peek() {
            Token::Prop => self.parse_accessor(span),
            Token::Attr => self.parse_attribute(span),
            _ => self.parse_function_member(span),
        }
    }

    fn parse_modifiers(&mut self) -> (Binding, Flavor) {
        let binding = if self.eat(&Token::Static) {
            Binding::Static
        } else if self.eat(&Token::Class) {
            Binding::Class
        } else {
            Binding::Instance
        };
        let is_async = self.eat(&Token::Async);
        let is_gen = self.eat(&Token::Gen);
        let flavor = match (is_async, is_gen) {
            (true, true) => Flavor::AsyncGenerator,
            (false, true) => Flavor::Generator,
            (true, false) => Flavor::Coroutine,
            (false, false) => Flavor::Sync,
        };
        (binding, flavor)
    }

    fn parse_function_member(&mut self, span: Span) -> Result<MemberNode> {
        let (binding, flavor) = self.parse_modifiers();
        self.expect(&Token::Fn, "to start a method")?;
        let name = self.expect_name("method name")?;
        let function = self.parse_function(binding, flavor)?;
        self.expect(&Token::Semicolon, "after method declaration")?;
        Ok(MemberNode {
            name,
            body: MemberBody::Function(function),
            span,
        })
    }

    /// Parameters, return annotation and an optional `wraps` chain
    fn parse_function(&mut self, binding: Binding, flavor: Flavor) -> Result<FunctionDecl> {
        let params = self.parse_params()?;
        let returns = if self.eat(&Token::Arrow) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let mut function = FunctionDecl {
            binding,
            flavor,
            params,
            returns,
            wraps: None,
        };
        if self.eat(&Token::Wraps) {
            let (inner_binding, inner_flavor) = self.parse_modifiers();
            self.expect(&Token::Fn, "after 'wraps'")?;
            let inner = self.nested(|p| p.parse_function(inner_binding, inner_flavor))?;
            function.wraps = Some(Box::new(inner));
        }
        Ok(function)
    }

    fn parse_accessor(&mut self, span: Span) -> Result<MemberNode> {
        self.advance(); // prop
        let name = self.expect_name("accessor name")?;
        self.expect(&Token::LBrace, "to open accessor body")?;

        let mut accessor = AccessorDecl::default();
        while !self.check(&Token::RBrace) {
            let (binding, flavor) = self.parse_modifiers();
            let part = self.expect_name("'get', 'set' or 'del'")?;
            let function = self.parse_function(binding, flavor)?;
            self.expect(&Token::Semicolon, "after accessor function")?;

            let slot = match part.value.as_str() {
                "get" => &mut accessor.getter,
                "set" => &mut accessor.setter,
                "del" => &mut accessor.deleter,
                other => {
                    return Err(Error::ParseError(format!(
                        "expected 'get', 'set' or 'del', found '{}' at {}",
                        other, part.span
                    )));
                }
            };
            if slot.is_some() {
                return Err(Error::ParseError(format!(
                    "accessor '{}' defines '{}' twice at {}",
                    name.value, part.value, part.span
                )));
            }
            *slot = Some(function);
        }
        self.advance(); // }

        Ok(MemberNode {
            name,
            body: MemberBody::Accessor(accessor),
            span,
        })
    }

    fn parse_attribute(&mut self, span: Span) -> Result<MemberNode> {
        self.advance(); // attr
        let name = self.expect_name("attribute name")?;
        let annotation = if self.eat(&Token::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let value = if self.eat(&Token::Equals) {
            Some(self.parse_literal()?)
        } else {
            None
        };
        self.expect(&Token::Semicolon, "after attribute declaration")?;

        Ok(MemberNode {
            name,
            body: MemberBody::Attribute(AttributeDecl { annotation, value }),
            span,
        })
    }

    // ── Parameters ─────────────────────────────────────────

    fn parse_params(&mut self) -> Result<Vec<ParameterSpec>> {
        self.expect(&Token::LParen, "to open parameter list")?;

        let mut params = Vec::new();
        let mut keyword_only = false;
        let mut bare_star: Option<Span> = None;

        while !self.check(&Token::RParen) {
            if self.eat(&Token::DoubleStar) {
                let name = self.expect_name("parameter name")?;
                let mut param = ParameterSpec::var_keyword(name.value);
                param.annotation = self.parse_optional_annotation()?;
                params.push(param);
            } else if self.check(&Token::Star) {
                let star = self.advance().span;
                keyword_only = true;
                if self.check(&Token::Comma) || self.check(&Token::RParen) {
                    bare_star = Some(star);
                } else {
                    let name = self.expect_name("parameter name")?;
                    let mut param = ParameterSpec::var_positional(name.value);
                    param.annotation = self.parse_optional_annotation()?;
                    params.push(param);
                }
            } else {
                let name = self.expect_name("parameter name")?;
                let mut param = if keyword_only {
                    bare_star = None;
                    ParameterSpec::keyword_only(name.value)
                } else {
                    ParameterSpec::positional(name.value)
                };
                param.annotation = self.parse_optional_annotation()?;
                if self.eat(&Token::Equals) {
                    param.default = Some(self.parse_literal()?);
                }
                params.push(param);
            }

            if !self.eat(&Token::Comma) {
                break;
            }
        }

        if let Some(star) = bare_star {
            return Err(Error::ParseError(format!(
                "named parameters must follow bare '*' at {}",
                star
            )));
        }
        self.expect(&Token::RParen, "to close parameter list")?;
        Ok(params)
    }

    fn parse_optional_annotation(&mut self) -> Result<Option<TypeTag>> {
        if self.eat(&Token::Colon) {
            Ok(Some(self.parse_type()?))
        } else {
            Ok(None)
        }
    }

    // ── Types ──────────────────────────────────────────────

    fn parse_type(&mut self) -> Result<TypeTag> {
        let text = self.parse_type_text()?;
        Ok(TypeTag::new(&text))
    }

    /// `atom ("|" atom)*`
    fn parse_type_text(&mut self) -> Result<String> {
        let mut text = self.parse_type_atom()?;
        while self.eat(&Token::Pipe) {
            text.push('|');
            text.push_str(&self.parse_type_atom()?);
        }
        Ok(text)
    }

    fn parse_type_atom(&mut self) -> Result<String> {
        if self.check(&Token::LBracket) {
            return self.parse_type_args();
        }

        let mut text = match self.peek().clone() {
            Token::NoneLiteral => {
                self.advance();
                "None".to_string()
            }
            Token::StringLiteral(s) => {
                self.advance();
                format!("'{}'", s)
            }
            _ => self.expect_name("type name")?.value,
        };
        while self.eat(&Token::Dot) {
            text.push('.');
            text.push_str(&self.expect_name("type name")?.value);
        }
        if self.check(&Token::LBracket) {
            text.push_str(&self.parse_type_args()?);
        }
        Ok(text)
    }

    fn parse_type_args(&mut self) -> Result<String> {
        self.nested(Self::parse_type_args_inner)
    }

    fn parse_type_args_inner(&mut self) -> Result<String> {
        self.expect(&Token::LBracket, "to open type arguments")?;
        let mut args = Vec::new();
        while !self.check(&Token::RBracket) {
            args.push(self.parse_type_text()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RBracket, "to close type arguments")?;
        Ok(format!("[{}]", args.join(",")))
    }

    // ── Literals ───────────────────────────────────────────

    fn parse_literal(&mut self) -> Result<Value> {
        let value = match self.peek().clone() {
            Token::IntegerLiteral(n) => Value::from(n),
            Token::FloatLiteral(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .ok_or_else(|| self.error("expected a finite number"))?,
            Token::StringLiteral(s) => Value::String(s),
            Token::BooleanLiteral(b) => Value::Bool(b),
            Token::NoneLiteral => Value::Null,
            Token::LBracket => return self.nested(Self::parse_list_literal),
            _ => return Err(self.error("expected a literal value")),
        };
        self.advance();
        Ok(value)
    }

    fn parse_list_literal(&mut self) -> Result<Value> {
        self.expect(&Token::LBracket, "to open list literal")?;
        let mut items = Vec::new();
        while !self.check(&Token::RBracket) {
            items.push(self.parse_literal()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RBracket, "to close list literal")?;
        Ok(Value::Array(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{ParamKind, Signature};
    use serde_json::json;

    fn parse_one(input: &str) -> DeclarationNode {
        let module = parse(input).expect("test input should parse");
        assert_eq!(module.declarations.len(), 1);
        module.declarations.into_iter().next().unwrap()
    }

    fn function(decl: &DeclarationNode, index: usize) -> &FunctionDecl {
        match &decl.members[index].body {
            MemberBody::Function(f) => f,
            other => panic!("expected function, got {:?}", other),
        }
    }

    fn parse_err(input: &str) -> String {
        parse(input).unwrap_err().to_string()
    }

    // ── Declarations ──────────────────────────────────────

    #[test]
    fn test_parse_empty_module() {
        assert!(parse("").unwrap().declarations.is_empty());
        assert!(parse("// only a comment\n").unwrap().declarations.is_empty());
    }

    #[test]
    fn test_parse_contract_and_type() {
        let module = parse(
            r#"
            contract Flyable { fn fly(self); }
            type Animal { fn __init__(self, name); }
            @implements(Flyable)
            type BaldEagle: Animal { fn fly(self); }
            "#,
        )
        .unwrap();
        let decls = &module.declarations;
        assert_eq!(decls.len(), 3);
        assert_eq!(decls[0].kind, DeclarationKind::Contract);
        assert_eq!(decls[1].kind, DeclarationKind::Type);
        assert_eq!(decls[2].name.value, "BaldEagle");
        assert_eq!(decls[2].bases[0].value, "Animal");
        assert_eq!(decls[2].implements[0].value, "Flyable");
    }

    #[test]
    fn test_parse_multiple_attachments() {
        let decl = parse_one("@implements(A, B)\n@implements(C,)\ntype T {}");
        let names: Vec<&str> = decl.implements.iter().map(|n| n.value.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_parse_multiple_bases() {
        let decl = parse_one("contract Both: Flyable, Quackable {}");
        assert_eq!(decl.bases.len(), 2);
    }

    // ── Functions ─────────────────────────────────────────

    #[test]
    fn test_parse_modifiers() {
        let decl = parse_one(
            r#"type T {
                fn plain(self);
                static fn make();
                class fn build(cls);
                async fn wait(self);
                gen fn items(self);
                async gen fn stream(self);
                static async fn helper();
            }"#,
        );
        let kinds: Vec<(Binding, Flavor)> = (0..7)
            .map(|i| {
                let f = function(&decl, i);
                (f.binding, f.flavor)
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                (Binding::Instance, Flavor::Sync),
                (Binding::Static, Flavor::Sync),
                (Binding::Class, Flavor::Sync),
                (Binding::Instance, Flavor::Coroutine),
                (Binding::Instance, Flavor::Generator),
                (Binding::Instance, Flavor::AsyncGenerator),
                (Binding::Static, Flavor::Coroutine),
            ]
        );
    }

    #[test]
    fn test_parse_full_parameter_list() {
        let decl = parse_one("type T { fn foo(self, a, b=7, *args, c: int = 3, **kwargs) -> str; }");
        let f = function(&decl, 0);
        let sig = Signature::of(f);
        assert_eq!(sig.to_string(), "(a, b=7, *args, c: int = 3, **kwargs) -> str");
        assert_eq!(sig.params[3].kind, ParamKind::KeywordOnly);
        assert_eq!(sig.params[1].default, Some(json!(7)));
    }

    #[test]
    fn test_parse_bare_star() {
        let decl = parse_one("type T { fn foo(self, *, a); }");
        let f = function(&decl, 0);
        assert_eq!(f.params.len(), 2);
        assert_eq!(f.params[1].kind, ParamKind::KeywordOnly);
    }

    #[test]
    fn test_bare_star_needs_named_parameter() {
        let err = parse_err("type T { fn foo(self, *); }");
        assert!(err.contains("must follow bare '*'"));
    }

    #[test]
    fn test_parse_keyword_as_parameter_name() {
        let decl = parse_one("type T { fn foo(self, type, class=None); }");
        let f = function(&decl, 0);
        assert_eq!(f.params[1].name, "type");
        assert_eq!(f.params[2].default, Some(Value::Null));
    }

    #[test]
    fn test_parse_wraps_chain() {
        let decl = parse_one(
            "type T { fn logged(*args, **kwargs) wraps fn(*a) wraps async fn(self, x: int); }",
        );
        let f = function(&decl, 0);
        assert_eq!(f.chain().count(), 3);
        assert_eq!(f.innermost().flavor, Flavor::Coroutine);
        assert_eq!(Signature::of(f).to_string(), "(x: int)");
    }

    #[test]
    fn test_parse_literals() {
        let decl = parse_one(
            r#"type T { fn f(self, a=-1, b=2.5, c='x', d=True, e=[1, "two", None]); }"#,
        );
        let defaults: Vec<Value> = function(&decl, 0)
            .params
            .iter()
            .skip(1)
            .map(|p| p.default.clone().unwrap())
            .collect();
        assert_eq!(
            defaults,
            vec![json!(-1), json!(2.5), json!("x"), json!(true), json!([1, "two", null])]
        );
    }

    #[test]
    fn test_parse_type_expressions() {
        let decl = parse_one(
            "type T { fn f(self, a: typing.Optional[str], b: dict[str, list[int]], c: int | None, d: Callable[[int], str], e: 'Forward'); }",
        );
        let tags: Vec<String> = function(&decl, 0)
            .params
            .iter()
            .skip(1)
            .map(|p| p.annotation.clone().unwrap().as_str().to_string())
            .collect();
        assert_eq!(
            tags,
            vec![
                "typing.Optional[str]",
                "dict[str,list[int]]",
                "int|None",
                "Callable[[int],str]",
                "'Forward'",
            ]
        );
    }

    // ── Accessors & attributes ────────────────────────────

    #[test]
    fn test_parse_accessor() {
        let decl = parse_one(
            "type T { prop altitude { get(self) -> int; set(self, value: int); del(self); } }",
        );
        match &decl.members[0].body {
            MemberBody::Accessor(a) => {
                assert!(a.getter.is_some());
                assert!(a.setter.is_some());
                assert!(a.deleter.is_some());
            }
            other => panic!("expected accessor, got {:?}", other),
        }
    }

    #[test]
    fn test_accessor_part_twice_rejected() {
        let err = parse_err("type T { prop p { get(self); get(self); } }");
        assert!(err.contains("defines 'get' twice"));
    }

    #[test]
    fn test_accessor_unknown_part_rejected() {
        let err = parse_err("type T { prop p { fetch(self); } }");
        assert!(err.contains("expected 'get', 'set' or 'del'"));
    }

    #[test]
    fn test_parse_attribute() {
        let decl = parse_one(r#"type T { attr name: str = "eagle"; attr size; }"#);
        match &decl.members[0].body {
            MemberBody::Attribute(a) => {
                assert_eq!(a.annotation, Some(TypeTag::new("str")));
                assert_eq!(a.value, Some(json!("eagle")));
            }
            other => panic!("expected attribute, got {:?}", other),
        }
        assert_eq!(
            decl.members[1].body,
            MemberBody::Attribute(AttributeDecl::default())
        );
    }

    // ── Errors ────────────────────────────────────────────

    #[test]
    fn test_missing_semicolon_reports_position() {
        let err = parse_err("type T {\n  fn f(self)\n}");
        assert!(err.contains("expected ';'"), "{}", err);
        assert!(err.contains("3:1"), "{}", err);
    }

    #[test]
    fn test_unclosed_declaration() {
        let err = parse_err("type T { fn f(self);");
        assert!(err.contains("to close 'T'"), "{}", err);
    }

    #[test]
    fn test_unknown_decorator() {
        let err = parse_err("@dataclass\ntype T {}");
        assert!(err.contains("unknown decorator '@dataclass'"));
    }

    #[test]
    fn test_contract_cannot_carry_attachment() {
        let err = parse_err("@implements(A)\ncontract B {}");
        assert!(err.contains("cannot be applied to contract 'B'"));
    }

    #[test]
    fn test_garbage_at_top_level() {
        let err = parse_err("fn f(self);");
        assert!(err.contains("expected 'contract' or 'type'"));
    }

    #[test]
    fn test_nesting_limit_on_list_literals() {
        let deep = format!(
            "type T {{ attr x = {}1{}; }}",
            "[".repeat(200_000),
            "]".repeat(200_000)
        );
        let err = parse_err(&deep);
        assert!(err.contains("nesting too deep at 1:"), "{}", err);

        let shallow = format!(
            "type T {{ attr x = {}1{}; }}",
            "[".repeat(MAX_NESTING),
            "]".repeat(MAX_NESTING)
        );
        assert!(parse(&shallow).is_ok());
    }

    #[test]
    fn test_nesting_limit_on_type_arguments() {
        let deep = format!(
            "type T {{ attr x: {}int{}; }}",
            "list[".repeat(10_000),
            "]".repeat(10_000)
        );
        assert!(parse_err(&deep).contains("nesting too deep"));
    }

    #[test]
    fn test_nesting_limit_on_wraps_chain() {
        let deep = format!("type T {{ fn f(self){}; }}", " wraps fn(self)".repeat(10_000));
        assert!(parse_err(&deep).contains("nesting too deep"));

        let shallow = format!("type T {{ fn f(self){}; }}", " wraps fn(self)".repeat(MAX_NESTING));
        assert!(parse(&shallow).is_ok());
    }

    // ── Determinism proof ─────────────────────────────────

    #[test]
    fn test_parse_determinism_100_iterations() {
        let input = "contract C { fn f(self, a=1, *, b: str); prop p { get(self); } }";
        let first = parse(input).unwrap();
        for i in 0..100 {
            assert_eq!(first, parse(input).unwrap(), "Determinism failure at iteration {}", i);
        }
    }
}

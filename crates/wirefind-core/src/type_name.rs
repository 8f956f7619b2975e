//! Parsing of source-notation type names (`Dictionary<string, int?>`).
//!
//! Grammar:
//!
//! ```text
//! type   = name [ "<" type { "," type } ">" ] { "?" | "[]" }
//! ```
//!
//! Builtin keywords and generic families are recognized directly; any other
//! name must already be declared in the table.

use logos::Logos;

use crate::types::{
    CollectionKind, MetaType, Primitive, TYPE_DOCUMENT, TYPE_OBJECT, TYPE_WIRE_VALUE, TypeError,
    TypeId, TypeShape, TypeTable,
};

/// Deepest generic nesting accepted by [`TypeTable::parse`].
pub const MAX_TYPE_NESTING: u32 = 64;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    #[token("<")]
    LAngle,

    #[token(">")]
    RAngle,

    #[token(",")]
    Comma,

    #[token("?")]
    Question,

    #[regex(r"\[[ \t]*\]")]
    Brackets,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"[ \t\r\n]+")]
    Whitespace,
}

/// Token kinds with their source slices, whitespace dropped.
fn lex(src: &str) -> Result<Vec<(Token, &str)>, TypeError> {
    let mut lexer = Token::lexer(src);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next() {
        match token {
            Ok(Token::Whitespace) => {}
            Ok(kind) => tokens.push((kind, lexer.slice())),
            Err(()) => {
                return Err(TypeError::Malformed {
                    name: src.to_owned(),
                    reason: "unexpected character",
                });
            }
        }
    }
    Ok(tokens)
}

impl TypeTable {
    /// Parse a type name, interning every type it mentions.
    pub fn parse(&mut self, name: &str) -> Result<TypeId, TypeError> {
        let mut parser = Parser {
            src: name,
            tokens: lex(name)?,
            pos: 0,
            depth: 0,
            table: self,
        };
        let id = parser.parse_type()?;
        if parser.peek().is_some() {
            return Err(parser.malformed("trailing characters"));
        }
        Ok(id)
    }
}

struct Parser<'s, 't> {
    src: &'s str,
    tokens: Vec<(Token, &'s str)>,
    pos: usize,
    depth: u32,
    table: &'t mut TypeTable,
}

impl<'s> Parser<'s, '_> {
    fn parse_type(&mut self) -> Result<TypeId, TypeError> {
        if self.depth >= MAX_TYPE_NESTING {
            return Err(TypeError::NestingTooDeep {
                name: self.src.to_owned(),
                limit: MAX_TYPE_NESTING,
            });
        }
        self.depth += 1;
        let parsed = self.parse_type_inner();
        self.depth -= 1;
        parsed
    }

    fn parse_type_inner(&mut self) -> Result<TypeId, TypeError> {
        let ident = self.ident()?;
        let args = if self.eat(Token::LAngle) {
            self.type_args()?
        } else {
            Vec::new()
        };
        let mut id = self.resolve(ident, &args)?;

        loop {
            if self.eat(Token::Question) {
                id = self.table.nullable(id);
            } else if self.eat(Token::Brackets) {
                id = self.table.array(id);
            } else {
                return Ok(id);
            }
        }
    }

    fn type_args(&mut self) -> Result<Vec<TypeId>, TypeError> {
        let mut args = vec![self.parse_type()?];
        loop {
            if self.eat(Token::Comma) {
                args.push(self.parse_type()?);
            } else if self.eat(Token::RAngle) {
                return Ok(args);
            } else {
                return Err(self.malformed("expected `,` or `>`"));
            }
        }
    }

    fn resolve(&mut self, ident: &str, args: &[TypeId]) -> Result<TypeId, TypeError> {
        let table = &mut *self.table;
        let generic = |expected: usize| {
            if args.len() == expected {
                Ok(())
            } else {
                Err(TypeError::GenericArity {
                    name: ident.to_owned(),
                    expected,
                    found: args.len(),
                })
            }
        };

        let collection = match ident {
            "List" => Some(CollectionKind::List),
            "IEnumerable" => Some(CollectionKind::Enumerable),
            "IQueryable" => Some(CollectionKind::Queryable),
            "HashSet" => Some(CollectionKind::HashSet),
            "ICollection" => Some(CollectionKind::Collection),
            _ => None,
        };
        if let Some(kind) = collection {
            generic(1)?;
            return Ok(table.collection(kind, args[0]));
        }

        match ident {
            "Nullable" => {
                generic(1)?;
                return Ok(table.nullable(args[0]));
            }
            "Dictionary" => {
                generic(2)?;
                return Ok(table.dictionary(args[0], args[1]));
            }
            "KeyValuePair" => {
                generic(2)?;
                return Ok(table.key_value_pair(args[0], args[1]));
            }
            "IGrouping" => {
                generic(2)?;
                return Ok(table.grouping(args[0], args[1]));
            }
            "LookupResult" => {
                generic(2)?;
                return Ok(table.lookup_result(args[0], args[1]));
            }
            "Expression" => {
                generic(1)?;
                return Ok(table.quoted(args[0]));
            }
            "Tuple" | "ValueTuple" if !args.is_empty() => {
                return Ok(table.tuple(ident == "ValueTuple", args));
            }
            "Func" => {
                if let Some((ret, params)) = args.split_last() {
                    return Ok(table.func(params, *ret));
                }
            }
            _ => {}
        }

        if !args.is_empty() {
            return Err(TypeError::UnknownName(ident.to_owned()));
        }

        let builtin = match ident {
            "object" | "Object" => Some(TYPE_OBJECT),
            "BsonValue" => Some(TYPE_WIRE_VALUE),
            "BsonDocument" => Some(TYPE_DOCUMENT),
            _ => None,
        };
        if let Some(id) = builtin {
            return Ok(id);
        }

        if let Some(primitive) = Primitive::ALL
            .into_iter()
            .find(|p| p.keyword() == ident || p.runtime_name() == ident)
        {
            return Ok(table.primitive_type(primitive));
        }

        for meta in [
            MetaType::Serializer,
            MetaType::Representation,
            MetaType::PipelineStage,
            MetaType::CollectionHandle,
        ] {
            if meta.type_name() == ident {
                return Ok(table.intern(TypeShape::Meta(meta)));
            }
        }

        table
            .lookup_name(ident)
            .ok_or_else(|| TypeError::UnknownName(ident.to_owned()))
    }

    fn ident(&mut self) -> Result<&'s str, TypeError> {
        match self.peek() {
            Some((Token::Ident, text)) => {
                self.pos += 1;
                Ok(text)
            }
            _ => Err(self.malformed("expected a type name")),
        }
    }

    fn peek(&self) -> Option<(Token, &'s str)> {
        self.tokens.get(self.pos).copied()
    }

    fn eat(&mut self, kind: Token) -> bool {
        if self.peek().is_some_and(|(token, _)| token == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn malformed(&self, reason: &'static str) -> TypeError {
        TypeError::Malformed {
            name: self.src.to_owned(),
            reason,
        }
    }
}

//! Parser for rule and fact sources.
//!
//! The parser consumes the token stream and produces a [`RuleSet`] or a list
//! of ground [`Triple`]s. Parsing is all-or-nothing: the first syntax error
//! aborts the whole source and nothing is returned.

use std::collections::HashMap;
use std::sync::Arc;

use strata_foundation::vocab::xsd;
use strata_foundation::{Error, ErrorKind, Iri, Literal, Node, Result, Triple};

use crate::lexer::Lexer;
use crate::prefix::PrefixMap;
use crate::rule::{ClauseEntry, Functor, PatternNode, Rule, RuleSet, Term, TriplePattern, Var};
use crate::token::{Span, Token, TokenKind};

/// Variable names of the rule being parsed. Nested rules share the table of
/// the outermost rule.
#[derive(Default)]
struct VarTable {
    names: Vec<Arc<str>>,
    index: HashMap<String, Var>,
}

impl VarTable {
    fn intern(&mut self, name: &str) -> Option<Var> {
        if let Some(var) = self.index.get(name) {
            return Some(*var);
        }
        let var = Var::new(u32::try_from(self.names.len()).ok()?);
        self.names.push(Arc::from(name));
        self.index.insert(name.to_string(), var);
        Some(var)
    }
}

/// Parser for rule-language source text.
pub struct Parser<'src> {
    /// The lexer providing tokens.
    lexer: Lexer<'src>,
    /// Current token (lookahead).
    current: Token,
    /// Second token of lookahead, filled on demand.
    peeked: Option<Token>,
    /// Source text (for error messages).
    source: &'src str,
    /// Prefixes in effect.
    prefixes: PrefixMap,
    /// Variables of the rule being parsed.
    vars: VarTable,
}

impl<'src> Parser<'src> {
    /// Creates a parser with the default prefixes.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self::with_prefixes(source, PrefixMap::new())
    }

    /// Creates a parser that starts from the given prefixes.
    #[must_use]
    pub fn with_prefixes(source: &'src str, prefixes: PrefixMap) -> Self {
        let mut lexer = Lexer::new(source);
        let current = next_significant(&mut lexer);
        Self {
            lexer,
            current,
            peeked: None,
            source,
            prefixes,
            vars: VarTable::default(),
        }
    }

    /// Returns the prefixes in effect, including any declared so far.
    #[must_use]
    pub fn prefixes(&self) -> &PrefixMap {
        &self.prefixes
    }

    /// Parses every directive and rule in the source.
    ///
    /// # Errors
    /// Returns a parse error on the first malformed rule or directive.
    pub fn parse_rules(&mut self) -> Result<RuleSet> {
        let mut rules = Vec::new();
        loop {
            match &self.current.kind {
                TokenKind::Eof => break,
                TokenKind::At(_) => self.parse_directive()?,
                TokenKind::LBracket => {
                    let rule = self.parse_top_level(true)?;
                    rules.push(rule);
                    if self.current.kind == TokenKind::Dot {
                        self.advance();
                    }
                }
                _ => {
                    let rule = self.parse_top_level(false)?;
                    rules.push(rule);
                }
            }
        }
        Ok(RuleSet::new(rules, self.prefixes.clone()))
    }

    /// Parses every directive and ground `(s p o)` statement in the source.
    ///
    /// Statements may optionally be separated by `.`.
    ///
    /// # Errors
    /// Returns a parse error on the first malformed statement, including
    /// statements with variables, a literal subject, or a non-IRI predicate.
    pub fn parse_facts(&mut self) -> Result<Vec<Triple>> {
        let mut facts = Vec::new();
        loop {
            match &self.current.kind {
                TokenKind::Eof => break,
                TokenKind::At(_) => self.parse_directive()?,
                TokenKind::Dot => self.advance(),
                TokenKind::LParen => facts.push(self.parse_fact()?),
                TokenKind::Error(msg) => return Err(self.error(&msg.clone())),
                other => {
                    return Err(self.error(&format!(
                        "expected '(' to start a statement, found {}",
                        other.name()
                    )));
                }
            }
        }
        Ok(facts)
    }

    /// Parses `@prefix name: <iri> .`.
    fn parse_directive(&mut self) -> Result<()> {
        let TokenKind::At(word) = &self.current.kind else {
            return Err(self.error("expected a directive"));
        };
        if word != "prefix" {
            return Err(self.error(&format!("unknown directive @{word}")));
        }
        self.advance();

        let prefix = match &self.current.kind {
            TokenKind::PrefixedName { prefix, local } if local.is_empty() => prefix.clone(),
            other => {
                return Err(self.error(&format!(
                    "expected a prefix name like 'ex:', found {}",
                    other.name()
                )));
            }
        };
        self.advance();

        let TokenKind::Iri(namespace) = &self.current.kind else {
            return Err(self.error("expected a namespace IRI in angle brackets"));
        };
        let namespace = namespace.clone();
        self.advance();

        self.expect(&TokenKind::Dot)?;
        self.prefixes.insert(prefix, namespace);
        Ok(())
    }

    /// Parses an outermost rule, bracketed or `.`-terminated.
    fn parse_top_level(&mut self, bracketed: bool) -> Result<Rule> {
        self.vars = VarTable::default();
        let mut rule = if bracketed {
            self.parse_bracketed_rule()?
        } else {
            let start = self.current.span;
            let name = self.parse_rule_name();
            let body = self.parse_clauses(&TokenKind::Arrow, start)?;
            self.expect(&TokenKind::Arrow)?;
            let head = self.parse_clauses(&TokenKind::Dot, start)?;
            self.expect(&TokenKind::Dot)?;
            Rule {
                name,
                body,
                head,
                variables: Vec::new(),
                span: start,
            }
        };
        let variables = std::mem::take(&mut self.vars.names);
        share_variables(&mut rule, &variables);
        rule.variables = variables;
        Ok(rule)
    }

    /// Parses `[ name: body -> head ]`.
    fn parse_bracketed_rule(&mut self) -> Result<Rule> {
        let start = self.current.span;
        self.expect(&TokenKind::LBracket)?;
        let name = self.parse_rule_name();
        let body = self.parse_clauses(&TokenKind::Arrow, start)?;
        self.expect(&TokenKind::Arrow)?;
        let head = self.parse_clauses(&TokenKind::RBracket, start)?;
        self.expect(&TokenKind::RBracket)?;
        Ok(Rule {
            name,
            body,
            head,
            variables: Vec::new(),
            span: start,
        })
    }

    /// Consumes a leading `name:` if present.
    fn parse_rule_name(&mut self) -> Option<Arc<str>> {
        match &self.current.kind {
            TokenKind::PrefixedName { prefix, local } if local.is_empty() && !prefix.is_empty() => {
                let name = Arc::from(prefix.as_str());
                self.advance();
                Some(name)
            }
            _ => None,
        }
    }

    /// Parses clauses up to (not including) `stop`.
    fn parse_clauses(&mut self, stop: &TokenKind, rule_start: Span) -> Result<Vec<ClauseEntry>> {
        let mut clauses = Vec::new();
        while &self.current.kind != stop {
            if self.is_functor_start() {
                clauses.push(ClauseEntry::Functor(self.parse_functor()?));
                continue;
            }
            let clause = match &self.current.kind {
                TokenKind::LParen => ClauseEntry::Triple(self.parse_triple()?),
                TokenKind::LBracket => ClauseEntry::Rule(Box::new(self.parse_bracketed_rule()?)),
                TokenKind::Eof => {
                    return Err(self.error_at(rule_start, "unterminated rule"));
                }
                TokenKind::Error(msg) => return Err(self.error(&msg.clone())),
                other => {
                    return Err(self.error(&format!(
                        "expected {} or a clause, found {}",
                        stop.name(),
                        other.name()
                    )));
                }
            };
            clauses.push(clause);
        }
        Ok(clauses)
    }

    /// Parses `(subject predicate object)`.
    fn parse_triple(&mut self) -> Result<TriplePattern> {
        self.expect(&TokenKind::LParen)?;
        let subject = self.parse_pattern_node()?;
        let predicate = if self.is_functor_start() {
            return Err(self.error("functor not allowed in predicate position"));
        } else {
            self.parse_term()?
        };
        let object = self.parse_pattern_node()?;
        if self.current.kind != TokenKind::RParen {
            return Err(self.error(&format!(
                "expected ')' to close triple pattern, found {}",
                self.current.kind.name()
            )));
        }
        self.advance();
        Ok(TriplePattern {
            subject,
            predicate,
            object,
        })
    }

    fn parse_pattern_node(&mut self) -> Result<PatternNode> {
        if self.is_functor_start() {
            Ok(PatternNode::Functor(self.parse_functor()?))
        } else {
            Ok(PatternNode::Term(self.parse_term()?))
        }
    }

    /// Parses `name(arg, ...)`.
    fn parse_functor(&mut self) -> Result<Functor> {
        let start = self.current.span;
        let TokenKind::Ident(name) = &self.current.kind else {
            return Err(self.error("expected a functor name"));
        };
        let name = Arc::<str>::from(name.as_str());
        self.advance();
        self.expect(&TokenKind::LParen)?;

        let mut args = Vec::new();
        while self.current.kind != TokenKind::RParen {
            if self.current.kind == TokenKind::Eof {
                return Err(self.error_at(start, "unterminated functor argument list"));
            }
            if self.is_functor_start() {
                return Err(self.error("functors cannot be nested inside functor arguments"));
            }
            args.push(self.parse_term()?);
        }
        self.advance();
        Ok(Functor { name, args })
    }

    /// Parses a variable, the wildcard, or a constant.
    fn parse_term(&mut self) -> Result<Term> {
        match &self.current.kind {
            TokenKind::Variable(name) => {
                let var = self
                    .vars
                    .intern(name)
                    .ok_or_else(|| self.error("too many variables in one rule"))?;
                self.advance();
                Ok(Term::Variable(var))
            }
            TokenKind::Star => {
                self.advance();
                Ok(Term::Wildcard)
            }
            _ => Ok(Term::Constant(self.parse_constant()?)),
        }
    }

    /// Parses a ground node.
    fn parse_constant(&mut self) -> Result<Node> {
        let node = match &self.current.kind {
            TokenKind::Iri(iri) => Node::resource(iri.as_str()),
            TokenKind::PrefixedName { prefix, local } => {
                let iri = self
                    .prefixes
                    .expand(prefix, local)
                    .ok_or_else(|| self.error(&format!("unknown prefix '{prefix}:'")))?;
                Node::resource(iri)
            }
            TokenKind::Blank(label) => Node::blank(label.as_str()),
            TokenKind::String(text) => {
                let text = text.clone();
                self.advance();
                return self.parse_literal_suffix(text);
            }
            TokenKind::Integer(text) => {
                let n = text
                    .parse::<i64>()
                    .map_err(|_| self.error(&format!("integer out of range: {text}")))?;
                Node::integer(n)
            }
            TokenKind::Decimal(text) => {
                Node::Literal(Literal::typed(text.as_str(), Iri::new(xsd::DECIMAL)))
            }
            TokenKind::Ident(word) if word == "true" => Node::Literal(Literal::boolean(true)),
            TokenKind::Ident(word) if word == "false" => Node::Literal(Literal::boolean(false)),
            TokenKind::Ident(word) => {
                return Err(self.error(&format!(
                    "unexpected name '{word}'; write a node as prefix:name or <iri>"
                )));
            }
            TokenKind::Error(msg) => return Err(self.error(&msg.clone())),
            other => {
                return Err(self.error(&format!("expected a node, found {}", other.name())));
            }
        };
        self.advance();
        Ok(node)
    }

    /// Parses an optional `@lang` or `^^datatype` after a string.
    fn parse_literal_suffix(&mut self, text: String) -> Result<Node> {
        match &self.current.kind {
            TokenKind::At(lang) => {
                let literal = Literal::lang(text, lang.as_str());
                self.advance();
                Ok(Node::Literal(literal))
            }
            TokenKind::DoubleCaret => {
                self.advance();
                let datatype = self.parse_constant()?;
                let Some(iri) = datatype.as_iri() else {
                    return Err(self.error("datatype must be an IRI"));
                };
                Ok(Node::Literal(Literal::typed(text, iri.clone())))
            }
            _ => Ok(Node::Literal(Literal::plain(text))),
        }
    }

    /// Parses one ground statement.
    fn parse_fact(&mut self) -> Result<Triple> {
        let start = self.current.span;
        self.vars = VarTable::default();
        let pattern = self.parse_triple()?;
        let Some(triple) = pattern.ground() else {
            return Err(self.error_at(start, "statements must not contain variables or '*'"));
        };
        if triple.subject.is_literal() {
            return Err(self.error_at(start, "a literal cannot be the subject of a statement"));
        }
        if !triple.predicate.is_resource() {
            return Err(self.error_at(start, "the predicate of a statement must be an IRI"));
        }
        Ok(triple)
    }

    fn is_functor_start(&mut self) -> bool {
        matches!(&self.current.kind, TokenKind::Ident(w) if w != "true" && w != "false")
            && self.peek_is(&TokenKind::LParen)
    }

    fn peek_is(&mut self, kind: &TokenKind) -> bool {
        if self.peeked.is_none() {
            self.peeked = Some(next_significant(&mut self.lexer));
        }
        self.peeked.as_ref().is_some_and(|t| &t.kind == kind)
    }

    /// Advances to the next non-comment token.
    fn advance(&mut self) {
        self.current = match self.peeked.take() {
            Some(token) => token,
            None => next_significant(&mut self.lexer),
        };
    }

    /// Expects the current token to be of a specific kind, then advances.
    fn expect(&mut self, expected: &TokenKind) -> Result<()> {
        if std::mem::discriminant(&self.current.kind) == std::mem::discriminant(expected) {
            self.advance();
            Ok(())
        } else if let TokenKind::Error(msg) = &self.current.kind {
            Err(self.error(&msg.clone()))
        } else {
            Err(self.error(&format!(
                "expected {}, found {}",
                expected.name(),
                self.current.kind.name()
            )))
        }
    }

    /// Creates a parse error at the current position.
    fn error(&self, message: &str) -> Error {
        self.error_at(self.current.span, message)
    }

    /// Creates a parse error at a specific span.
    fn error_at(&self, span: Span, message: &str) -> Error {
        Error::new(ErrorKind::ParseError {
            message: message.to_string(),
            line: span.line,
            column: span.column,
            context: self.context_at(span),
        })
    }

    /// Returns the source line containing a span.
    fn context_at(&self, span: Span) -> String {
        let line_start = self.source[..span.start].rfind('\n').map_or(0, |i| i + 1);
        let line_end = self.source[span.start..]
            .find('\n')
            .map_or(self.source.len(), |i| span.start + i);

        self.source[line_start..line_end].to_string()
    }
}

fn next_significant(lexer: &mut Lexer<'_>) -> Token {
    loop {
        let token = lexer.next_token();
        if !token.kind.is_trivia() {
            return token;
        }
    }
}

/// Gives every nested rule the variable table of its outermost rule.
fn share_variables(rule: &mut Rule, variables: &[Arc<str>]) {
    for clause in rule.body.iter_mut().chain(rule.head.iter_mut()) {
        if let ClauseEntry::Rule(nested) = clause {
            nested.variables = variables.to_vec();
            share_variables(nested, variables);
        }
    }
}

/// Parses a rule source with the default prefixes.
///
/// # Errors
/// Returns a parse error if any part of the source is malformed; no rules
/// are returned in that case.
pub fn parse_rules(source: &str) -> Result<RuleSet> {
    Parser::new(source).parse_rules()
}

/// Parses a rule source starting from the given prefixes.
///
/// # Errors
/// Returns a parse error if any part of the source is malformed.
pub fn parse_rules_with(source: &str, prefixes: &PrefixMap) -> Result<RuleSet> {
    Parser::with_prefixes(source, prefixes.clone()).parse_rules()
}

/// Parses a list of ground statements with the default prefixes.
///
/// # Errors
/// Returns a parse error if any statement is malformed or not ground.
pub fn parse_facts(source: &str) -> Result<Vec<Triple>> {
    Parser::new(source).parse_facts()
}

/// Parses a list of ground statements starting from the given prefixes.
///
/// # Errors
/// Returns a parse error if any statement is malformed or not ground.
pub fn parse_facts_with(source: &str, prefixes: &PrefixMap) -> Result<Vec<Triple>> {
    Parser::with_prefixes(source, prefixes.clone()).parse_facts()
}

//! A recursive-descent parser for path-query programs.
//!
//! Comments (`/* ... */`) are allowed between declarations and fields.

use crate::ast::{FieldMapping, FieldType, Function, NodeTest, Program, Selector};
use crate::LdPathSyntaxError;
use rdf_transform_model::vocab::{dc, dcterms, fedora, ldp, ldpath_fn};
use rdf_transform_model::{Literal, NamedNode, Term};
use rustc_hash::{FxHashMap, FxHashSet};

/// The prefixes a program can use without declaring them.
pub const BUILTIN_PREFIXES: &[(&str, &str)] = &[
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("skos", "http://www.w3.org/2004/02/skos/core#"),
    ("dc", dc::NAMESPACE),
    ("dcterms", dcterms::NAMESPACE),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("fedora", fedora::NAMESPACE),
    ("ldp", ldp::NAMESPACE),
    ("fn", ldpath_fn::NAMESPACE),
];

/// How deeply selectors and tests may nest before a program is rejected.
const MAX_NESTING_DEPTH: usize = 256;

type ParseResult<T> = Result<T, LdPathSyntaxError>;

/// Parses a complete path-query program.
pub fn parse_program(input: &str) -> ParseResult<Program> {
    Parser::new(input).parse_program()
}

struct Parser<'a> {
    input: &'a str,
    position: usize,
    prefixes: FxHashMap<String, String>,
    depth: usize,
    /// Outcomes of `try_parse_grouped_test` by start position, so backtracking stays linear.
    grouped_tests: FxHashMap<usize, Option<(NodeTest, usize)>>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        let prefixes = BUILTIN_PREFIXES
            .iter()
            .map(|(prefix, namespace)| ((*prefix).to_owned(), (*namespace).to_owned()))
            .collect();
        Self {
            input,
            position: 0,
            prefixes,
            depth: 0,
            grouped_tests: FxHashMap::default(),
        }
    }

    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error(format!(
                "Nesting too deep, at most {MAX_NESTING_DEPTH} levels are allowed"
            )));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_program(mut self) -> ParseResult<Program> {
        let mut filter = None;
        loop {
            self.skip_trivia()?;
            if self.eat_keyword("@prefix") {
                self.parse_prefix()?;
            } else if self.eat_keyword("@filter") {
                let start = self.position;
                let test = self.parse_or_test()?;
                self.expect(";")?;
                if filter.replace(test).is_some() {
                    return Err(self.error_at(start, "A program can only have one @filter"));
                }
            } else {
                break;
            }
        }

        let mut fields = Vec::new();
        let mut names = FxHashSet::default();
        loop {
            self.skip_trivia()?;
            if self.is_eof() {
                break;
            }
            let start = self.position;
            let field = self.parse_field()?;
            if !names.insert(field.name.clone()) {
                return Err(self.error_at(start, format!("Duplicate field '{}'", field.name)));
            }
            fields.push(field);
        }

        Ok(Program { filter, fields })
    }

    fn parse_prefix(&mut self) -> ParseResult<()> {
        self.skip_ws();
        let prefix = self.read_name().unwrap_or_default();
        self.expect(":")?;
        let namespace = self.parse_iri_ref()?;
        self.eat(";");
        self.prefixes
            .insert(prefix.to_owned(), namespace.into_string());
        Ok(())
    }

    fn parse_field(&mut self) -> ParseResult<FieldMapping> {
        self.skip_ws();
        let name = match self.peek() {
            Some('"' | '\'') => self.parse_string()?,
            _ => self
                .read_name()
                .ok_or_else(|| self.error("Expected a field name"))?
                .to_owned(),
        };
        self.expect("=")?;
        let selector = self.parse_selector()?;
        let field_type = if self.eat("::") {
            Some(self.parse_field_type()?)
        } else {
            None
        };
        self.expect(";")?;
        Ok(FieldMapping {
            name,
            selector,
            field_type,
        })
    }

    fn parse_field_type(&mut self) -> ParseResult<FieldType> {
        self.skip_ws();
        let start = self.position;
        let iri = self.parse_iri()?;
        let field_type = FieldType::from_iri(iri.as_ref())
            .ok_or_else(|| self.error_at(start, format!("Unsupported field type {iri}")))?;
        self.skip_ws();
        if self.peek() == Some('(') {
            return Err(self.error("Field type configuration is not supported"));
        }
        Ok(field_type)
    }

    fn parse_selector(&mut self) -> ParseResult<Selector> {
        self.nested(|parser| {
            let mut left = parser.parse_intersection()?;
            while parser.eat("|") {
                let right = parser.parse_intersection()?;
                left = Selector::Union(Box::new(left), Box::new(right));
            }
            Ok(left)
        })
    }

    fn parse_intersection(&mut self) -> ParseResult<Selector> {
        let mut left = self.parse_path()?;
        while self.eat("&") {
            let right = self.parse_path()?;
            left = Selector::Intersection(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_path(&mut self) -> ParseResult<Selector> {
        let mut left = self.parse_step()?;
        while self.eat("/") {
            let right = self.parse_step()?;
            left = Selector::Path(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_step(&mut self) -> ParseResult<Selector> {
        let mut selector = self.parse_atom()?;
        while self.eat("[") {
            let test = self.parse_or_test()?;
            self.expect("]")?;
            selector = Selector::Tested(Box::new(selector), test);
        }
        Ok(selector)
    }

    fn parse_atom(&mut self) -> ParseResult<Selector> {
        self.skip_ws();
        let start = self.position;
        match self.peek() {
            Some('.') => {
                self.bump();
                Ok(Selector::SelfNode)
            }
            Some('*') => {
                self.bump();
                Ok(Selector::Wildcard)
            }
            Some('^') => {
                self.bump();
                if self.eat("*") {
                    Ok(Selector::ReverseWildcard)
                } else {
                    Ok(Selector::ReverseProperty(self.parse_iri()?))
                }
            }
            Some('(') => {
                self.bump();
                let inner = self.parse_selector()?;
                self.expect(")")?;
                let min = if self.eat("+") {
                    1
                } else if self.eat("*") {
                    0
                } else {
                    return Ok(inner);
                };
                Ok(Selector::Recursive {
                    inner: Box::new(inner),
                    min,
                })
            }
            Some('"' | '\'') => Ok(Selector::Literal(Literal::new_simple_literal(
                self.parse_string()?,
            ))),
            Some(_) => {
                let iri = self.parse_iri()?;
                self.skip_ws();
                if self.peek() != Some('(') {
                    return Ok(Selector::Property(iri));
                }

                let function = iri
                    .as_str()
                    .strip_prefix(ldpath_fn::NAMESPACE)
                    .and_then(Function::from_local_name)
                    .ok_or_else(|| self.error_at(start, format!("Unknown function {iri}")))?;
                self.bump();
                let mut arguments = Vec::new();
                if !self.eat(")") {
                    loop {
                        arguments.push(self.parse_selector()?);
                        if !self.eat(",") {
                            break;
                        }
                    }
                    self.expect(")")?;
                }
                Ok(Selector::Function(function, arguments))
            }
            None => Err(self.error("Unexpected end of program, expected a selector")),
        }
    }

    fn parse_or_test(&mut self) -> ParseResult<NodeTest> {
        self.nested(|parser| {
            let mut left = parser.parse_and_test()?;
            while parser.eat("|") {
                let right = parser.parse_and_test()?;
                left = NodeTest::Or(Box::new(left), Box::new(right));
            }
            Ok(left)
        })
    }

    fn parse_and_test(&mut self) -> ParseResult<NodeTest> {
        let mut left = self.parse_unary_test()?;
        while self.eat("&") {
            let right = self.parse_unary_test()?;
            left = NodeTest::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary_test(&mut self) -> ParseResult<NodeTest> {
        self.skip_ws();
        if self.eat("!") {
            let negated = self.nested(Self::parse_unary_test)?;
            return Ok(NodeTest::Not(Box::new(negated)));
        }
        if let Some(test) = self.try_parse_grouped_test() {
            return Ok(test);
        }
        if self.eat("^^") {
            return Ok(NodeTest::Datatype(self.parse_iri()?));
        }
        if self.eat("@") {
            let language = self.read_language_tag()?;
            return Ok(if language.eq_ignore_ascii_case("none") {
                NodeTest::Language(None)
            } else {
                NodeTest::Language(Some(language.to_ascii_lowercase()))
            });
        }
        if self.eat_keyword("is-a") {
            return Ok(NodeTest::IsA(self.parse_node()?));
        }

        let selector = self.parse_path()?;
        if self.eat_keyword("is") {
            Ok(NodeTest::PathValue(selector, self.parse_node()?))
        } else {
            Ok(NodeTest::PathExists(selector))
        }
    }

    /// Parses `( or-test )` unless the parentheses group a selector, as in `[(dc:a / dc:b)+]`.
    fn try_parse_grouped_test(&mut self) -> Option<NodeTest> {
        let checkpoint = self.position;
        if let Some(outcome) = self.grouped_tests.get(&checkpoint) {
            let (test, end) = outcome.clone()?;
            self.position = end;
            return Some(test);
        }
        let outcome = self.parse_grouped_test();
        self.grouped_tests.insert(checkpoint, outcome.clone());
        match outcome {
            Some((test, end)) => {
                self.position = end;
                Some(test)
            }
            None => {
                self.position = checkpoint;
                None
            }
        }
    }

    fn parse_grouped_test(&mut self) -> Option<(NodeTest, usize)> {
        if !self.eat("(") {
            return None;
        }
        if let Ok(test) = self.parse_or_test() {
            if self.eat(")") {
                self.skip_ws();
                let continues_selector = matches!(self.peek(), Some('+' | '*' | '/' | '['));
                let position = self.position;
                let continues_with_is = self.eat_keyword("is");
                self.position = position;
                if !continues_selector && !continues_with_is {
                    return Some((test, self.position));
                }
            }
        }
        None
    }

    fn parse_node(&mut self) -> ParseResult<Term> {
        self.skip_ws();
        if !matches!(self.peek(), Some('"' | '\'')) {
            return Ok(self.parse_iri()?.into());
        }

        let start = self.position;
        let value = self.parse_string()?;
        if self.peek() == Some('@') {
            self.bump();
            let language = self.read_language_tag()?;
            return Literal::new_language_tagged_literal(value, language)
                .map(Into::into)
                .map_err(|e| self.error_at(start, e.to_string()));
        }
        if self.eat("^^") {
            return Ok(Literal::new_typed_literal(value, self.parse_iri()?).into());
        }
        Ok(Literal::new_simple_literal(value).into())
    }

    /// Parses `<iri>` or `prefix:local`.
    fn parse_iri(&mut self) -> ParseResult<NamedNode> {
        self.skip_ws();
        if self.peek() == Some('<') {
            return self.parse_iri_ref();
        }

        let start = self.position;
        let prefix = self.read_name().unwrap_or_default();
        if self.peek() != Some(':') || self.input[self.position..].starts_with("::") {
            return Err(self.error_at(start, "Expected an IRI or a prefixed name"));
        }
        self.bump();
        let local = self.read_while(|c| c.is_alphanumeric() || c == '_' || c == '-');
        let namespace = self
            .prefixes
            .get(prefix)
            .ok_or_else(|| self.error_at(start, format!("Unknown prefix '{prefix}'")))?;
        NamedNode::new(format!("{namespace}{local}")).map_err(|e| self.error_at(start, e.to_string()))
    }

    fn parse_iri_ref(&mut self) -> ParseResult<NamedNode> {
        self.expect("<")?;
        let start = self.position;
        let iri = self.read_while(|c| c != '>' && !c.is_whitespace());
        if self.peek() != Some('>') {
            return Err(self.error("Expected '>' to close the IRI"));
        }
        self.bump();
        NamedNode::new(iri).map_err(|e| self.error_at(start, e.to_string()))
    }

    fn parse_string(&mut self) -> ParseResult<String> {
        let start = self.position;
        let Some(quote) = self.peek() else {
            return Err(self.error("Expected a string"));
        };
        self.bump();
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error_at(start, "Unterminated string")),
                Some(c) if c == quote => {
                    self.bump();
                    return Ok(value);
                }
                Some('\\') => {
                    self.bump();
                    let escaped = match self.peek() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some(c @ ('"' | '\'' | '\\')) => c,
                        _ => return Err(self.error("Invalid escape sequence")),
                    };
                    self.bump();
                    value.push(escaped);
                }
                Some(c) => {
                    self.bump();
                    value.push(c);
                }
            }
        }
    }

    fn read_language_tag(&mut self) -> ParseResult<&'a str> {
        let tag = self.read_while(|c| c.is_ascii_alphanumeric() || c == '-');
        if tag.is_empty() {
            return Err(self.error("Expected a language tag"));
        }
        Ok(tag)
    }

    /// Reads `[A-Za-z_][A-Za-z0-9_-]*`.
    fn read_name(&mut self) -> Option<&'a str> {
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' => {
                Some(self.read_while(|c| c.is_alphanumeric() || c == '_' || c == '-'))
            }
            _ => None,
        }
    }

    fn read_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let input = self.input;
        let start = self.position;
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.bump();
        }
        &input[start..self.position]
    }

    /// Skips white space and comments.
    fn skip_trivia(&mut self) -> ParseResult<()> {
        loop {
            self.skip_ws();
            if !self.input[self.position..].starts_with("/*") {
                return Ok(());
            }
            let start = self.position;
            let Some(end) = self.input[self.position + 2..].find("*/") else {
                return Err(self.error_at(start, "Unterminated comment"));
            };
            self.position += end + 4;
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Consumes `token` if it comes next (after white space).
    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.input[self.position..].starts_with(token) {
            self.position += token.len();
            true
        } else {
            false
        }
    }

    /// Like [Self::eat], but `keyword` must not be followed by a name character.
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        self.skip_ws();
        let Some(rest) = self.input[self.position..].strip_prefix(keyword) else {
            return false;
        };
        let is_whole_word = !rest
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | ':'));
        if is_whole_word {
            self.position += keyword.len();
        }
        is_whole_word
    }

    fn expect(&mut self, token: &str) -> ParseResult<()> {
        if self.eat(token) {
            return Ok(());
        }
        let found = self
            .peek()
            .map_or_else(|| "end of program".to_owned(), |c| format!("'{c}'"));
        Err(self.error(format!("Expected '{token}', found {found}")))
    }

    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.position += c.len_utf8();
        }
    }

    fn is_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    fn error(&self, message: impl Into<String>) -> LdPathSyntaxError {
        self.error_at(self.position, message)
    }

    fn error_at(&self, position: usize, message: impl Into<String>) -> LdPathSyntaxError {
        let before = &self.input[..position];
        let line = before.matches('\n').count() + 1;
        let column = before
            .rsplit('\n')
            .next()
            .map_or(0, |line| line.chars().count())
            + 1;
        LdPathSyntaxError::new(line, column, message)
    }
}

//! The built-in SPARQL functions that operate on already evaluated arguments.

use crate::error::{ThinError, ThinResult};
use crate::numeric::Numeric;
use md5::{Digest, Md5};
use oxiri::Iri;
use oxrdf::vocab::xsd;
use oxrdf::{BlankNode, Literal, NamedNode, Term};
use oxsdatatypes::DateTime;
use regex::{Regex, RegexBuilder};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use std::borrow::Cow;
use std::str::FromStr;

/// A simple literal, an `xsd:string` or a language-tagged string.
#[derive(Clone, Copy, Debug)]
pub(crate) struct StringLiteral<'a> {
    pub(crate) value: &'a str,
    pub(crate) language: Option<&'a str>,
}

impl<'a> StringLiteral<'a> {
    pub(crate) fn from_term(term: &'a Term) -> ThinResult<Self> {
        match term {
            Term::Literal(literal) if literal.language().is_some() => Ok(Self {
                value: literal.value(),
                language: literal.language(),
            }),
            Term::Literal(literal) if literal.datatype() == xsd::STRING => Ok(Self {
                value: literal.value(),
                language: None,
            }),
            _ => ThinError::expected(),
        }
    }

    /// Checks the [argument compatibility rules](https://www.w3.org/TR/sparql11-query/#func-arg-compatibility).
    fn check_compatible(self, other: StringLiteral<'_>) -> ThinResult<()> {
        match (self.language, other.language) {
            (_, None) => Ok(()),
            (Some(lhs), Some(rhs)) if lhs.eq_ignore_ascii_case(rhs) => Ok(()),
            _ => ThinError::expected(),
        }
    }

    fn with_value(self, value: impl Into<String>) -> Term {
        string_term(value.into(), self.language)
    }
}

/// Like [StringLiteral] but without a language tag.
fn simple_literal(term: &Term) -> ThinResult<&str> {
    match term {
        Term::Literal(literal) if literal.datatype() == xsd::STRING => Ok(literal.value()),
        _ => ThinError::expected(),
    }
}

fn string_term(value: String, language: Option<&str>) -> Term {
    match language {
        Some(language) => Literal::new_language_tagged_literal_unchecked(value, language).into(),
        None => Literal::new_simple_literal(value).into(),
    }
}

fn boolean(value: bool) -> Term {
    Literal::from(value).into()
}

fn integer(value: usize) -> ThinResult<Term> {
    Ok(Literal::from(i64::try_from(value)?).into())
}

fn numeric(term: &Term) -> ThinResult<Numeric> {
    match term {
        Term::Literal(literal) => Numeric::from_literal(literal),
        _ => ThinError::expected(),
    }
}

fn integer_argument(term: &Term) -> ThinResult<i64> {
    match numeric(term)? {
        Numeric::Integer(value) => Ok(i64::from_str(&value.to_string())?),
        _ => ThinError::expected(),
    }
}

pub(crate) fn string_value(term: &Term) -> ThinResult<Term> {
    match term {
        Term::NamedNode(node) => Ok(Literal::new_simple_literal(node.as_str()).into()),
        Term::Literal(literal) => Ok(Literal::new_simple_literal(literal.value()).into()),
        Term::BlankNode(_) => ThinError::expected(),
    }
}

pub(crate) fn lang(term: &Term) -> ThinResult<Term> {
    match term {
        Term::Literal(literal) => {
            Ok(Literal::new_simple_literal(literal.language().unwrap_or_default()).into())
        }
        _ => ThinError::expected(),
    }
}

pub(crate) fn datatype(term: &Term) -> ThinResult<Term> {
    match term {
        Term::Literal(literal) => Ok(literal.datatype().into_owned().into()),
        _ => ThinError::expected(),
    }
}

pub(crate) fn iri(term: &Term, base_iri: Option<&Iri<String>>) -> ThinResult<Term> {
    match term {
        Term::NamedNode(_) => Ok(term.clone()),
        Term::Literal(_) => {
            let value = simple_literal(term)?;
            let iri = match base_iri {
                Some(base_iri) => base_iri.resolve(value)?.into_inner(),
                None => Iri::parse(value.to_owned())?.into_inner(),
            };
            Ok(NamedNode::new_unchecked(iri).into())
        }
        Term::BlankNode(_) => ThinError::expected(),
    }
}

pub(crate) fn bnode(label: Option<&Term>) -> ThinResult<Term> {
    if let Some(label) = label {
        simple_literal(label)?;
    }
    Ok(BlankNode::default().into())
}

pub(crate) fn lang_matches(tag: &Term, range: &Term) -> ThinResult<Term> {
    let tag = simple_literal(tag)?;
    let range = simple_literal(range)?;
    let matches = if range == "*" {
        !tag.is_empty()
    } else {
        let mut tag_subtags = tag.split('-');
        range.split('-').all(|range_subtag| {
            tag_subtags
                .next()
                .is_some_and(|tag_subtag| tag_subtag.eq_ignore_ascii_case(range_subtag))
        })
    };
    Ok(boolean(matches))
}

pub(crate) fn str_len(term: &Term) -> ThinResult<Term> {
    integer(StringLiteral::from_term(term)?.value.chars().count())
}

pub(crate) fn substr(term: &Term, start: &Term, length: Option<&Term>) -> ThinResult<Term> {
    let source = StringLiteral::from_term(term)?;
    // Positions are 1-based and may be out of range.
    let start = integer_argument(start)?.saturating_sub(1);
    let end = match length {
        Some(length) => Some(start.saturating_add(integer_argument(length)?)),
        None => None,
    };

    let mut result = String::new();
    for (position, c) in (0_i64..).zip(source.value.chars()) {
        if position >= start && end.map_or(true, |end| position < end) {
            result.push(c);
        }
    }
    Ok(source.with_value(result))
}

pub(crate) fn ucase(term: &Term) -> ThinResult<Term> {
    let source = StringLiteral::from_term(term)?;
    Ok(source.with_value(source.value.to_uppercase()))
}

pub(crate) fn lcase(term: &Term) -> ThinResult<Term> {
    let source = StringLiteral::from_term(term)?;
    Ok(source.with_value(source.value.to_lowercase()))
}

pub(crate) fn str_starts(lhs: &Term, rhs: &Term) -> ThinResult<Term> {
    let (lhs, rhs) = compatible_pair(lhs, rhs)?;
    Ok(boolean(lhs.value.starts_with(rhs.value)))
}

pub(crate) fn str_ends(lhs: &Term, rhs: &Term) -> ThinResult<Term> {
    let (lhs, rhs) = compatible_pair(lhs, rhs)?;
    Ok(boolean(lhs.value.ends_with(rhs.value)))
}

pub(crate) fn contains(lhs: &Term, rhs: &Term) -> ThinResult<Term> {
    let (lhs, rhs) = compatible_pair(lhs, rhs)?;
    Ok(boolean(lhs.value.contains(rhs.value)))
}

pub(crate) fn str_before(lhs: &Term, rhs: &Term) -> ThinResult<Term> {
    let (lhs, rhs) = compatible_pair(lhs, rhs)?;
    Ok(match lhs.value.find(rhs.value) {
        Some(position) => lhs.with_value(&lhs.value[..position]),
        None => Literal::new_simple_literal("").into(),
    })
}

pub(crate) fn str_after(lhs: &Term, rhs: &Term) -> ThinResult<Term> {
    let (lhs, rhs) = compatible_pair(lhs, rhs)?;
    Ok(match lhs.value.find(rhs.value) {
        Some(position) => lhs.with_value(&lhs.value[position + rhs.value.len()..]),
        None => Literal::new_simple_literal("").into(),
    })
}

fn compatible_pair<'a>(
    lhs: &'a Term,
    rhs: &'a Term,
) -> ThinResult<(StringLiteral<'a>, StringLiteral<'a>)> {
    let lhs = StringLiteral::from_term(lhs)?;
    let rhs = StringLiteral::from_term(rhs)?;
    lhs.check_compatible(rhs)?;
    Ok((lhs, rhs))
}

/// Concatenates string literals. The language tag is kept if all arguments share it.
pub(crate) fn concat(arguments: &[Term]) -> ThinResult<Term> {
    let mut result = String::new();
    let mut language: Option<Option<&str>> = None;
    for argument in arguments {
        let argument = StringLiteral::from_term(argument)?;
        result.push_str(argument.value);
        language = match language {
            None => Some(argument.language),
            Some(language) if language == argument.language => Some(language),
            Some(_) => Some(None),
        };
    }
    Ok(string_term(result, language.flatten()))
}

pub(crate) fn encode_for_uri(term: &Term) -> ThinResult<Term> {
    let value = StringLiteral::from_term(term)?.value;
    let mut result = Vec::with_capacity(value.len());
    for c in value.bytes() {
        match c {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => result.push(c),
            _ => {
                result.push(b'%');
                result.extend(format!("{c:02X}").bytes());
            }
        }
    }
    Ok(Literal::new_simple_literal(String::from_utf8(result)?).into())
}

pub(crate) fn regex(text: &Term, pattern: &Term, flags: Option<&Term>) -> ThinResult<Term> {
    let text = StringLiteral::from_term(text)?;
    let regex = compile_pattern(simple_literal(pattern)?, flags.map(simple_literal).transpose()?)
        .ok_or(ThinError::default())?;
    Ok(boolean(regex.is_match(text.value)))
}

pub(crate) fn replace(
    text: &Term,
    pattern: &Term,
    replacement: &Term,
    flags: Option<&Term>,
) -> ThinResult<Term> {
    let text = StringLiteral::from_term(text)?;
    let regex = compile_pattern(simple_literal(pattern)?, flags.map(simple_literal).transpose()?)
        .ok_or(ThinError::default())?;
    let replacement = simple_literal(replacement)?;
    Ok(text.with_value(regex.replace_all(text.value, replacement)))
}

pub(crate) fn compile_pattern(pattern: &str, flags: Option<&str>) -> Option<Regex> {
    const REGEX_SIZE_LIMIT: usize = 1_000_000;

    let mut pattern = Cow::Borrowed(pattern);
    let flags = flags.unwrap_or_default();
    if flags.contains('q') {
        pattern = regex::escape(&pattern).into();
    }
    let mut regex_builder = RegexBuilder::new(&pattern);
    regex_builder.size_limit(REGEX_SIZE_LIMIT);
    for flag in flags.chars() {
        match flag {
            's' => {
                regex_builder.dot_matches_new_line(true);
            }
            'm' => {
                regex_builder.multi_line(true);
            }
            'i' => {
                regex_builder.case_insensitive(true);
            }
            'x' => {
                regex_builder.ignore_whitespace(true);
            }
            'q' => (),        // Already escaped
            _ => return None, // invalid option
        }
    }
    regex_builder.build().ok()
}

pub(crate) fn abs(term: &Term) -> ThinResult<Term> {
    Ok(numeric(term)?.checked_abs()?.into_literal().into())
}

pub(crate) fn ceil(term: &Term) -> ThinResult<Term> {
    Ok(numeric(term)?.checked_ceil()?.into_literal().into())
}

pub(crate) fn floor(term: &Term) -> ThinResult<Term> {
    Ok(numeric(term)?.checked_floor()?.into_literal().into())
}

pub(crate) fn round(term: &Term) -> ThinResult<Term> {
    Ok(numeric(term)?.checked_round()?.into_literal().into())
}

pub(crate) fn rand() -> Term {
    Literal::from(rand::random::<f64>()).into()
}

/// The date part of an `xsd:dateTime` or `xsd:date` literal.
fn date_time(term: &Term) -> ThinResult<DateTime> {
    match term {
        Term::Literal(literal) if literal.datatype() == xsd::DATE_TIME => {
            Ok(DateTime::from_str(literal.value())?)
        }
        Term::Literal(literal) if literal.datatype() == xsd::DATE => {
            // A date is the start of its day.
            let (date, timezone) = split_date_timezone(literal.value());
            Ok(DateTime::from_str(&format!("{date}T00:00:00{timezone}"))?)
        }
        _ => ThinError::expected(),
    }
}

fn split_date_timezone(value: &str) -> (&str, &str) {
    // The date itself contains '-' separators after the (possibly negative) year.
    let search_from = usize::from(value.starts_with('-')) + 4;
    let position = value
        .get(search_from..)
        .and_then(|rest| rest.find(['Z', '+']).or_else(|| rest.match_indices('-').nth(2).map(|(i, _)| i)))
        .map(|i| i + search_from);
    match position {
        Some(position) => value.split_at(position),
        None => (value, ""),
    }
}

pub(crate) fn year(term: &Term) -> ThinResult<Term> {
    Ok(Literal::from(date_time(term)?.year()).into())
}

pub(crate) fn month(term: &Term) -> ThinResult<Term> {
    Ok(Literal::from(i64::from(date_time(term)?.month())).into())
}

pub(crate) fn day(term: &Term) -> ThinResult<Term> {
    Ok(Literal::from(i64::from(date_time(term)?.day())).into())
}

pub(crate) fn hours(term: &Term) -> ThinResult<Term> {
    Ok(Literal::from(i64::from(date_time(term)?.hour())).into())
}

pub(crate) fn minutes(term: &Term) -> ThinResult<Term> {
    Ok(Literal::from(i64::from(date_time(term)?.minute())).into())
}

pub(crate) fn seconds(term: &Term) -> ThinResult<Term> {
    let seconds = date_time(term)?.second();
    Ok(Literal::new_typed_literal(seconds.to_string(), xsd::DECIMAL).into())
}

fn hash<D: Digest>(term: &Term) -> ThinResult<Term> {
    let value = simple_literal(term)?;
    let hash = hex::encode(D::new().chain_update(value).finalize());
    Ok(Literal::new_simple_literal(hash).into())
}

pub(crate) fn md5(term: &Term) -> ThinResult<Term> {
    hash::<Md5>(term)
}

pub(crate) fn sha1(term: &Term) -> ThinResult<Term> {
    hash::<Sha1>(term)
}

pub(crate) fn sha256(term: &Term) -> ThinResult<Term> {
    hash::<Sha256>(term)
}

pub(crate) fn sha384(term: &Term) -> ThinResult<Term> {
    hash::<Sha384>(term)
}

pub(crate) fn sha512(term: &Term) -> ThinResult<Term> {
    hash::<Sha512>(term)
}

pub(crate) fn str_lang(value: &Term, language: &Term) -> ThinResult<Term> {
    let value = simple_literal(value)?;
    let language = simple_literal(language)?;
    Ok(Literal::new_language_tagged_literal(value, language)?.into())
}

pub(crate) fn str_dt(value: &Term, datatype: &Term) -> ThinResult<Term> {
    let value = simple_literal(value)?;
    let Term::NamedNode(datatype) = datatype else {
        return ThinError::expected();
    };
    Ok(Literal::new_typed_literal(value, datatype.clone()).into())
}

pub(crate) fn uuid() -> Term {
    NamedNode::new_unchecked(format!("urn:uuid:{}", uuid::Uuid::new_v4())).into()
}

pub(crate) fn str_uuid() -> Term {
    Literal::new_simple_literal(uuid::Uuid::new_v4().to_string()).into()
}

pub(crate) fn is_iri(term: &Term) -> Term {
    boolean(term.is_named_node())
}

pub(crate) fn is_blank(term: &Term) -> Term {
    boolean(term.is_blank_node())
}

pub(crate) fn is_literal(term: &Term) -> Term {
    boolean(term.is_literal())
}

pub(crate) fn is_numeric(term: &Term) -> Term {
    boolean(numeric(term).is_ok())
}

//! nom grammar for statements, rules and document entries
//!
//! ```text
//! entry       := "fact:" statement | "rule:" antecedents "->" statement
//! antecedents := "(" statement+ ")" | statement
//! statement   := "(" predicate symbol* ")"
//! ```
//!
//! `#` and `;` start comments that run to the end of the line.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, multispace1},
    combinator::{map, value, verify},
    multi::{many0, many1},
    sequence::{delimited, pair, preceded, terminated, tuple},
};

use crate::kb::{Assertion, Implication};
use crate::term::Statement;

/// Parse whitespace and comments
pub(crate) fn ws(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((
            value((), multispace1),
            value((), preceded(alt((char('#'), char(';'))), take_while(|c| c != '\n'))),
        ))),
    )(input)
}

fn is_symbol_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '#' | ';')
}

/// A constant or `?variable` token
fn symbol(input: &str) -> IResult<&str, &str> {
    take_while1(is_symbol_char)(input)
}

/// Predicates must be constants
fn predicate(input: &str) -> IResult<&str, &str> {
    verify(symbol, |s: &str| !s.starts_with('?'))(input)
}

/// Parse `(pred arg ...)`
pub(crate) fn statement(input: &str) -> IResult<&str, Statement> {
    map(
        delimited(
            terminated(char('('), ws),
            pair(predicate, many0(preceded(ws, symbol))),
            preceded(ws, char(')')),
        ),
        |(pred, args)| Statement::from_tokens(pred, args),
    )(input)
}

fn antecedents(input: &str) -> IResult<&str, Vec<Statement>> {
    alt((
        delimited(
            terminated(char('('), ws),
            many1(terminated(statement, ws)),
            char(')'),
        ),
        map(statement, |s| vec![s]),
    ))(input)
}

/// Parse `((a ...) (b ...)) -> (c ...)`
pub(crate) fn implication(input: &str) -> IResult<&str, Implication> {
    map(
        tuple((antecedents, ws, tag("->"), ws, statement)),
        |(lhs, _, _, _, rhs)| Implication::from_parts(lhs, rhs),
    )(input)
}

/// Parse one `fact:` or `rule:` entry
///
/// Dispatches on the keyword rather than using `alt` so that an error inside
/// the body is reported where it happened.
pub(crate) fn entry(input: &str) -> IResult<&str, Assertion> {
    if input.starts_with("rule:") {
        map(preceded(pair(tag("rule:"), ws), implication), Assertion::Rule)(input)
    } else {
        map(preceded(pair(tag("fact:"), ws), statement), Assertion::Fact)(input)
    }
}

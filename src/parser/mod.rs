//! Statement reader
//!
//! Reads the textual form of facts and rules into [`Assertion`] values:
//!
//! ```text
//! ; family.kb
//! fact: (parent A B)
//! fact: (parent B C)
//! rule: ((parent ?x ?y) (parent ?y ?z)) -> (grandparent ?x ?z)
//! ```
//!
//! Tokens starting with `?` are variables; every other token is a constant.
//! Entries may wrap across lines.

mod grammar;

use crate::kb::Assertion;
use crate::term::Statement;

/// Parser error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("Unknown entry kind '{kind}' at position {position} (expected 'fact:' or 'rule:')")]
    UnknownKind { position: usize, kind: String },

    #[error("Unexpected end of input")]
    UnexpectedEof,
}

/// Parse a bare statement such as `(parent A ?x)`
pub fn parse_statement(input: &str) -> Result<Statement, ParseError> {
    complete(input, grammar::statement)
}

/// Parse a single `fact:` or `rule:` entry
pub fn parse_input(input: &str) -> Result<Assertion, ParseError> {
    let body = skip_ws(input);
    check_kind(input, body)?;
    complete(input, grammar::entry)
}

/// Parse every entry of a document, in order
pub fn parse_document(input: &str) -> Result<Vec<Assertion>, ParseError> {
    let mut entries = Vec::new();
    let mut rest = skip_ws(input);

    while !rest.is_empty() {
        check_kind(input, rest)?;
        let (next, entry) = grammar::entry(rest).map_err(|e| syntax_error(input, e))?;
        entries.push(entry);
        rest = skip_ws(next);
    }

    Ok(entries)
}

fn skip_ws(input: &str) -> &str {
    match grammar::ws(input) {
        Ok((rest, ())) => rest,
        Err(_) => input,
    }
}

fn check_kind(full: &str, rest: &str) -> Result<(), ParseError> {
    if rest.starts_with("fact:") || rest.starts_with("rule:") {
        return Ok(());
    }
    if rest.is_empty() {
        return Err(ParseError::UnexpectedEof);
    }
    let kind: String = rest.chars().take_while(|c| !c.is_whitespace()).collect();
    Err(ParseError::UnknownKind {
        position: full.len() - rest.len(),
        kind,
    })
}

/// Run `parser` over the whole input, allowing surrounding whitespace
fn complete<'a, O>(
    input: &'a str,
    parser: impl Fn(&'a str) -> nom::IResult<&'a str, O>,
) -> Result<O, ParseError> {
    let (rest, value) = parser(skip_ws(input)).map_err(|e| syntax_error(input, e))?;
    let rest = skip_ws(rest);
    if !rest.is_empty() {
        return Err(ParseError::Syntax {
            position: input.len() - rest.len(),
            message: format!("unexpected trailing input '{}'", snippet(rest)),
        });
    }
    Ok(value)
}

fn syntax_error(full: &str, err: nom::Err<nom::error::Error<&str>>) -> ParseError {
    match err {
        nom::Err::Incomplete(_) => ParseError::UnexpectedEof,
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            if skip_ws(e.input).is_empty() {
                ParseError::UnexpectedEof
            } else {
                ParseError::Syntax {
                    position: full.len() - e.input.len(),
                    message: format!("unexpected '{}' ({:?})", snippet(e.input), e.code),
                }
            }
        }
    }
}

fn snippet(input: &str) -> String {
    input.chars().take(16).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fact() {
        let a = parse_input("fact: (grandparent A ?X)").unwrap();
        assert_eq!(a, Assertion::Fact(Statement::from_tokens("grandparent", ["A", "?X"])));
        assert_eq!(a.to_string(), "fact: (grandparent A ?X)");
    }

    #[test]
    fn test_parse_rule() {
        let a = parse_input("rule: ((parent ?x ?y) (parent ?y ?z)) -> (grandparent ?x ?z)").unwrap();
        match a {
            Assertion::Rule(r) => {
                assert_eq!(r.lhs().len(), 2);
                assert_eq!(r.rhs(), &Statement::from_tokens("grandparent", ["?x", "?z"]));
            }
            other => panic!("expected rule, got {}", other),
        }
    }

    #[test]
    fn test_display_parses_back() {
        let text = "rule: ((a ?x) (b ?x)) -> (c ?x)";
        assert_eq!(parse_input(text).unwrap().to_string(), text);
    }

    #[test]
    fn test_unknown_kind() {
        let err = parse_input("query: (p A)").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownKind { position: 0, kind: "query:".to_string() }
        );
    }

    #[test]
    fn test_unexpected_eof() {
        assert_eq!(parse_input("fact: (p A").unwrap_err(), ParseError::UnexpectedEof);
        assert_eq!(parse_input("   ").unwrap_err(), ParseError::UnexpectedEof);
    }

    #[test]
    fn test_trailing_input_rejected() {
        let err = parse_input("fact: (p A) (q B)").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { position: 12, .. }));
    }

    #[test]
    fn test_parse_statement() {
        let s = parse_statement("  (color apple red) ").unwrap();
        assert_eq!(s.to_string(), "(color apple red)");
        assert!(parse_statement("color apple").is_err());
    }

    #[test]
    fn test_parse_document() {
        let doc = r#"
            ; family tree
            fact: (parent A B)
            fact: (parent B C)   # inline comment
            rule: ((parent ?x ?y)
                   (parent ?y ?z))
                  -> (grandparent ?x ?z)
        "#;
        let entries = parse_document(doc).unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].is_fact());
        assert!(!entries[2].is_fact());
    }

    #[test]
    fn test_document_error_position() {
        let doc = "fact: (p A)\nbogus (q B)\n";
        let err = parse_document(doc).unwrap_err();
        assert_eq!(err, ParseError::UnknownKind { position: 12, kind: "bogus".to_string() });
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_document("  ; nothing here\n").unwrap().is_empty());
    }
}

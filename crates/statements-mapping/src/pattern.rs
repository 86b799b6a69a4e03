//! Rule pattern language.
//!
//! Mapping rules are written as short expressions over the normalized label
//! and the tag metadata of a line item:
//!
//! ```text
//! [contains 'trade' or 'accounts'] and [contains 'receivable']
//! [equals to 'total equity' or 'total deficit']
//! [tag contains 'commonstock'] and [negating]
//! [contains 'investment'] and [position_after # total_current_assets]
//! min{[contains 'basic'] and [datatype = perShare]}
//! ```
//!
//! `and` binds tighter than `or`; `( )` and `[ ]` both group. A quoted term
//! list after `contains`, `equals to` or `tag contains` matches any of the
//! terms. `position_before # field` and `position_after # field` compare the
//! item's line with the line of a control total and pass when that total is
//! unknown. `datatype`, `polarity` and `period` test tag metadata and
//! `negating` tests the presentation flag. Wrapping a whole pattern in
//! `min{ }` lets only the first matching line in a statement take the field.
//!
//! Patterns are compiled once into a [`Predicate`] tree. Inside an `and`,
//! metadata checks run before label checks, and position checks run last.

use std::fmt;

use serde::{Deserialize, Serialize};
use statements_core::{FactKind, Polarity, ReconError, Result, ValueType};
use statements_recon::LineItem;

use crate::controls::ControlLines;
use crate::normalize::LabelNormalizer;

/// A line item as seen by the rule predicates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Normalized presentation label.
    pub label: String,
    /// Lowercase tag without namespace prefix.
    pub tag: String,
    /// Line order within the statement.
    pub line: u32,
    /// Declared value type.
    pub value_type: ValueType,
    /// Instant or duration.
    pub kind: FactKind,
    /// Credit/debit polarity.
    pub polarity: Option<Polarity>,
    /// Presentation negating flag.
    pub negating: bool,
}

impl Candidate {
    /// Builds a candidate from a reconstructed line item.
    #[must_use]
    pub fn from_item(item: &LineItem, normalizer: &LabelNormalizer) -> Self {
        Self {
            label: normalizer.normalize(&item.label),
            tag: normalizer.normalize_tag(&item.tag),
            line: item.line,
            value_type: item.value_type,
            kind: item.kind,
            polarity: item.polarity,
            negating: item.negating,
        }
    }
}

/// Side of a position constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    /// Line strictly before the control.
    Before,
    /// Line strictly after the control.
    After,
}

/// Compiled predicate tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// All sub-predicates hold.
    And(Vec<Predicate>),
    /// At least one sub-predicate holds.
    Or(Vec<Predicate>),
    /// Negation.
    Not(Box<Predicate>),
    /// Label contains any of the terms.
    Contains(Vec<String>),
    /// Label equals any of the terms.
    Equals(Vec<String>),
    /// Tag contains any of the terms.
    TagContains(Vec<String>),
    /// Line is before or after the named control total.
    Position(Position, String),
    /// Declared value type.
    ValueType(ValueType),
    /// Credit/debit polarity.
    Polarity(Polarity),
    /// Instant or duration.
    Period(FactKind),
    /// Negating flag set.
    Negating,
}

impl Predicate {
    /// Evaluates the predicate against a candidate.
    #[must_use]
    pub fn matches(&self, candidate: &Candidate, controls: &ControlLines) -> bool {
        match self {
            Self::And(terms) => terms.iter().all(|t| t.matches(candidate, controls)),
            Self::Or(terms) => terms.iter().any(|t| t.matches(candidate, controls)),
            Self::Not(inner) => !inner.matches(candidate, controls),
            Self::Contains(terms) => terms.iter().any(|t| candidate.label.contains(t.as_str())),
            Self::Equals(terms) => terms.iter().any(|t| candidate.label == *t),
            Self::TagContains(terms) => terms.iter().any(|t| candidate.tag.contains(t.as_str())),
            Self::Position(side, field) => controls.line(field).is_none_or(|line| match side {
                Position::Before => candidate.line < line,
                Position::After => candidate.line > line,
            }),
            Self::ValueType(value_type) => candidate.value_type == *value_type,
            Self::Polarity(polarity) => candidate.polarity == Some(*polarity),
            Self::Period(kind) => candidate.kind == *kind,
            Self::Negating => candidate.negating,
        }
    }

    /// Evaluation cost class used to order the terms of an `And`.
    fn cost(&self) -> u8 {
        match self {
            Self::ValueType(_) | Self::Polarity(_) | Self::Period(_) | Self::Negating => 0,
            Self::Contains(_) | Self::Equals(_) | Self::TagContains(_) => 1,
            Self::Position(..) => 2,
            Self::Not(inner) => inner.cost(),
            Self::And(terms) | Self::Or(terms) => terms.iter().map(Self::cost).max().unwrap_or(0),
        }
    }
}

/// A compiled rule pattern.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    source: String,
    predicate: Predicate,
    select_min: bool,
}

impl Pattern {
    /// Compiles a pattern. Quoted label terms are normalized with
    /// `normalizer` so they compare against normalized labels.
    pub fn parse(source: &str, normalizer: &LabelNormalizer) -> Result<Self> {
        let tokens = tokenize(source)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            source,
            normalizer,
        };
        let (predicate, select_min) = parser.parse_pattern()?;
        Ok(Self {
            source: source.to_string(),
            predicate,
            select_min,
        })
    }

    /// The pattern text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The compiled predicate.
    #[must_use]
    pub const fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// True if only the first matching line may take the field.
    #[must_use]
    pub const fn select_min(&self) -> bool {
        self.select_min
    }

    /// Evaluates the pattern against a candidate.
    #[must_use]
    pub fn matches(&self, candidate: &Candidate, controls: &ControlLines) -> bool {
        self.predicate.matches(candidate, controls)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// ===== Lexer =====

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Quoted(String),
    Word(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Hash,
    Equals,
}

fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();
    while let Some(&(pos, c)) = chars.peek() {
        let single = match c {
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            '#' => Some(Token::Hash),
            '=' => Some(Token::Equals),
            _ => None,
        };
        if let Some(token) = single {
            tokens.push(token);
            chars.next();
        } else if c.is_whitespace() {
            chars.next();
        } else if c == '\'' || c == '"' {
            chars.next();
            let mut text = String::new();
            let mut closed = false;
            for (_, ch) in chars.by_ref() {
                if ch == c {
                    closed = true;
                    break;
                }
                text.push(ch);
            }
            if !closed {
                return Err(syntax_error(source, &format!("unterminated string at {pos}")));
            }
            tokens.push(Token::Quoted(text));
        } else if c.is_alphanumeric() || c == '_' {
            let mut word = String::new();
            while let Some(&(_, ch)) = chars.peek() {
                if !(ch.is_alphanumeric() || ch == '_') {
                    break;
                }
                word.push(ch);
                chars.next();
            }
            tokens.push(Token::Word(word));
        } else {
            return Err(syntax_error(source, &format!("unexpected {c:?} at {pos}")));
        }
    }
    Ok(tokens)
}

fn syntax_error(source: &str, message: &str) -> ReconError {
    ReconError::Parse(format!("rule pattern {source:?}: {message}"))
}

// ===== Parser =====

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'a str,
    normalizer: &'a LabelNormalizer,
}

impl Parser<'_> {
    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn peek(&self) -> Option<&Token> {
        self.peek_at(0)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn keyword_at(&self, offset: usize, keyword: &str) -> bool {
        matches!(self.peek_at(offset), Some(Token::Word(w)) if w.eq_ignore_ascii_case(keyword))
    }

    fn error(&self, message: &str) -> ReconError {
        syntax_error(self.source, &format!("{message} at token {}", self.pos))
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected {expected:?}")))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.keyword_at(0, keyword) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{keyword}'")))
        }
    }

    fn expect_word(&mut self) -> Result<String> {
        match self.advance() {
            Some(Token::Word(w)) => Ok(w),
            _ => Err(self.error("expected identifier")),
        }
    }

    fn parse_pattern(&mut self) -> Result<(Predicate, bool)> {
        let select_min = self.keyword_at(0, "min") && self.peek_at(1) == Some(&Token::LBrace);
        let predicate = if select_min {
            self.pos += 2;
            let inner = self.parse_or()?;
            self.expect(&Token::RBrace)?;
            inner
        } else {
            self.parse_or()?
        };
        if self.peek().is_some() {
            return Err(self.error("trailing input"));
        }
        Ok((predicate, select_min))
    }

    fn parse_or(&mut self) -> Result<Predicate> {
        let mut terms = vec![self.parse_and()?];
        while self.keyword_at(0, "or") {
            self.pos += 1;
            terms.push(self.parse_and()?);
        }
        Ok(if terms.len() == 1 {
            terms.swap_remove(0)
        } else {
            Predicate::Or(terms)
        })
    }

    fn parse_and(&mut self) -> Result<Predicate> {
        let mut terms = vec![self.parse_not()?];
        while self.keyword_at(0, "and") {
            self.pos += 1;
            terms.push(self.parse_not()?);
        }
        if terms.len() == 1 {
            return Ok(terms.swap_remove(0));
        }
        terms.sort_by_key(Predicate::cost);
        Ok(Predicate::And(terms))
    }

    fn parse_not(&mut self) -> Result<Predicate> {
        if self.keyword_at(0, "not") {
            self.pos += 1;
            return Ok(Predicate::Not(Box::new(self.parse_not()?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Predicate> {
        match self.advance() {
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::LBracket) => {
                let inner = self.parse_or()?;
                self.expect(&Token::RBracket)?;
                Ok(inner)
            }
            Some(Token::Word(word)) => self.parse_operator(&word.to_ascii_lowercase()),
            _ => Err(self.error("expected expression")),
        }
    }

    fn parse_operator(&mut self, word: &str) -> Result<Predicate> {
        match word {
            "contains" => {
                let terms = self.parse_terms("contains")?;
                Ok(Predicate::Contains(
                    terms.iter().map(|t| self.normalizer.normalize(t)).collect(),
                ))
            }
            "equals" => {
                if self.keyword_at(0, "to") {
                    self.pos += 1;
                }
                let terms = self.parse_terms("equals")?;
                Ok(Predicate::Equals(
                    terms.iter().map(|t| self.normalizer.normalize(t)).collect(),
                ))
            }
            "tag" => {
                self.expect_keyword("contains")?;
                let terms = self.parse_terms("contains")?;
                Ok(Predicate::TagContains(
                    terms.iter().map(|t| t.to_ascii_lowercase()).collect(),
                ))
            }
            "position_before" | "position_after" => {
                self.expect(&Token::Hash)?;
                let field = self.expect_word()?;
                let side = if word == "position_before" {
                    Position::Before
                } else {
                    Position::After
                };
                Ok(Predicate::Position(side, field))
            }
            "datatype" => {
                self.expect(&Token::Equals)?;
                let value = self.expect_word()?;
                match value.to_ascii_lowercase().as_str() {
                    "monetary" => Ok(Predicate::ValueType(ValueType::Monetary)),
                    "pershare" => Ok(Predicate::ValueType(ValueType::PerShare)),
                    "shares" => Ok(Predicate::ValueType(ValueType::Shares)),
                    "other" => Ok(Predicate::ValueType(ValueType::Other)),
                    _ => Err(self.error(&format!("unknown datatype {value:?}"))),
                }
            }
            "polarity" => {
                self.expect(&Token::Equals)?;
                let value = self.expect_word()?;
                match value.to_ascii_lowercase().as_str() {
                    "credit" => Ok(Predicate::Polarity(Polarity::Credit)),
                    "debit" => Ok(Predicate::Polarity(Polarity::Debit)),
                    _ => Err(self.error(&format!("unknown polarity {value:?}"))),
                }
            }
            "period" => {
                self.expect(&Token::Equals)?;
                let value = self.expect_word()?;
                match value.to_ascii_lowercase().as_str() {
                    "instant" => Ok(Predicate::Period(FactKind::Instant)),
                    "duration" => Ok(Predicate::Period(FactKind::Duration)),
                    _ => Err(self.error(&format!("unknown period {value:?}"))),
                }
            }
            "negating" => Ok(Predicate::Negating),
            _ => Err(self.error(&format!("unknown operator {word:?}"))),
        }
    }

    /// Quoted alternatives: `'a' or 'b'`, also `'a' or contains 'b'`.
    fn parse_terms(&mut self, operator: &str) -> Result<Vec<String>> {
        let mut terms = match self.advance() {
            Some(Token::Quoted(term)) => vec![term],
            _ => return Err(self.error(&format!("expected quoted term after '{operator}'"))),
        };
        loop {
            if !self.keyword_at(0, "or") {
                break;
            }
            let skip = if self.keyword_at(1, operator) { 2 } else { 1 };
            match self.peek_at(skip) {
                Some(Token::Quoted(term)) => {
                    terms.push(term.clone());
                    self.pos += skip + 1;
                }
                _ => break,
            }
        }
        Ok(terms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(source: &str) -> Pattern {
        Pattern::parse(source, &LabelNormalizer::new().unwrap()).unwrap()
    }

    fn candidate(label: &str, line: u32) -> Candidate {
        let normalizer = LabelNormalizer::new().unwrap();
        Candidate {
            label: normalizer.normalize(label),
            tag: String::new(),
            line,
            value_type: ValueType::Monetary,
            kind: FactKind::Instant,
            polarity: None,
            negating: false,
        }
    }

    #[test]
    fn test_contains_alternatives() {
        let pattern = compile("[contains 'trade' or 'accounts'] and [contains 'receivable']");
        let none = ControlLines::default();
        assert!(pattern.matches(&candidate("Accounts receivable, net", 3), &none));
        assert!(pattern.matches(&candidate("Trade receivables", 3), &none));
        assert!(!pattern.matches(&candidate("Other receivables", 3), &none));
        assert!(!pattern.matches(&candidate("Accounts payable", 3), &none));
    }

    #[test]
    fn test_equals_and_not() {
        let pattern = compile("equals to 'total equity' or equals to 'total deficit'");
        let none = ControlLines::default();
        assert!(pattern.matches(&candidate("Total equity", 1), &none));
        assert!(pattern.matches(&candidate("Total deficit", 1), &none));
        assert!(!pattern.matches(&candidate("Total stockholders' equity", 1), &none));

        let pattern = compile("[contains 'cash'] and not [contains 'restricted' or 'short-term']");
        assert!(pattern.matches(&candidate("Cash and cash equivalents", 1), &none));
        assert!(!pattern.matches(&candidate("Cash and short-term investments", 1), &none));
    }

    #[test]
    fn test_position_is_permissive_without_control() {
        let pattern = compile("[contains 'investment'] and [position_after # total_current_assets]");
        let mut controls = ControlLines::default();
        assert!(pattern.matches(&candidate("Investments", 2), &controls));
        controls.insert("total_current_assets", 5);
        assert!(!pattern.matches(&candidate("Investments", 2), &controls));
        assert!(pattern.matches(&candidate("Investments", 7), &controls));
    }

    #[test]
    fn test_metadata_predicates() {
        let pattern = compile("min{[contains 'basic'] and [datatype = perShare]}");
        assert!(pattern.select_min());
        let none = ControlLines::default();
        let mut item = candidate("Basic", 20);
        assert!(!pattern.matches(&item, &none));
        item.value_type = ValueType::PerShare;
        assert!(pattern.matches(&item, &none));

        let pattern = compile("[tag contains 'CommonStock'] and [negating] and [polarity = debit]");
        item.tag = "commonstocksheldinsubsidiary".to_string();
        assert!(!pattern.matches(&item, &none));
        item.negating = true;
        item.polarity = Some(Polarity::Debit);
        assert!(pattern.matches(&item, &none));
    }

    #[test]
    fn test_and_orders_cheap_checks_first() {
        let pattern = compile("[position_before # total_assets] and [contains 'cash'] and [period = instant]");
        let Predicate::And(terms) = pattern.predicate() else {
            panic!("expected and");
        };
        assert!(matches!(terms[0], Predicate::Period(FactKind::Instant)));
        assert!(matches!(terms[1], Predicate::Contains(_)));
        assert!(matches!(terms[2], Predicate::Position(Position::Before, _)));
    }

    #[test]
    fn test_syntax_errors() {
        let normalizer = LabelNormalizer::new().unwrap();
        assert!(Pattern::parse("[contains 'cash'", &normalizer).is_err());
        assert!(Pattern::parse("contains 'cash", &normalizer).is_err());
        assert!(Pattern::parse("datatype = money", &normalizer).is_err());
        assert!(Pattern::parse("position_after total_assets", &normalizer).is_err());
        assert!(Pattern::parse("contains 'a' 'b'", &normalizer).is_err());
    }
}

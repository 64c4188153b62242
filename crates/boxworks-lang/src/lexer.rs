//! Lexer and tokens for the Box language.

use super::Str;
use crate::Error;
use dimen::{GlueOrder, Scaled, ScaledUnit};
use std::borrow::Cow;

/// Box language lexer.
///
/// Bracket matching is computed for the whole source up front,
/// so that unmatched and mismatched brackets are reported where they are opened.
pub struct Lexer<'a> {
    /// The full source file being lexed.
    s: &'a str,
    /// Index of the next character to lex.
    l: usize,
    /// For each opening bracket in source order, the matching closing bracket.
    op: Vec<Option<ClosingParen>>,
    /// Index of the next opening bracket that is expected.
    op_i: usize,
    /// The next token, if it has already been lexed by [Lexer::peek].
    peeked: Option<Option<Token<'a>>>,
    errs: Vec<Error<'a>>,
}

/// Opaque marker of a closing bracket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClosingParen {
    /// Index of the closing bracket in the source.
    source_idx: usize,
}

impl ClosingParen {
    fn str<'a>(&self, source: &'a str) -> Str<'a> {
        Str {
            value: source,
            start: self.source_idx,
            end: self.source_idx + 1,
        }
    }
}

impl<'a> Lexer<'a> {
    /// Create a new Box language lexer.
    pub fn new(source: &'a str) -> Self {
        Self {
            s: source,
            l: 0,
            op: Self::build(source),
            op_i: 0,
            peeked: None,
            errs: vec![],
        }
    }

    fn build(source: &'a str) -> Vec<Option<ClosingParen>> {
        #[derive(Clone, Copy)]
        enum State {
            Regular,
            Comment,
            String,
            StringEscape,
        }
        let mut v: Vec<Option<ClosingParen>> = vec![];
        let mut stack = vec![];
        let mut state = State::Regular;
        for (i, c) in source.char_indices() {
            state = match (c, state) {
                ('(' | '[', State::Regular) => {
                    stack.push(v.len());
                    v.push(None);
                    State::Regular
                }
                (')' | ']', State::Regular) => {
                    if let Some(j) = stack.pop() {
                        v[j] = Some(ClosingParen { source_idx: i });
                    }
                    State::Regular
                }
                ('#', State::Regular) => State::Comment,
                ('"', State::Regular) => State::String,
                ('\n', State::Comment) => State::Regular,
                ('"', State::String) => State::Regular,
                ('\\', State::String) => State::StringEscape,
                (_, State::StringEscape) => State::String,
                (_, state) => state,
            };
        }
        v
    }

    /// Returns the next token, appending any comments before it to `comments`.
    pub fn next(&mut self, comments: &mut Vec<&'a str>) -> Option<Token<'a>> {
        match self.peeked.take() {
            Some(token) => token,
            None => self.next_non_comment(comments),
        }
    }

    /// Returns the next token without consuming it.
    ///
    /// Comments before the token are appended to `comments` by this call
    /// and are not returned again by the next call to [Lexer::next].
    pub fn peek(&mut self, comments: &mut Vec<&'a str>) -> Option<Token<'a>> {
        if self.peeked.is_none() {
            self.peeked = Some(self.next_non_comment(comments));
        }
        self.peeked.clone().flatten()
    }

    fn next_non_comment(&mut self, comments: &mut Vec<&'a str>) -> Option<Token<'a>> {
        loop {
            let token = self.lex()?;
            match token.value {
                TokenValue::Comment => comments.push(token.source.str()),
                _ => return Some(token),
            }
        }
    }

    /// Index in the source just after the last token returned.
    pub fn cur_pos(&self) -> usize {
        self.l
    }

    /// An empty span at the end of the source.
    pub fn end_of_input(&self) -> Str<'a> {
        Str {
            value: self.s,
            start: self.s.len(),
            end: self.s.len(),
        }
    }

    pub fn errs_mut(&mut self) -> &mut Vec<Error<'a>> {
        &mut self.errs
    }

    /// Returns all errors accumulated so far, if there are any.
    pub fn check_errors(&mut self) -> Result<(), Vec<Error<'a>>> {
        if self.errs.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.errs))
        }
    }

    fn str(&self, start: usize, end: usize) -> Str<'a> {
        Str {
            value: self.s,
            start,
            end,
        }
    }
}

/// A token in the Box language.
#[derive(Clone, Debug)]
pub struct Token<'a> {
    pub value: TokenValue<'a>,
    pub source: Str<'a>,
}

/// Value of a token in the Box language.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenValue<'a> {
    /// Opening square bracket `[`.
    SquareOpen {
        /// The closing bracket that matches this opening bracket.
        ///
        /// If `None`, this opening bracket is not matched.
        closing: Option<ClosingParen>,
    },
    SquareClose,
    /// Opening round bracket `(`.
    RoundOpen {
        /// The closing bracket that matches this opening bracket.
        ///
        /// If `None`, this opening bracket is not matched.
        closing: Option<ClosingParen>,
    },
    RoundClose,
    Comma,
    Equal,
    Keyword,
    String(Cow<'a, str>),
    Integer(i32),
    Scaled(Scaled),
    InfiniteGlue(Scaled, GlueOrder),
    /// A comment; the source of the token is the text after the `#`.
    Comment,
}

impl<'a> Lexer<'a> {
    fn lex(&mut self) -> Option<Token<'a>> {
        loop {
            // Consume whitespace and comments
            let mut comment_start: Option<usize> = None;
            while let Some(c) = self.s[self.l..].chars().next() {
                let should_skip = match c {
                    '\n' => {
                        if let Some(comment_start) = comment_start.take() {
                            let source = self.str(comment_start, self.l);
                            self.l += 1;
                            return Some(Token {
                                value: TokenValue::Comment,
                                source,
                            });
                        }
                        true
                    }
                    '#' => {
                        if comment_start.is_none() {
                            comment_start = Some(self.l + 1);
                        }
                        true
                    }
                    c => comment_start.is_some() || c.is_whitespace(),
                };
                if !should_skip {
                    break;
                }
                self.l += c.len_utf8();
            }
            if let Some(comment_start) = comment_start {
                return Some(Token {
                    value: TokenValue::Comment,
                    source: self.str(comment_start, self.l),
                });
            }
            // Now look at the token
            let mut iter = self.s[self.l..].chars();
            let c = iter.next()?;
            let start = self.l;
            self.l += c.len_utf8();
            use TokenValue::*;
            let value = match c {
                '[' | '(' => {
                    let closing = self.op.get(self.op_i).copied().flatten();
                    let open = self.str(start, start + 1);
                    match &closing {
                        Some(closing) => {
                            let close = closing.str(self.s);
                            let want = if c == '[' { "]" } else { ")" };
                            if close.str() != want {
                                self.errs.push(Error::MismatchedBrackets { open, close });
                            }
                        }
                        None => {
                            self.errs.push(Error::UnmatchedOpeningBracket { open });
                        }
                    };
                    self.op_i += 1;
                    if c == '[' {
                        SquareOpen { closing }
                    } else {
                        RoundOpen { closing }
                    }
                }
                ']' => SquareClose,
                ')' => RoundClose,
                '=' => Equal,
                ',' => Comma,
                'a'..='z' | 'A'..='Z' => {
                    while let Some(n @ ('a'..='z' | 'A'..='Z' | '_')) = iter.next() {
                        self.l += n.len_utf8();
                    }
                    Keyword
                }
                '"' => self.lex_string(start),
                '0'..='9' => {
                    let initial_value = (c as i32) - ('0' as i32);
                    self.lex_number(false, initial_value, start)
                }
                '-' => self.lex_number(true, 0, start),
                _ => {
                    self.errs.push(Error::InvalidCharacter {
                        char: self.str(start, self.l),
                    });
                    continue;
                }
            };
            return Some(Token {
                value,
                source: self.str(start, self.l),
            });
        }
    }

    /// Lexes a string whose opening quote starts at `start`.
    ///
    /// We support a subset of Rust escape sequences, which are documented
    /// here: https://doc.rust-lang.org/reference/expressions/literal-expr.html.
    fn lex_string(&mut self, start: usize) -> TokenValue<'a> {
        let mut buf = String::new();
        let s = self.s;
        let mut iter = s[self.l..].chars();
        loop {
            let Some(n) = iter.next() else {
                self.errs.push(Error::UnterminatedString {
                    string: self.str(start, self.l),
                });
                return TokenValue::String(Cow::Owned(buf));
            };
            let escape_start = self.l;
            self.l += n.len_utf8();
            match n {
                '"' => break,
                '\\' => {
                    let Some(n) = iter.next() else {
                        continue;
                    };
                    self.l += n.len_utf8();
                    match n {
                        '"' | '\\' => buf.push(n),
                        'n' => buf.push('\n'),
                        'u' => {
                            if let Some(c) = self.lex_unicode_escape(&mut iter) {
                                buf.push(c);
                            } else {
                                self.errs.push(Error::InvalidEscape {
                                    escape: self.str(escape_start, self.l),
                                });
                            }
                        }
                        _ => self.errs.push(Error::InvalidEscape {
                            escape: self.str(escape_start, self.l),
                        }),
                    }
                }
                _ => buf.push(n),
            }
        }
        // If the string is exactly in this source (e.g. no escape sequences)
        // then we can avoid an allocation.
        let source = &self.s[start + 1..self.l - 1];
        TokenValue::String(if buf.len() == source.len() {
            Cow::Borrowed(source)
        } else {
            Cow::Owned(buf)
        })
    }

    /// Lexes the `{..}` part of a `\u{..}` escape.
    fn lex_unicode_escape(&mut self, iter: &mut std::str::Chars) -> Option<char> {
        if iter.clone().next() != Some('{') {
            return None;
        }
        iter.next();
        self.l += 1;
        let mut i: u32 = 0;
        let mut digits = 0;
        let mut valid = true;
        for n in iter.by_ref() {
            self.l += n.len_utf8();
            if n == '}' {
                return if valid && digits > 0 {
                    char::from_u32(i)
                } else {
                    None
                };
            }
            digits += 1;
            match n.to_digit(16) {
                Some(d) if digits <= 6 => i = i * 16 + d,
                _ => valid = false,
            }
        }
        None
    }

    fn lex_number(
        &mut self,
        negative: bool,
        initial_value: i32,
        start_idx: usize,
    ) -> TokenValue<'a> {
        let s = self.s;
        let mut iter = s[self.l..].chars();
        let mut n = Some(initial_value);
        let mut parsing_n = true;
        let mut d = [0_u8; 17];
        let mut next_d = 0_usize;
        loop {
            match iter.next() {
                Some(c @ '0'..='9') => {
                    let i = (c as u8) - b'0';
                    if parsing_n {
                        n = n
                            .and_then(|n| n.checked_mul(10))
                            .and_then(|n| n.checked_add(i as i32));
                    } else {
                        if let Some(d) = d.get_mut(next_d) {
                            *d = i;
                        }
                        next_d += 1;
                    }
                    self.l += 1;
                }
                Some('.') => {
                    if !parsing_n {
                        self.errs.push(Error::MultipleDecimalPoints {
                            point: self.str(self.l, self.l + 1),
                        });
                    }
                    parsing_n = false;
                    self.l += 1;
                }
                Some(c @ ('a'..='z' | 'A'..='Z')) => {
                    let u = self.l;
                    self.l += c.len_utf8();
                    while let Some(n @ ('a'..='z' | 'A'..='Z' | '_')) = iter.next() {
                        self.l += n.len_utf8();
                    }
                    let number = self.str(start_idx, self.l);
                    let raw_unit = &self.s[u..self.l];
                    let fractional = Scaled::from_decimal_digits(&d);
                    let unit = match ScaledUnit::parse(raw_unit) {
                        Some(unit) => Some(unit),
                        None if GlueOrder::parse(raw_unit).is_some() => Some(ScaledUnit::Point),
                        None => None,
                    };
                    let Some(unit) = unit else {
                        self.errs.push(Error::InvalidDimensionUnit {
                            dimension: number,
                            unit: self.str(u, self.l),
                        });
                        return TokenValue::Scaled(Scaled::ZERO);
                    };
                    let Some(mut s) = n.and_then(|n| Scaled::new(n, fractional, unit).ok()) else {
                        self.errs.push(Error::NumberTooLarge { number });
                        return TokenValue::Scaled(Scaled::ZERO);
                    };
                    if negative {
                        s = -s;
                    }
                    return match GlueOrder::parse(raw_unit) {
                        Some(glue_order) => TokenValue::InfiniteGlue(s, glue_order),
                        None => TokenValue::Scaled(s),
                    };
                }
                _ => {
                    if !parsing_n {
                        self.errs.push(Error::NumberWithoutUnits {
                            number: self.str(start_idx, self.l),
                        });
                        return TokenValue::Scaled(Scaled::ZERO);
                    }
                    let Some(n) = n else {
                        self.errs.push(Error::NumberTooLarge {
                            number: self.str(start_idx, self.l),
                        });
                        return TokenValue::Integer(0);
                    };
                    return TokenValue::Integer(if negative { -n } else { n });
                }
            }
        }
    }
}

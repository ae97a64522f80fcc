//! A small S-expression reader for KiCad netlist exports.
//!
//! Atoms keep their exact source text: KiCad writes component values such as
//! `100` or `0.10` unquoted, and the BOM must see them exactly as written, so
//! numbers are never converted at parse time. Use [`Sexpr::as_int`] when a
//! numeric reading is wanted.
//!
//! Every node carries the byte [`Span`] it was read from so that callers can
//! point at the offending location when a netlist is malformed.

pub mod kicad;

/// Find a direct child list `(name ...)` within a list of [`Sexpr`] nodes.
pub fn find_child_list<'a>(items: &'a [Sexpr], name: &str) -> Option<&'a [Sexpr]> {
    items
        .iter()
        .filter_map(Sexpr::as_list)
        .find(|list| list.first().and_then(Sexpr::as_sym) == Some(name))
}

/// Find all direct child lists `(name ...)` within a list of [`Sexpr`] nodes.
pub fn find_all_child_lists<'a>(items: &'a [Sexpr], name: &str) -> Vec<&'a [Sexpr]> {
    items
        .iter()
        .filter_map(Sexpr::as_list)
        .filter(|list| list.first().and_then(Sexpr::as_sym) == Some(name))
        .collect()
}

/// Byte span in source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// The kind of S-expression value
#[derive(Debug, Clone, PartialEq)]
pub enum SexprKind {
    /// Unquoted atom, numbers included
    Symbol(String),
    /// Quoted text with escapes resolved
    String(String),
    List(Vec<Sexpr>),
}

/// An S-expression value with source span
#[derive(Debug, Clone)]
pub struct Sexpr {
    pub kind: SexprKind,
    pub span: Span,
}

impl PartialEq for Sexpr {
    fn eq(&self, other: &Self) -> bool {
        // Spans are positional metadata only
        self.kind == other.kind
    }
}

impl Sexpr {
    pub fn with_span(kind: SexprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Text of an atom, quoted or not.
    ///
    /// Older KiCad versions write `(ref R1)` while newer ones write `(ref "R1")`;
    /// netlist readers should use this accessor rather than [`Sexpr::as_str`].
    pub fn as_atom(&self) -> Option<&str> {
        match &self.kind {
            SexprKind::Symbol(s) | SexprKind::String(s) => Some(s),
            SexprKind::List(_) => None,
        }
    }

    pub fn as_sym(&self) -> Option<&str> {
        match &self.kind {
            SexprKind::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            SexprKind::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer reading of an atom (`(number 1)` and `(number "1")` both work).
    pub fn as_int(&self) -> Option<i64> {
        self.as_atom()?.trim().parse().ok()
    }

    pub fn as_list(&self) -> Option<&[Sexpr]> {
        match &self.kind {
            SexprKind::List(items) => Some(items),
            _ => None,
        }
    }

    /// Tag of a list node, i.e. the symbol in head position.
    pub fn tag(&self) -> Option<&str> {
        self.as_list()?.first()?.as_sym()
    }
}

/// Errors that can occur during parsing
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("expected '{expected}', found '{found}' at byte {pos}")]
    UnexpectedChar {
        found: char,
        expected: char,
        pos: usize,
    },
    #[error("unclosed list starting at byte {0}")]
    UnclosedList(usize),
    #[error("unterminated string starting at byte {0}")]
    UnterminatedString(usize),
    #[error("empty atom at byte {0}")]
    EmptyAtom(usize),
    #[error("trailing input at byte {0}")]
    TrailingInput(usize),
}

/// Parser for S-expressions
pub struct Parser<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Parser {
            input,
            chars: input.char_indices().peekable(),
            current_pos: 0,
        }
    }

    /// Parse one expression
    pub fn parse(&mut self) -> Result<Sexpr, ParseError> {
        self.skip_whitespace();
        match self.peek_char() {
            None => Err(ParseError::UnexpectedEof),
            Some('(') => self.parse_list(),
            Some(_) => self.parse_atom(),
        }
    }

    fn parse_list(&mut self) -> Result<Sexpr, ParseError> {
        let start_pos = self.current_pos;
        self.expect('(')?;
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek_char() {
                None => return Err(ParseError::UnclosedList(start_pos)),
                Some(')') => {
                    self.advance();
                    break;
                }
                Some(_) => items.push(self.parse()?),
            }

            if items.len() % 1000 == 0 {
                log::trace!(
                    "Parsed {} items in list at position {start_pos}",
                    items.len()
                );
            }
        }

        Ok(Sexpr::with_span(
            SexprKind::List(items),
            Span::new(start_pos, self.current_pos),
        ))
    }

    fn parse_atom(&mut self) -> Result<Sexpr, ParseError> {
        if self.peek_char() == Some('"') {
            return self.parse_string();
        }

        let start = self.current_pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() || ch == '(' || ch == ')' || ch == '"' {
                break;
            }
            self.advance();
        }

        if self.current_pos == start {
            return Err(ParseError::EmptyAtom(start));
        }

        let text = self.input[start..self.current_pos].to_string();
        Ok(Sexpr::with_span(
            SexprKind::Symbol(text),
            Span::new(start, self.current_pos),
        ))
    }

    fn parse_string(&mut self) -> Result<Sexpr, ParseError> {
        let start_pos = self.current_pos;
        self.expect('"')?;
        let mut result = String::new();

        loop {
            match self.peek_char() {
                None => return Err(ParseError::UnterminatedString(start_pos)),
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    let escaped = match self.peek_char() {
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some(ch) => ch,
                        None => return Err(ParseError::UnterminatedString(start_pos)),
                    };
                    result.push(escaped);
                    self.advance();
                }
                Some(ch) => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Ok(Sexpr::with_span(
            SexprKind::String(result),
            Span::new(start_pos, self.current_pos),
        ))
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == ';' {
                // Comment runs to end of line
                while let Some(ch) = self.peek_char() {
                    self.advance();
                    if ch == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn advance(&mut self) {
        if let Some((pos, ch)) = self.chars.next() {
            self.current_pos = pos + ch.len_utf8();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.peek_char() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(found) => Err(ParseError::UnexpectedChar {
                found,
                expected,
                pos: self.current_pos,
            }),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }
}

/// Parse a document holding exactly one S-expression.
pub fn parse(input: &str) -> Result<Sexpr, ParseError> {
    log::trace!("Parsing S-expression from {} bytes of input", input.len());
    let mut parser = Parser::new(input);
    let sexpr = parser.parse()?;
    parser.skip_whitespace();
    if !parser.is_at_end() {
        return Err(ParseError::TrailingInput(parser.current_pos));
    }
    Ok(sexpr)
}

//! Safe parser for Python-style literal structures.
//!
//! Click exports encode the `details` column as the textual form of a nested
//! mapping, e.g. `{'browser': {'address': '1.2.3.4', 'user-agent': '...'}}`.
//! This module turns such text into a [`Literal`] tree with a strict
//! recursive-descent parser. Only literal syntax is accepted:
//!
//! - strings (single, double and triple quoted; `r`/`u`/`b` prefixes;
//!   adjacent literals concatenate)
//! - numbers (decimal/hex/octal/binary ints, floats, one leading sign)
//! - `True`/`False`/`None` and their JSON spellings `true`/`false`/`null`
//! - dicts, lists, tuples and sets, arbitrarily nested up to [`MAX_DEPTH`]
//!
//! Names, calls, operators and every other expression form are rejected with
//! a [`LiteralError`] that carries the byte offset of the problem. Nothing is
//! ever evaluated.

use thiserror::Error;

use crate::errors::ErrorCategory;

/// Maximum container nesting accepted before parsing is aborted.
pub const MAX_DEPTH: usize = 64;

/// A parsed literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
    Set(Vec<Literal>),
    /// Entries in source order. Later duplicates win on lookup.
    Dict(Vec<(Literal, Literal)>),
}

impl Literal {
    /// Look up a string key in a dict. Returns `None` for non-dict values.
    pub fn get(&self, key: &str) -> Option<&Literal> {
        match self {
            Literal::Dict(entries) => entries
                .iter()
                .rev()
                .find(|(k, _)| matches!(k, Literal::Str(s) if s == key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_dict(&self) -> bool {
        matches!(self, Literal::Dict(_))
    }

    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::None => "none",
            Literal::Bool(_) => "bool",
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::Str(_) => "str",
            Literal::Bytes(_) => "bytes",
            Literal::List(_) => "list",
            Literal::Tuple(_) => "tuple",
            Literal::Set(_) => "set",
            Literal::Dict(_) => "dict",
        }
    }

    fn is_hashable(&self) -> bool {
        match self {
            Literal::List(_) | Literal::Set(_) | Literal::Dict(_) => false,
            Literal::Tuple(items) => items.iter().all(Literal::is_hashable),
            _ => true,
        }
    }
}

/// A syntax error in literal text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason} at offset {offset}")]
pub struct LiteralError {
    pub offset: usize,
    pub reason: String,
}

impl LiteralError {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Extraction
    }
}

/// Parse `src` as a single literal value.
///
/// Leading and trailing whitespace is ignored; anything else after the value
/// is an error.
pub fn parse(src: &str) -> Result<Literal, LiteralError> {
    let mut parser = Parser::new(src);
    parser.skip_ws();
    let value = parser.parse_value()?;
    parser.skip_ws();
    if parser.pos < src.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

enum StrBuf {
    Text(String),
    Bytes(Vec<u8>),
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            depth: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> LiteralError {
        self.error_at(self.pos, reason)
    }

    fn error_at(&self, offset: usize, reason: impl Into<String>) -> LiteralError {
        LiteralError {
            offset,
            reason: reason.into(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{expected}'")))
        }
    }

    fn unexpected(&self, wanted: &str) -> LiteralError {
        match self.peek() {
            Some(c) => self.error(format!("expected {wanted}, found '{c}'")),
            None => self.error(format!("expected {wanted}, found end of input")),
        }
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c') {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn enter(&mut self) -> Result<(), LiteralError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error(format!("nesting deeper than {MAX_DEPTH} levels")));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_value(&mut self) -> Result<Literal, LiteralError> {
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('{') => self.parse_brace(),
            Some('[') => self.parse_list(),
            Some('(') => self.parse_paren(),
            Some('\'') | Some('"') => self.parse_strings(),
            Some(c) if c.is_ascii_digit() || c == '.' || c == '+' || c == '-' => {
                self.parse_number()
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => self.parse_word(),
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
        }
    }

    // ------------------------------------------------------------------
    // Containers
    // ------------------------------------------------------------------

    fn parse_brace(&mut self) -> Result<Literal, LiteralError> {
        self.expect('{')?;
        self.enter()?;
        self.skip_ws();
        if self.eat('}') {
            self.leave();
            return Ok(Literal::Dict(Vec::new()));
        }

        let first_at = self.pos;
        let first = self.parse_value()?;
        self.skip_ws();
        let value = if self.eat(':') {
            let mut entries = Vec::new();
            self.skip_ws();
            let v = self.parse_value()?;
            entries.push((self.hashable(first, first_at)?, v));
            loop {
                self.skip_ws();
                if self.eat('}') {
                    break;
                }
                if !self.eat(',') {
                    return Err(self.unexpected("',' or '}'"));
                }
                self.skip_ws();
                if self.eat('}') {
                    break;
                }
                let key_at = self.pos;
                let k = self.parse_value()?;
                self.skip_ws();
                self.expect(':')?;
                self.skip_ws();
                let v = self.parse_value()?;
                entries.push((self.hashable(k, key_at)?, v));
            }
            Literal::Dict(entries)
        } else {
            let mut items = vec![self.hashable(first, first_at)?];
            loop {
                self.skip_ws();
                if self.eat('}') {
                    break;
                }
                if !self.eat(',') {
                    return Err(self.unexpected("',' or '}'"));
                }
                self.skip_ws();
                if self.eat('}') {
                    break;
                }
                let item_at = self.pos;
                let item = self.parse_value()?;
                items.push(self.hashable(item, item_at)?);
            }
            Literal::Set(items)
        };
        self.leave();
        Ok(value)
    }

    fn hashable(&self, value: Literal, at: usize) -> Result<Literal, LiteralError> {
        if value.is_hashable() {
            Ok(value)
        } else {
            Err(self.error_at(at, format!("unhashable {} used as key", value.type_name())))
        }
    }

    fn parse_list(&mut self) -> Result<Literal, LiteralError> {
        self.expect('[')?;
        self.enter()?;
        let (items, _) = self.parse_items(']')?;
        self.leave();
        Ok(Literal::List(items))
    }

    fn parse_paren(&mut self) -> Result<Literal, LiteralError> {
        self.expect('(')?;
        self.enter()?;
        let (mut items, saw_comma) = self.parse_items(')')?;
        self.leave();
        // `(x)` is just a parenthesized value; `(x,)` and `()` are tuples.
        if items.len() == 1 && !saw_comma {
            return Ok(items.remove(0));
        }
        Ok(Literal::Tuple(items))
    }

    /// Comma separated values up to `close`. Returns whether any comma was seen.
    fn parse_items(&mut self, close: char) -> Result<(Vec<Literal>, bool), LiteralError> {
        let mut items = Vec::new();
        let mut saw_comma = false;
        self.skip_ws();
        if self.eat(close) {
            return Ok((items, saw_comma));
        }
        loop {
            self.skip_ws();
            items.push(self.parse_value()?);
            self.skip_ws();
            if self.eat(close) {
                break;
            }
            if !self.eat(',') {
                return Err(self.unexpected(&format!("',' or '{close}'")));
            }
            saw_comma = true;
            self.skip_ws();
            if self.eat(close) {
                break;
            }
        }
        Ok((items, saw_comma))
    }

    // ------------------------------------------------------------------
    // Words: keywords and prefixed strings
    // ------------------------------------------------------------------

    fn parse_word(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        let word_len = self
            .rest()
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(self.rest().len());
        let word = &self.src[start..start + word_len];

        let followed_by_quote = matches!(
            self.src[start + word_len..].chars().next(),
            Some('\'') | Some('"')
        );
        if followed_by_quote {
            return self.parse_strings();
        }

        self.pos += word_len;
        match word {
            "True" | "true" => Ok(Literal::Bool(true)),
            "False" | "false" => Ok(Literal::Bool(false)),
            "None" | "null" => Ok(Literal::None),
            _ => Err(self.error_at(start, format!("names are not allowed in literals: '{word}'"))),
        }
    }

    // ------------------------------------------------------------------
    // Strings
    // ------------------------------------------------------------------

    /// One or more adjacent string literals, concatenated.
    fn parse_strings(&mut self) -> Result<Literal, LiteralError> {
        let mut acc = self.parse_one_string()?;
        loop {
            let save = self.pos;
            self.skip_ws();
            if !self.at_string_start() {
                self.pos = save;
                break;
            }
            let next_at = self.pos;
            let next = self.parse_one_string()?;
            acc = match (acc, next) {
                (StrBuf::Text(mut a), StrBuf::Text(b)) => {
                    a.push_str(&b);
                    StrBuf::Text(a)
                }
                (StrBuf::Bytes(mut a), StrBuf::Bytes(b)) => {
                    a.extend_from_slice(&b);
                    StrBuf::Bytes(a)
                }
                _ => {
                    return Err(self.error_at(next_at, "cannot mix bytes and str literals"));
                }
            };
        }
        Ok(match acc {
            StrBuf::Text(s) => Literal::Str(s),
            StrBuf::Bytes(b) => Literal::Bytes(b),
        })
    }

    fn at_string_start(&self) -> bool {
        let rest = self.rest();
        let prefix_len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        if !matches!(rest[prefix_len..].chars().next(), Some('\'') | Some('"')) {
            return false;
        }
        prefix_len == 0 || is_string_prefix(&rest[..prefix_len])
    }

    fn parse_one_string(&mut self) -> Result<StrBuf, LiteralError> {
        let prefix_start = self.pos;
        let prefix_len = self
            .rest()
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(0);
        let prefix = self.src[prefix_start..prefix_start + prefix_len].to_ascii_lowercase();
        if !prefix.is_empty() && !is_string_prefix(&prefix) {
            let reason = if prefix.contains('f') {
                "formatted string literals are not allowed".to_string()
            } else {
                format!("invalid string prefix '{prefix}'")
            };
            return Err(self.error_at(prefix_start, reason));
        }
        self.pos += prefix_len;
        let raw = prefix.contains('r');
        let bytes = prefix.contains('b');

        let open_at = self.pos;
        let quote = match self.bump() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error_at(open_at, "expected string quote")),
        };
        let triple = self.peek() == Some(quote) && self.peek_nth(1) == Some(quote);
        if triple {
            self.pos += 2;
        }

        let mut buf = if bytes {
            StrBuf::Bytes(Vec::new())
        } else {
            StrBuf::Text(String::new())
        };

        loop {
            let at = self.pos;
            let c = match self.bump() {
                Some(c) => c,
                None => return Err(self.error_at(open_at, "unterminated string literal")),
            };
            if c == quote {
                if !triple {
                    break;
                }
                if self.peek() == Some(quote) && self.peek_nth(1) == Some(quote) {
                    self.pos += 2;
                    break;
                }
                self.push_char(&mut buf, c, at)?;
                continue;
            }
            if c == '\n' && !triple {
                return Err(self.error_at(open_at, "unterminated string literal"));
            }
            if c != '\\' {
                self.push_char(&mut buf, c, at)?;
                continue;
            }

            let escaped = match self.bump() {
                Some(e) => e,
                None => return Err(self.error_at(open_at, "unterminated string literal")),
            };
            if raw {
                // Raw strings keep the backslash; the escaped quote does not close.
                self.push_char(&mut buf, '\\', at)?;
                self.push_char(&mut buf, escaped, at)?;
                continue;
            }
            self.push_escape(&mut buf, escaped, at, bytes)?;
        }
        Ok(buf)
    }

    fn push_char(&self, buf: &mut StrBuf, c: char, at: usize) -> Result<(), LiteralError> {
        match buf {
            StrBuf::Text(s) => s.push(c),
            StrBuf::Bytes(b) => {
                if !c.is_ascii() {
                    return Err(self.error_at(at, "bytes can only contain ASCII literal characters"));
                }
                b.push(c as u8);
            }
        }
        Ok(())
    }

    fn push_escape(
        &mut self,
        buf: &mut StrBuf,
        escaped: char,
        at: usize,
        bytes: bool,
    ) -> Result<(), LiteralError> {
        let simple = match escaped {
            '\n' => return Ok(()),
            '\\' => Some('\\'),
            '\'' => Some('\''),
            '"' => Some('"'),
            'a' => Some('\x07'),
            'b' => Some('\x08'),
            'f' => Some('\x0c'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'v' => Some('\x0b'),
            _ => None,
        };
        if let Some(c) = simple {
            return self.push_char(buf, c, at);
        }

        match escaped {
            '0'..='7' => {
                let mut value = escaped.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            self.pos += 1;
                        }
                        None => break,
                    }
                }
                self.push_code(buf, value, at)
            }
            'x' => {
                let value = self.read_hex(2, at, "\\x")?;
                self.push_code(buf, value, at)
            }
            'u' | 'U' if !bytes => {
                let width = if escaped == 'u' { 4 } else { 8 };
                let value = self.read_hex(width, at, if width == 4 { "\\u" } else { "\\U" })?;
                self.push_code(buf, value, at)
            }
            'N' if !bytes => Err(self.error_at(at, "named unicode escapes are not supported")),
            other => {
                // Unknown escapes are kept verbatim.
                self.push_char(buf, '\\', at)?;
                self.push_char(buf, other, at)
            }
        }
    }

    fn read_hex(&mut self, width: usize, at: usize, what: &str) -> Result<u32, LiteralError> {
        let digits = self.rest().get(..width).unwrap_or("");
        if digits.len() != width || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(self.error_at(at, format!("truncated {what} escape")));
        }
        let value = u32::from_str_radix(digits, 16)
            .map_err(|_| self.error_at(at, format!("invalid {what} escape")))?;
        self.pos += width;
        Ok(value)
    }

    fn push_code(&self, buf: &mut StrBuf, value: u32, at: usize) -> Result<(), LiteralError> {
        match buf {
            StrBuf::Text(s) => {
                let c = char::from_u32(value)
                    .ok_or_else(|| self.error_at(at, format!("invalid code point {value:#x}")))?;
                s.push(c);
            }
            StrBuf::Bytes(b) => {
                let byte = u8::try_from(value)
                    .map_err(|_| self.error_at(at, "byte escape out of range"))?;
                b.push(byte);
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Numbers
    // ------------------------------------------------------------------

    fn parse_number(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        let negative = if self.eat('-') {
            true
        } else {
            self.eat('+');
            false
        };
        self.skip_ws();
        let body_start = self.pos;

        let radix = match (self.peek(), self.peek_nth(1)) {
            (Some('0'), Some('x' | 'X')) => Some(16),
            (Some('0'), Some('o' | 'O')) => Some(8),
            (Some('0'), Some('b' | 'B')) => Some(2),
            _ => None,
        };

        let value = if let Some(radix) = radix {
            self.pos += 2;
            let digits_at = self.pos;
            let digits = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
            let cleaned = strip_underscores(digits)
                .ok_or_else(|| self.error_at(digits_at, "invalid underscore in number"))?;
            if cleaned.is_empty() {
                return Err(self.error_at(digits_at, "missing digits after radix prefix"));
            }
            let magnitude = i128::from_str_radix(&cleaned, radix)
                .map_err(|_| self.error_at(body_start, format!("invalid base-{radix} integer")))?;
            Literal::Int(if negative { -magnitude } else { magnitude })
        } else {
            let int_part = self.take_while(|c| c.is_ascii_digit() || c == '_');
            let mut is_float = false;
            let mut text = strip_underscores(int_part)
                .ok_or_else(|| self.error_at(body_start, "invalid underscore in number"))?;

            if self.peek() == Some('.') {
                is_float = true;
                self.pos += 1;
                let frac_at = self.pos;
                let frac = self.take_while(|c| c.is_ascii_digit() || c == '_');
                let frac = strip_underscores(frac)
                    .ok_or_else(|| self.error_at(frac_at, "invalid underscore in number"))?;
                if text.is_empty() && frac.is_empty() {
                    return Err(self.error_at(body_start, "expected a value"));
                }
                text.push('.');
                text.push_str(&frac);
            } else if text.is_empty() {
                return Err(self.error_at(body_start, "expected a value"));
            }

            if matches!(self.peek(), Some('e' | 'E')) {
                is_float = true;
                let exp_at = self.pos;
                self.pos += 1;
                text.push('e');
                if let Some(sign @ ('+' | '-')) = self.peek() {
                    self.pos += 1;
                    text.push(sign);
                }
                let exp = self.take_while(|c| c.is_ascii_digit() || c == '_');
                let exp = strip_underscores(exp)
                    .ok_or_else(|| self.error_at(exp_at, "invalid underscore in number"))?;
                if exp.is_empty() {
                    return Err(self.error_at(exp_at, "missing exponent digits"));
                }
                text.push_str(&exp);
            }

            if is_float {
                let magnitude: f64 = text
                    .parse()
                    .map_err(|_| self.error_at(body_start, "invalid float literal"))?;
                Literal::Float(if negative { -magnitude } else { magnitude })
            } else {
                if text.len() > 1 && text.starts_with('0') && text.bytes().any(|b| b != b'0') {
                    return Err(self.error_at(
                        body_start,
                        "leading zeros in decimal integer literals are not permitted",
                    ));
                }
                let magnitude: i128 = text
                    .parse()
                    .map_err(|_| self.error_at(body_start, "integer literal out of range"))?;
                Literal::Int(if negative { -magnitude } else { magnitude })
            }
        };

        match self.peek() {
            Some('j' | 'J') => Err(self.error_at(start, "complex numbers are not supported")),
            Some(c) if c.is_ascii_alphanumeric() || c == '_' => {
                Err(self.error(format!("invalid character '{c}' in number")))
            }
            _ => Ok(value),
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }
}

fn is_string_prefix(prefix: &str) -> bool {
    matches!(
        prefix.to_ascii_lowercase().as_str(),
        "r" | "u" | "b" | "br" | "rb"
    )
}

/// Remove digit-group underscores; `None` if an underscore is misplaced.
fn strip_underscores(digits: &str) -> Option<String> {
    if digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return None;
    }
    Some(digits.replace('_', ""))
}

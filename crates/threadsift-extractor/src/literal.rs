//! Permissive literal decoder
//!
//! Accepts the data-literal dialect generative services fall into when they
//! drift from strict JSON: single- or double-quoted strings, `True`/`False`/
//! `None` alongside `true`/`false`/`null`, tuples, trailing commas in any
//! container and adjacent string literals (`"a" "b"`). Produces a
//! `serde_json::Value` so the result flows through the same field mapping as
//! a strict decode.

use serde_json::{Map, Number, Value};

/// Deepest container nesting accepted, matching `serde_json`'s recursion limit
pub const MAX_DEPTH: usize = 128;

/// Decode `text` as a single literal value
pub fn decode_literal(text: &str) -> Result<Value, String> {
    let mut parser = LiteralParser::new(text);
    parser.skip_ws();
    let value = parser.value()?;
    parser.skip_ws();
    if let Some(c) = parser.peek() {
        return Err(parser.error(&format!("unexpected trailing '{}'", c)));
    }
    Ok(value)
}

struct LiteralParser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl LiteralParser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn error(&self, message: &str) -> String {
        format!("{} at char {}", message, self.pos)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), String> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(&format!("expected '{}', found '{}'", expected, c))),
            None => Err(self.error(&format!("expected '{}', found end of input", expected))),
        }
    }

    fn value(&mut self) -> Result<Value, String> {
        match self.peek() {
            Some('{') => self.nested(|p| p.mapping()),
            Some('[') => self.nested(|p| p.sequence('[', ']')),
            Some('(') => self.nested(|p| p.sequence('(', ')')),
            Some('\'') | Some('"') => self.strings().map(Value::String),
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.number(),
            Some(c) if c.is_alphabetic() => self.word(),
            Some(c) => Err(self.error(&format!("unexpected '{}'", c))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn nested(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<Value, String>,
    ) -> Result<Value, String> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn mapping(&mut self) -> Result<Value, String> {
        self.expect('{')?;
        let mut map = Map::new();
        loop {
            self.skip_ws();
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(Value::Object(map));
            }

            let key = match self.value()? {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => return Err(self.error(&format!("unsupported key {}", other))),
            };
            self.skip_ws();
            self.expect(':')?;
            self.skip_ws();
            let value = self.value()?;
            map.insert(key, value);

            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(Value::Object(map)),
                Some(c) => return Err(self.error(&format!("expected ',' or '}}', found '{}'", c))),
                None => return Err(self.error("unterminated mapping")),
            }
        }
    }

    fn sequence(&mut self, open: char, close: char) -> Result<Value, String> {
        self.expect(open)?;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(Value::Array(items));
            }

            items.push(self.value()?);

            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(c) if c == close => return Ok(Value::Array(items)),
                Some(c) => {
                    return Err(self.error(&format!("expected ',' or '{}', found '{}'", close, c)))
                }
                None => return Err(self.error("unterminated sequence")),
            }
        }
    }

    /// One or more adjacent string literals, concatenated
    fn strings(&mut self) -> Result<String, String> {
        let mut out = self.string()?;
        loop {
            let save = self.pos;
            self.skip_ws();
            match self.peek() {
                Some('\'') | Some('"') => out.push_str(&self.string()?),
                _ => {
                    self.pos = save;
                    return Ok(out);
                }
            }
        }
    }

    fn string(&mut self) -> Result<String, String> {
        let quote = self.bump().ok_or_else(|| self.error("expected string"))?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => {
                    let escaped = self.bump().ok_or_else(|| self.error("dangling escape"))?;
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '0' => out.push('\0'),
                        'u' => out.push(self.unicode_escape()?),
                        // \\ \' \" and unknown escapes keep the escaped char
                        other => out.push(other),
                    }
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn unicode_escape(&mut self) -> Result<char, String> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("invalid \\u escape"))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or_else(|| self.error("invalid code point"))
    }

    fn number(&mut self) -> Result<Value, String> {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E' | '_')
        ) {
            self.pos += 1;
        }
        let raw: String = self.chars[start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();

        if let Ok(n) = raw.parse::<i64>() {
            return Ok(Value::Number(n.into()));
        }
        raw.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| self.error(&format!("invalid number '{}'", raw)))
    }

    fn word(&mut self) -> Result<Value, String> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "True" | "true" => Ok(Value::Bool(true)),
            "False" | "false" => Ok(Value::Bool(false)),
            "None" | "null" => Ok(Value::Null),
            _ => {
                self.pos = start;
                Err(self.error(&format!("unknown name '{}'", word)))
            }
        }
    }
}

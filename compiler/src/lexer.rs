use std::io::BufRead;

use log::trace;

use crate::token::{self, Token};

/// Pull-based tokenizer with one character of lookahead.
///
/// The text of the last identifier and the value of the last number are kept
/// on the scanner and overwritten by every call to [`Scanner::next_token`].
pub struct Scanner<I: Iterator<Item = char>> {
    chars: I,
    last_char: Option<char>,
    identifier: String,
    number: f64,
}

impl<'a> Scanner<std::str::Chars<'a>> {
    pub fn from_source(source: &'a str) -> Self {
        Scanner::new(source.chars())
    }
}

/// Decodes `reader` as UTF-8 one line at a time, so characters become
/// available as soon as a line is entered. Reading stops at the first I/O
/// or decoding error.
pub fn reader_chars<R: BufRead>(reader: R) -> impl Iterator<Item = char> {
    reader.lines().map_while(Result::ok).flat_map(|line| {
        let mut chars: Vec<char> = line.chars().collect();
        chars.push('\n');
        chars
    })
}

impl<I: Iterator<Item = char>> Scanner<I> {
    pub fn new(chars: I) -> Self {
        Self {
            chars,
            // Primed with whitespace so the first call reads from the source.
            last_char: Some(' '),
            identifier: String::new(),
            number: 0.0,
        }
    }

    /// Text of the most recent [`Token::Identifier`].
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Value of the most recent [`Token::Number`].
    pub fn number(&self) -> f64 {
        self.number
    }

    fn advance(&mut self) {
        self.last_char = self.chars.next();
    }

    pub fn next_token(&mut self) -> Token {
        let token = self.scan();
        trace!("scanned {:?}", token);
        token
    }

    fn scan(&mut self) -> Token {
        loop {
            while matches!(self.last_char, Some(c) if c.is_whitespace()) {
                self.advance();
            }

            let Some(c) = self.last_char else {
                return Token::Eof;
            };

            if c.is_alphabetic() {
                self.identifier.clear();
                self.identifier.push(c);
                self.advance();

                while let Some(c) = self.last_char.filter(|c| c.is_alphanumeric()) {
                    self.identifier.push(c);
                    self.advance();
                }

                return token::keyword(&self.identifier).unwrap_or(Token::Identifier);
            }

            if c.is_ascii_digit() || c == '.' {
                let mut text = String::new();

                while let Some(c) = self.last_char.filter(|c| c.is_ascii_digit() || *c == '.') {
                    text.push(c);
                    self.advance();
                }

                self.number = parse_number_prefix(&text);
                return Token::Number;
            }

            if c == '#' {
                while !matches!(self.last_char, None | Some('\n') | Some('\r')) {
                    self.advance();
                }
                continue;
            }

            self.advance();
            return Token::Char(c);
        }
    }
}

/// Converts digit/dot text the way C's `strtod` would: the longest prefix
/// that forms a valid decimal is used and the rest ignored. Text with no
/// valid prefix converts to zero.
pub fn parse_number_prefix(text: &str) -> f64 {
    let end = text
        .match_indices('.')
        .nth(1)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());

    text[..end].parse::<f64>().unwrap_or(0.0)
}

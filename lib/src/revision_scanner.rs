// Copyright 2025 The gitrev Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tokenizer for revision expressions.

/// Classification of a [`Token`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TokenKind {
    /// End of input. Returned repeatedly once the input is exhausted.
    Eof,
    /// Run of alphabetic characters.
    Word,
    /// Run of ASCII digits.
    Number,
    /// Run of whitespace characters.
    Space,
    /// Single control character.
    Control,
    /// `:`
    Colon,
    /// `~`
    Tilde,
    /// `^`
    Caret,
    /// `.`
    Dot,
    /// `/`
    Slash,
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
    /// `-`
    Minus,
    /// `@`
    At,
    /// `\`
    Backslash,
    /// `?`
    QuestionMark,
    /// `*`
    Asterisk,
    /// `[`
    OpenBracket,
    /// `!`
    Bang,
    /// Any other single character.
    Other,
}

impl TokenKind {
    fn from_punct(c: char) -> Option<Self> {
        let kind = match c {
            ':' => Self::Colon,
            '~' => Self::Tilde,
            '^' => Self::Caret,
            '.' => Self::Dot,
            '/' => Self::Slash,
            '{' => Self::OpenBrace,
            '}' => Self::CloseBrace,
            '-' => Self::Minus,
            '@' => Self::At,
            '\\' => Self::Backslash,
            '?' => Self::QuestionMark,
            '*' => Self::Asterisk,
            '[' => Self::OpenBracket,
            '!' => Self::Bang,
            _ => return None,
        };
        Some(kind)
    }
}

/// Classified lexical unit borrowing its text from the input.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Token<'i> {
    /// Token classification.
    pub kind: TokenKind,
    /// Source text of the token. Empty for [`TokenKind::Eof`].
    pub text: &'i str,
}

impl<'i> Token<'i> {
    const EOF: Self = Self {
        kind: TokenKind::Eof,
        text: "",
    };

    /// Whether this token terminates a reference name.
    pub fn is_suffix_or_eof(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Eof | TokenKind::At | TokenKind::Colon | TokenKind::Tilde | TokenKind::Caret
        )
    }
}

/// Splits revision text into tokens, with one token of pushback.
#[derive(Clone, Debug)]
pub struct Scanner<'i> {
    source: &'i str,
    pos: usize,
    last: Token<'i>,
    replay: bool,
}

impl<'i> Scanner<'i> {
    /// Creates scanner positioned at the start of `source`.
    pub fn new(source: &'i str) -> Self {
        Self {
            source,
            pos: 0,
            last: Token::EOF,
            replay: false,
        }
    }

    /// Returns the next token, or the pushed-back one if [`Self::unscan()`]
    /// was called.
    pub fn scan(&mut self) -> Token<'i> {
        if self.replay {
            self.replay = false;
            return self.last;
        }
        self.last = self.next_token();
        self.last
    }

    /// Pushes the last scanned token back so the next [`Self::scan()`]
    /// returns it again. Only one token can be pushed back.
    pub fn unscan(&mut self) {
        debug_assert!(!self.replay, "only one token can be pushed back");
        tracing::trace!(token = ?self.last, "unscan");
        self.replay = true;
    }

    fn next_token(&mut self) -> Token<'i> {
        let rest = &self.source[self.pos..];
        let Some(c) = rest.chars().next() else {
            return Token::EOF;
        };
        let (kind, len) = if let Some(kind) = TokenKind::from_punct(c) {
            (kind, c.len_utf8())
        } else if c.is_whitespace() {
            (TokenKind::Space, run_len(rest, char::is_whitespace))
        } else if c.is_control() {
            (TokenKind::Control, c.len_utf8())
        } else if c.is_alphabetic() {
            (TokenKind::Word, run_len(rest, char::is_alphabetic))
        } else if c.is_ascii_digit() {
            (TokenKind::Number, run_len(rest, |c| c.is_ascii_digit()))
        } else {
            (TokenKind::Other, c.len_utf8())
        };
        let text = &rest[..len];
        self.pos += len;
        Token { kind, text }
    }
}

fn run_len(text: &str, pred: impl Fn(char) -> bool) -> usize {
    text.find(|c| !pred(c)).unwrap_or(text.len())
}

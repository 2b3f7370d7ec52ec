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

//! Parser for revision expressions like `master~3^{/fix bug}:path`.

use std::io;
use std::io::Read;
use std::string::FromUtf8Error;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::ref_name::RefName;
use crate::ref_name::RefNameError;
use crate::revision::DATE_FORMAT;
use crate::revision::DescriptionPattern;
use crate::revision::ObjectKind;
use crate::revision::RevisionOp;
use crate::revision_scanner::Scanner;
use crate::revision_scanner::TokenKind;

/// Maximum size of a revision expression in bytes.
pub const MAX_REVISION_LENGTH: usize = 128 * 1024;

const CARET_BRACE: &str = "^{<data>}";
const AT_BRACE: &str = "@{<data>}";
const AT_CHECKOUT_BRACE: &str = "@{-n}";

/// Error occurred while parsing a revision expression.
///
/// Two errors compare equal if their messages are equal.
#[derive(Debug, Error)]
#[error("Revision invalid : {kind}")]
pub struct RevisionParseError {
    kind: Box<RevisionParseErrorKind>,
}

/// Cause of [`RevisionParseError`]. The rendered kind is the error message.
#[derive(Debug, Error)]
pub enum RevisionParseErrorKind {
    /// Reference name breaks the naming rules.
    #[error(transparent)]
    InvalidRefName(#[from] RefNameError),
    /// A reference name appears after the first operation.
    #[error("reference must be defined once at the beginning")]
    DuplicateReference,
    /// `~` or `^` without a starting reference.
    #[error(r#""~" or "^" statement must have a reference defined at the beginning"#)]
    MissingReference,
    /// `@{...}` form used after another suffix.
    #[error(r#""@" statement is not valid, could be : {usage}"#)]
    MisplacedAt {
        /// Valid spellings of the form.
        usage: &'static str,
    },
    /// `:/...` or `:<n>:...` form used after a reference or suffix.
    #[error(r#"":" statement is not valid, could be : {usage}"#)]
    MisplacedColon {
        /// Valid spelling of the form.
        usage: &'static str,
    },
    /// `^<n>` with `n` other than 0, 1 or 2.
    #[error(r#""{0}" found must be 0, 1 or 2 after "^""#)]
    InvalidParentNumber(String),
    /// `^{...}` with unknown content.
    #[error(r#""{0}" is not a valid revision suffix brace component"#)]
    InvalidBraceComponent(String),
    /// `{` without matching `}`.
    #[error(r#"missing "}}" in {structure} structure"#)]
    UnclosedBrace {
        /// Form the brace was opened for.
        structure: &'static str,
    },
    /// Regex content starts with `!` followed by anything but `-` or `!`.
    #[error(
        r#"revision suffix brace component sequences starting with "/!" others than those defined are reserved"#
    )]
    ReservedRegexPrefix,
    /// Regex content failed to compile.
    #[error("revision suffix brace component, error parsing regexp: {0}")]
    InvalidRegex(#[source] regex::Error),
    /// `@{...}` content is neither a known keyword nor a timestamp.
    #[error(r#"wrong date "{0}" must fit ISO-8601 format : 2006-01-02T15:04:05Z"#)]
    InvalidDate(String),
    /// Digit run doesn't fit in the operation's counter.
    #[error(r#""{0}" is not a valid number"#)]
    InvalidNumber(String),
    /// Input exceeds [`MAX_REVISION_LENGTH`].
    #[error("revision is longer than {max} bytes")]
    TooLong {
        /// Length limit in bytes.
        max: usize,
    },
    /// Reading the input failed.
    #[error("failed to read revision")]
    Io(#[source] io::Error),
    /// Input isn't UTF-8.
    #[error("revision is not valid UTF-8")]
    InvalidUtf8(#[source] FromUtf8Error),
}

impl RevisionParseError {
    /// Category of this error.
    pub fn kind(&self) -> &RevisionParseErrorKind {
        &self.kind
    }

    /// Error message without the `Revision invalid` prefix.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl From<RevisionParseErrorKind> for RevisionParseError {
    fn from(kind: RevisionParseErrorKind) -> Self {
        Self {
            kind: Box::new(kind),
        }
    }
}

impl From<RefNameError> for RevisionParseError {
    fn from(err: RefNameError) -> Self {
        RevisionParseErrorKind::from(err).into()
    }
}

impl PartialEq for RevisionParseError {
    fn eq(&self, other: &Self) -> bool {
        self.message() == other.message()
    }
}

impl Eq for RevisionParseError {}

/// Position of the parser relative to the suffix operators.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum SuffixState {
    /// Only a reference (if any) has been seen.
    NoSuffixYet,
    /// At least one suffix operator has been seen.
    SuffixConsumed,
}

/// Recursive-descent parser over a single revision expression.
///
/// [`Self::parse()`] parses the whole expression. The `parse_*` sub-rules
/// parse one operation starting right after its operator character, which
/// is useful to drive grammar fragments directly.
#[derive(Clone, Debug)]
pub struct RevisionParser<'i> {
    scanner: Scanner<'i>,
}

impl<'i> RevisionParser<'i> {
    /// Creates parser for `text`.
    pub fn new(text: &'i str) -> Self {
        Self {
            scanner: Scanner::new(text),
        }
    }

    /// Parses the remaining input into operations, then checks that each
    /// operation is allowed at its position.
    ///
    /// Empty input means `HEAD`.
    pub fn parse(&mut self) -> Result<Vec<RevisionOp>, RevisionParseError> {
        let mut ops = Vec::new();
        loop {
            let token = self.scanner.scan();
            let op = match token.kind {
                TokenKind::Eof => break,
                TokenKind::At => self.parse_at()?,
                TokenKind::Tilde => self.parse_tilde()?,
                TokenKind::Caret => self.parse_caret()?,
                TokenKind::Colon => self.parse_colon()?,
                _ => {
                    self.scanner.unscan();
                    self.parse_ref()?
                }
            };
            ops.push(op);
        }
        if ops.is_empty() {
            ops.push(RevisionOp::Reference(RefName::HEAD.to_owned()));
        }
        check_positions(&ops)?;
        Ok(ops)
    }

    /// Parses `@` suffix: `@{<n>}`, `@{-<n>}`, `@{upstream}`, `@{u}`,
    /// `@{push}`, `@{<date>}`, or bare `@` meaning `HEAD`.
    pub fn parse_at(&mut self) -> Result<RevisionOp, RevisionParseError> {
        if self.scanner.scan().kind != TokenKind::OpenBrace {
            self.scanner.unscan();
            return Ok(RevisionOp::Reference(RefName::HEAD.to_owned()));
        }

        let token = self.scanner.scan();
        if token.kind == TokenKind::CloseBrace {
            return Err(RevisionParseErrorKind::InvalidDate(String::new()).into());
        }
        let next = self.scanner.scan();
        match (token.kind, next.kind) {
            (TokenKind::Word, TokenKind::CloseBrace) if matches!(token.text, "u" | "upstream") => {
                Ok(RevisionOp::AtUpstream)
            }
            (TokenKind::Word, TokenKind::CloseBrace) if token.text == "push" => {
                Ok(RevisionOp::AtPush)
            }
            (TokenKind::Number, TokenKind::CloseBrace) => {
                Ok(RevisionOp::AtReflog(parse_number(token.text)?))
            }
            (TokenKind::Minus, TokenKind::Number) => {
                let n = parse_number(next.text)?;
                if self.scanner.scan().kind != TokenKind::CloseBrace {
                    return Err(RevisionParseErrorKind::UnclosedBrace {
                        structure: AT_CHECKOUT_BRACE,
                    }
                    .into());
                }
                Ok(RevisionOp::AtCheckout(n))
            }
            _ => {
                self.scanner.unscan();
                let mut content = token.text.to_owned();
                content.push_str(&self.scan_until_close_brace(AT_BRACE)?);
                Ok(parse_date(&content)?)
            }
        }
    }

    /// Parses `~` suffix: `~<n>`, or bare `~` meaning `~1`.
    pub fn parse_tilde(&mut self) -> Result<RevisionOp, RevisionParseError> {
        let token = self.scanner.scan();
        if token.kind == TokenKind::Number {
            Ok(RevisionOp::TildePath(parse_number(token.text)?))
        } else {
            self.scanner.unscan();
            Ok(RevisionOp::TildePath(1))
        }
    }

    /// Parses `^` suffix: `^<n>`, `^{<kind>}`, `^{}`, `^{/<regex>}`, or bare
    /// `^` meaning `^1`.
    pub fn parse_caret(&mut self) -> Result<RevisionOp, RevisionParseError> {
        let token = self.scanner.scan();
        match token.kind {
            TokenKind::OpenBrace => self.parse_caret_braces(),
            TokenKind::Number => match parse_single_digit(token.text) {
                Some(n @ 0..=2) => Ok(RevisionOp::CaretPath(n)),
                _ => {
                    Err(RevisionParseErrorKind::InvalidParentNumber(token.text.to_owned()).into())
                }
            },
            _ => {
                self.scanner.unscan();
                Ok(RevisionOp::CaretPath(1))
            }
        }
    }

    fn parse_caret_braces(&mut self) -> Result<RevisionOp, RevisionParseError> {
        let token = self.scanner.scan();
        match token.kind {
            TokenKind::CloseBrace => Ok(RevisionOp::CaretType(ObjectKind::Tag)),
            TokenKind::Slash => {
                let content = self.scan_until_close_brace(CARET_BRACE)?;
                Ok(RevisionOp::CaretReg(parse_description_pattern(&content)?))
            }
            _ => {
                self.scanner.unscan();
                let content = self.scan_until_close_brace(CARET_BRACE)?;
                let kind = ObjectKind::from_name(&content)
                    .ok_or(RevisionParseErrorKind::InvalidBraceComponent(content))?;
                Ok(RevisionOp::CaretType(kind))
            }
        }
    }

    /// Parses `:` suffix: `:/<regex>`, `:<stage>:<path>`, or `:<path>`. The
    /// regex or path extends to the end of input.
    pub fn parse_colon(&mut self) -> Result<RevisionOp, RevisionParseError> {
        let token = self.scanner.scan();
        match token.kind {
            TokenKind::Slash => {
                let content = self.scan_to_end();
                Ok(RevisionOp::ColonReg(parse_description_pattern(&content)?))
            }
            TokenKind::Number => {
                if let Some(stage @ 0..=3) = parse_single_digit(token.text) {
                    if self.scanner.scan().kind == TokenKind::Colon {
                        let path = self.scan_to_end();
                        return Ok(RevisionOp::ColonStagePath { path, stage });
                    }
                    self.scanner.unscan();
                }
                let mut path = token.text.to_owned();
                path.push_str(&self.scan_to_end());
                Ok(RevisionOp::ColonPath(path))
            }
            _ => {
                self.scanner.unscan();
                Ok(RevisionOp::ColonPath(self.scan_to_end()))
            }
        }
    }

    /// Parses reference name up to the next suffix operator or end of input,
    /// and validates it.
    pub fn parse_ref(&mut self) -> Result<RevisionOp, RevisionParseError> {
        let mut name = String::new();
        loop {
            let token = self.scanner.scan();
            if token.is_suffix_or_eof() {
                self.scanner.unscan();
                break;
            }
            name.push_str(token.text);
        }
        RefName::new(&name).validate()?;
        Ok(RevisionOp::Reference(name.into()))
    }

    fn scan_until_close_brace(
        &mut self,
        structure: &'static str,
    ) -> Result<String, RevisionParseErrorKind> {
        let mut content = String::new();
        loop {
            let token = self.scanner.scan();
            match token.kind {
                TokenKind::CloseBrace => return Ok(content),
                TokenKind::Eof => return Err(RevisionParseErrorKind::UnclosedBrace { structure }),
                _ => content.push_str(token.text),
            }
        }
    }

    fn scan_to_end(&mut self) -> String {
        let mut content = String::new();
        loop {
            let token = self.scanner.scan();
            if token.kind == TokenKind::Eof {
                return content;
            }
            content.push_str(token.text);
        }
    }
}

/// Parses revision expression.
#[tracing::instrument(level = "debug")]
pub fn parse_revision(text: &str) -> Result<Vec<RevisionOp>, RevisionParseError> {
    if text.len() > MAX_REVISION_LENGTH {
        return Err(RevisionParseErrorKind::TooLong {
            max: MAX_REVISION_LENGTH,
        }
        .into());
    }
    RevisionParser::new(text)
        .parse()
        .inspect(|ops| tracing::debug!(?ops, "parsed revision"))
        .inspect_err(|err| tracing::debug!(%err, "rejected revision"))
}

/// Reads revision expression from `reader` and parses it. At most
/// [`MAX_REVISION_LENGTH`] bytes are accepted.
#[tracing::instrument(level = "debug", skip(reader))]
pub fn read_revision(reader: impl Read) -> Result<Vec<RevisionOp>, RevisionParseError> {
    let mut buf = Vec::new();
    reader
        .take(MAX_REVISION_LENGTH as u64 + 1)
        .read_to_end(&mut buf)
        .map_err(RevisionParseErrorKind::Io)?;
    if buf.len() > MAX_REVISION_LENGTH {
        return Err(RevisionParseErrorKind::TooLong {
            max: MAX_REVISION_LENGTH,
        }
        .into());
    }
    let text = String::from_utf8(buf).map_err(RevisionParseErrorKind::InvalidUtf8)?;
    parse_revision(&text)
}

/// Checks that each operation appears where the grammar allows it.
///
/// This runs after the whole input has been parsed, so syntax errors
/// anywhere in the input are reported before misplaced operations.
fn check_positions(ops: &[RevisionOp]) -> Result<(), RevisionParseErrorKind> {
    let mut has_reference = false;
    let mut state = SuffixState::NoSuffixYet;
    for (i, op) in ops.iter().enumerate() {
        match op {
            RevisionOp::Reference(_) if i == 0 => {
                has_reference = true;
                continue;
            }
            RevisionOp::Reference(_) => {
                return Err(RevisionParseErrorKind::DuplicateReference);
            }
            RevisionOp::TildePath(_)
            | RevisionOp::CaretPath(_)
            | RevisionOp::CaretType(_)
            | RevisionOp::CaretReg(_) => {
                if !has_reference {
                    return Err(RevisionParseErrorKind::MissingReference);
                }
            }
            RevisionOp::ColonPath(_) => {}
            RevisionOp::ColonStagePath { .. } => {
                if i != 0 {
                    return Err(RevisionParseErrorKind::MisplacedColon {
                        usage: ":<n>:<path>",
                    });
                }
            }
            RevisionOp::ColonReg(_) => {
                if i != 0 {
                    return Err(RevisionParseErrorKind::MisplacedColon {
                        usage: ":/<regexp>",
                    });
                }
            }
            RevisionOp::AtCheckout(_) => {
                if i != 0 {
                    return Err(RevisionParseErrorKind::MisplacedAt { usage: "@{-<n>}" });
                }
            }
            RevisionOp::AtDate(_) => check_at_before_suffix(
                state,
                "<refname>@{<ISO-8601 date>}, @{<ISO-8601 date>}",
            )?,
            RevisionOp::AtReflog(_) => check_at_before_suffix(state, "<refname>@{<n>}, @{<n>}")?,
            RevisionOp::AtUpstream => check_at_before_suffix(
                state,
                "<refname>@{upstream}, @{upstream}, <refname>@{u}, @{u}",
            )?,
            RevisionOp::AtPush => check_at_before_suffix(state, "<refname>@{push}, @{push}")?,
        }
        state = SuffixState::SuffixConsumed;
    }
    Ok(())
}

fn check_at_before_suffix(
    state: SuffixState,
    usage: &'static str,
) -> Result<(), RevisionParseErrorKind> {
    match state {
        SuffixState::NoSuffixYet => Ok(()),
        SuffixState::SuffixConsumed => Err(RevisionParseErrorKind::MisplacedAt { usage }),
    }
}

/// Decodes the `!-` (negate) and `!!` (literal `!`) prefixes of regex
/// content, then compiles the pattern.
fn parse_description_pattern(
    content: &str,
) -> Result<DescriptionPattern, RevisionParseErrorKind> {
    let (pattern, negate) = if let Some(rest) = content.strip_prefix("!-") {
        (rest, true)
    } else if content.starts_with("!!") {
        (&content[1..], false)
    } else if content.starts_with('!') {
        return Err(RevisionParseErrorKind::ReservedRegexPrefix);
    } else {
        (content, false)
    };
    DescriptionPattern::new(pattern, negate).map_err(RevisionParseErrorKind::InvalidRegex)
}

/// Layout of a `@{<date>}` timestamp, `d` standing for an ASCII digit.
const DATE_SHAPE: &[u8; 20] = b"dddd-dd-ddTdd:dd:ddZ";

fn parse_date(content: &str) -> Result<RevisionOp, RevisionParseErrorKind> {
    let invalid = || RevisionParseErrorKind::InvalidDate(content.to_owned());
    // chrono accepts short fields, signs, padding, and leap seconds, none of
    // which fit the fixed layout.
    if !has_date_shape(content) {
        return Err(invalid());
    }
    let date = NaiveDateTime::parse_from_str(content, DATE_FORMAT).map_err(|_| invalid())?;
    Ok(RevisionOp::AtDate(date.and_utc()))
}

fn has_date_shape(content: &str) -> bool {
    let bytes = content.as_bytes();
    bytes.len() == DATE_SHAPE.len()
        && bytes.iter().zip(DATE_SHAPE).all(|(&b, &shape)| match shape {
            b'd' => b.is_ascii_digit(),
            _ => b == shape,
        })
        && &bytes[17..19] != b"60"
}

fn parse_number(text: &str) -> Result<u32, RevisionParseErrorKind> {
    text.parse()
        .map_err(|_| RevisionParseErrorKind::InvalidNumber(text.to_owned()))
}

fn parse_single_digit(text: &str) -> Option<u8> {
    match text.as_bytes() {
        &[b @ b'0'..=b'9'] => Some(b - b'0'),
        _ => None,
    }
}

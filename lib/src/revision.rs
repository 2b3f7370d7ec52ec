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

//! Operations a revision expression is made of.
//!
//! A parsed revision is a `Vec<RevisionOp>` to be applied left to right by a
//! resolver. Each operation can be rendered back to the expression syntax, so
//! [`format_revision()`] followed by parsing yields the same operations.

use std::fmt;
use std::fmt::Debug;
use std::fmt::Display;

use chrono::DateTime;
use chrono::Utc;
use itertools::Itertools as _;
use regex::Regex;

use crate::ref_name::RefNameBuf;

/// Timestamp format accepted in `@{<date>}`.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Object type named in `^{<kind>}`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ObjectKind {
    /// `commit`
    Commit,
    /// `tree`
    Tree,
    /// `blob`
    Blob,
    /// `tag`
    Tag,
    /// `object`
    Object,
}

impl ObjectKind {
    /// All kinds in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Commit,
        Self::Tree,
        Self::Blob,
        Self::Tag,
        Self::Object,
    ];

    /// Looks up kind by its lowercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Lowercase name of this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Tree => "tree",
            Self::Blob => "blob",
            Self::Tag => "tag",
            Self::Object => "object",
        }
    }
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Regular expression tested against commit descriptions, possibly negated.
#[derive(Clone)]
pub struct DescriptionPattern {
    regex: Regex,
    negate: bool,
}

impl DescriptionPattern {
    /// Compiles `pattern`. If `negate` is true, [`Self::is_match()`] selects
    /// descriptions the regex doesn't match.
    pub fn new(pattern: &str, negate: bool) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        Ok(Self { regex, negate })
    }

    /// Returns the source of the regular expression.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns the compiled regular expression.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Whether the match result is inverted.
    pub fn is_negated(&self) -> bool {
        self.negate
    }

    /// Returns true if `description` is selected by this pattern.
    pub fn is_match(&self, description: &str) -> bool {
        self.regex.is_match(description) != self.negate
    }
}

// Regex doesn't implement Eq. Patterns compiled from the same source behave
// the same.
impl PartialEq for DescriptionPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str() && self.negate == other.negate
    }
}

impl Eq for DescriptionPattern {}

impl Debug for DescriptionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptionPattern")
            .field("pattern", &self.as_str())
            .field("negate", &self.negate)
            .finish()
    }
}

impl Display for DescriptionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pattern = self.as_str();
        if self.negate {
            write!(f, "!-{pattern}")
        } else if pattern.starts_with('!') {
            // "!!" is decoded back to a single "!"
            write!(f, "!{pattern}")
        } else {
            f.write_str(pattern)
        }
    }
}

/// Single step of a revision expression.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RevisionOp {
    /// `<refname>`, or `HEAD` for a bare `@`.
    Reference(RefNameBuf),
    /// `~<n>`: n-th ancestor following first parents.
    TildePath(u32),
    /// `^<n>`: n-th parent, where `^0` is the commit itself.
    CaretPath(u8),
    /// `^{<kind>}`: peels to the given object type.
    CaretType(ObjectKind),
    /// `^{/<regex>}`: youngest ancestor whose description matches.
    CaretReg(DescriptionPattern),
    /// `:<path>`: path within the tree.
    ColonPath(String),
    /// `:<stage>:<path>`: path at the given merge stage.
    ColonStagePath {
        /// Path within the index.
        path: String,
        /// Merge stage in `0..=3`.
        stage: u8,
    },
    /// `:/<regex>`: youngest commit reachable from any ref whose description
    /// matches.
    ColonReg(DescriptionPattern),
    /// `@{<date>}`: value of the ref at the given time.
    AtDate(DateTime<Utc>),
    /// `@{<n>}`: n-th prior value of the ref.
    AtReflog(u32),
    /// `@{-<n>}`: n-th previously checked-out branch.
    AtCheckout(u32),
    /// `@{upstream}` or `@{u}`
    AtUpstream,
    /// `@{push}`
    AtPush,
}

impl Display for RevisionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference(name) => write!(f, "{name}"),
            Self::TildePath(n) => write!(f, "~{n}"),
            Self::CaretPath(n) => write!(f, "^{n}"),
            Self::CaretType(kind) => write!(f, "^{{{kind}}}"),
            Self::CaretReg(pattern) => write!(f, "^{{/{pattern}}}"),
            Self::ColonPath(path) => write!(f, ":{path}"),
            Self::ColonStagePath { path, stage } => write!(f, ":{stage}:{path}"),
            Self::ColonReg(pattern) => write!(f, ":/{pattern}"),
            Self::AtDate(date) => write!(f, "@{{{}}}", date.format(DATE_FORMAT)),
            Self::AtReflog(n) => write!(f, "@{{{n}}}"),
            Self::AtCheckout(n) => write!(f, "@{{-{n}}}"),
            Self::AtUpstream => f.write_str("@{upstream}"),
            Self::AtPush => f.write_str("@{push}"),
        }
    }
}

/// Renders operations back to a revision expression.
pub fn format_revision(ops: &[RevisionOp]) -> String {
    ops.iter().join("")
}

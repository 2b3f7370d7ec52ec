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

//! Name types for references.
//!
//! Name types can be constructed from a string:
//! ```
//! # use gitrev_lib::ref_name::*;
//! let _: RefNameBuf = "main".into();
//! let _: &RefName = "refs/heads/main".as_ref();
//! ```
//!
//! Construction doesn't validate the name. Use [`RefName::validate()`] to
//! check it against the `git check-ref-format` rules the revision parser
//! enforces.

use std::borrow::Borrow;
use std::fmt;
use std::fmt::Display;
use std::ops::Deref;

use ref_cast::RefCastCustom;
use ref_cast::ref_cast_custom;
use thiserror::Error;

/// Owned reference name (e.g. `main`, `refs/tags/v1.0.0`, or a short hash.)
///
/// Use `.as_str()` for displaying. Other than that, this can be considered an
/// immutable `String`.
// Eq, Hash, and Ord must be compatible with RefName.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RefNameBuf(String);

/// Borrowed reference name.
///
/// Use `.as_str()` for displaying. Other than that, this can be considered an
/// immutable `str`.
#[derive(Debug, Eq, Hash, Ord, PartialEq, PartialOrd, RefCastCustom)]
#[repr(transparent)]
pub struct RefName(str);

/// Structural violation of the reference naming rules.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum RefNameError {
    /// Name starts with `.` or `/`.
    #[error(r#"must not start with "{0}""#)]
    StartsWith(char),
    /// Name ends with `.` or `/`.
    #[error(r#"must not end with "{0}""#)]
    EndsWith(char),
    /// Name contains a forbidden character or sequence.
    #[error(r#"must not contains "{0}""#)]
    Contains(String),
    /// Name contains `//`.
    #[error(r#"must not contains consecutively "/""#)]
    ConsecutiveSlashes,
    /// A path component ends with `.lock`.
    #[error("cannot end with .lock")]
    LockSuffix,
}

const LOCK_SUFFIX: &str = ".lock";

fn is_forbidden_char(c: char) -> bool {
    c.is_control() || matches!(c, '*' | '?' | '\\' | '[')
}

impl RefNameBuf {
    /// Consumes this and returns the underlying string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl RefName {
    /// Name of the current checkout.
    pub const HEAD: &Self = Self::new("HEAD");

    /// Wraps string name.
    #[ref_cast_custom]
    pub const fn new(name: &str) -> &Self;

    /// Returns the underlying string.
    pub const fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks that this name is a well-formed reference name.
    ///
    /// The name is scanned left to right and the first offending position is
    /// reported, so `test..` fails on the `..` before its trailing `.` is
    /// seen. Rules that only apply to the end of the name are checked last.
    pub fn validate(&self) -> Result<(), RefNameError> {
        let name = self.as_str();
        let mut prev = None;
        for (i, c) in name.char_indices() {
            if c.is_whitespace() {
                // Whitespace run is reported as a whole.
                let run = &name[i..];
                let len = run.find(|c: char| !c.is_whitespace()).unwrap_or(run.len());
                return Err(RefNameError::Contains(run[..len].to_owned()));
            }
            if is_forbidden_char(c) {
                return Err(RefNameError::Contains(c.to_string()));
            }
            match (prev, c) {
                (None, '.' | '/') => return Err(RefNameError::StartsWith(c)),
                (Some('/'), '.') => return Err(RefNameError::Contains("/.".to_owned())),
                (Some('.'), '.') => return Err(RefNameError::Contains("..".to_owned())),
                (Some('/'), '/') => return Err(RefNameError::ConsecutiveSlashes),
                (_, '/') if name[..i].ends_with(LOCK_SUFFIX) => {
                    return Err(RefNameError::LockSuffix);
                }
                _ => {}
            }
            prev = Some(c);
        }
        match prev {
            Some(c @ ('/' | '.')) => Err(RefNameError::EndsWith(c)),
            _ if name.ends_with(LOCK_SUFFIX) => Err(RefNameError::LockSuffix),
            _ => Ok(()),
        }
    }
}

// Owned type can be constructed from (weakly-typed) string:

impl From<String> for RefNameBuf {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RefNameBuf {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<&RefName> for RefNameBuf {
    fn from(value: &RefName) -> Self {
        value.to_owned()
    }
}

// Borrowed type can be constructed from (weakly-typed) string:

impl AsRef<RefName> for String {
    fn as_ref(&self) -> &RefName {
        RefName::new(self)
    }
}

impl AsRef<RefName> for str {
    fn as_ref(&self) -> &RefName {
        RefName::new(self)
    }
}

// Types can be converted to (weakly-typed) string:

impl From<RefNameBuf> for String {
    fn from(value: RefNameBuf) -> Self {
        value.0
    }
}

impl AsRef<str> for RefNameBuf {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

// Types can be converted to borrowed type, and back to owned type:

impl AsRef<RefName> for RefNameBuf {
    fn as_ref(&self) -> &RefName {
        self
    }
}

impl Borrow<RefName> for RefNameBuf {
    fn borrow(&self) -> &RefName {
        self
    }
}

impl Deref for RefNameBuf {
    type Target = RefName;

    fn deref(&self) -> &Self::Target {
        RefName::new(&self.0)
    }
}

impl ToOwned for RefName {
    type Owned = RefNameBuf;

    fn to_owned(&self) -> Self::Owned {
        RefNameBuf(self.0.to_owned())
    }
}

// Owned and borrowed types can be compared, also with (weakly-typed) string:

impl PartialEq<RefName> for RefNameBuf {
    fn eq(&self, other: &RefName) -> bool {
        **self == *other
    }
}

impl PartialEq<&RefName> for RefNameBuf {
    fn eq(&self, other: &&RefName) -> bool {
        **self == **other
    }
}

impl PartialEq<str> for RefNameBuf {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for RefNameBuf {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialEq<str> for RefName {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl Display for RefName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl Display for RefNameBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&**self, f)
    }
}

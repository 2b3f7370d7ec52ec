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

use chrono::DateTime;
use chrono::NaiveDateTime;
use chrono::Utc;
use gitrev_lib::ref_name::RefName;
use gitrev_lib::revision::DATE_FORMAT;
use gitrev_lib::revision::DescriptionPattern;
use gitrev_lib::revision::RevisionOp;
use gitrev_lib::revision_parser::parse_revision;
use itertools::Itertools as _;

pub mod proptest;

/// Parses `text`, panicking with the error message if it's rejected.
#[track_caller]
pub fn parse_ok(text: &str) -> Vec<RevisionOp> {
    match parse_revision(text) {
        Ok(ops) => ops,
        Err(err) => panic!("failed to parse {text:?}: {err}"),
    }
}

/// Parses `text` and returns the error message without the common prefix.
#[track_caller]
pub fn parse_err(text: &str) -> String {
    match parse_revision(text) {
        Ok(ops) => panic!("unexpectedly parsed {text:?}: {ops:?}"),
        Err(err) => err.message(),
    }
}

pub fn reference(name: &str) -> RevisionOp {
    RevisionOp::Reference(name.into())
}

pub fn head() -> RevisionOp {
    RevisionOp::Reference(RefName::HEAD.to_owned())
}

pub fn pattern(source: &str, negate: bool) -> DescriptionPattern {
    DescriptionPattern::new(source, negate).unwrap()
}

/// Parses timestamp in the `@{<date>}` format.
pub fn utc_date(text: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(text, DATE_FORMAT)
        .unwrap()
        .and_utc()
}

/// Renders operations one per line, for snapshots.
pub fn format_ops(ops: &[RevisionOp]) -> String {
    ops.iter().map(|op| format!("{op:?}\n")).join("")
}

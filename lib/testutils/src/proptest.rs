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

//! Strategies generating well-formed revision operation sequences.

use chrono::DateTime;
use chrono::Utc;
use gitrev_lib::ref_name::RefNameBuf;
use gitrev_lib::revision::DescriptionPattern;
use gitrev_lib::revision::ObjectKind;
use gitrev_lib::revision::RevisionOp;
use proptest::prelude::*;

// 9999-12-31T23:59:59Z, the last timestamp with a four-digit year.
const MAX_TIMESTAMP: i64 = 253_402_300_799;

pub fn arb_ref_name() -> impl Strategy<Value = RefNameBuf> {
    // No dots, so none of the ".", "..", ".lock" rules can be hit.
    "[a-z][a-z0-9_-]{0,7}(/[a-z][a-z0-9_-]{0,7}){0,2}".prop_map(RefNameBuf::from)
}

fn arb_path() -> impl Strategy<Value = String> {
    // Starts with a letter so it isn't mistaken for ":/<regex>" or
    // ":<stage>:<path>".
    "[a-z][a-z0-9._ -]{0,7}(/[a-z0-9._ -]{1,8}){0,2}"
}

pub fn arb_description_pattern() -> impl Strategy<Value = DescriptionPattern> {
    // Literal characters only, and no "}" which would end "^{/...}" early.
    ("[a-z !]{0,10}", any::<bool>())
        .prop_map(|(source, negate)| DescriptionPattern::new(&source, negate).unwrap())
}

pub fn arb_date() -> impl Strategy<Value = DateTime<Utc>> {
    (0..=MAX_TIMESTAMP).prop_map(|secs| DateTime::from_timestamp(secs, 0).unwrap())
}

/// `@{...}` forms that may follow a reference.
fn arb_at_suffix() -> impl Strategy<Value = RevisionOp> {
    prop_oneof![
        arb_date().prop_map(RevisionOp::AtDate),
        any::<u32>().prop_map(RevisionOp::AtReflog),
        Just(RevisionOp::AtUpstream),
        Just(RevisionOp::AtPush),
    ]
}

/// `~` and `^` forms, which require a reference.
fn arb_ancestry_suffix() -> impl Strategy<Value = RevisionOp> {
    prop_oneof![
        any::<u32>().prop_map(RevisionOp::TildePath),
        (0..=2_u8).prop_map(RevisionOp::CaretPath),
        proptest::sample::select(ObjectKind::ALL.to_vec()).prop_map(RevisionOp::CaretType),
        arb_description_pattern().prop_map(RevisionOp::CaretReg),
    ]
}

fn arb_revision_from_reference() -> impl Strategy<Value = Vec<RevisionOp>> {
    (
        arb_ref_name(),
        proptest::option::of(arb_at_suffix()),
        proptest::collection::vec(arb_ancestry_suffix(), 0..5),
        proptest::option::of(arb_path()),
    )
        .prop_map(|(name, at, suffixes, path)| {
            let mut ops = vec![RevisionOp::Reference(name)];
            ops.extend(at);
            ops.extend(suffixes);
            ops.extend(path.map(RevisionOp::ColonPath));
            ops
        })
}

fn arb_revision_from_at() -> impl Strategy<Value = Vec<RevisionOp>> {
    (
        prop_oneof![
            arb_at_suffix(),
            any::<u32>().prop_map(RevisionOp::AtCheckout),
        ],
        proptest::option::of(arb_path()),
    )
        .prop_map(|(at, path)| {
            let mut ops = vec![at];
            ops.extend(path.map(RevisionOp::ColonPath));
            ops
        })
}

fn arb_revision_from_colon() -> impl Strategy<Value = Vec<RevisionOp>> {
    prop_oneof![
        arb_path().prop_map(RevisionOp::ColonPath),
        (arb_path(), 0..=3_u8).prop_map(|(path, stage)| RevisionOp::ColonStagePath { path, stage }),
        arb_description_pattern().prop_map(RevisionOp::ColonReg),
    ]
    .prop_map(|op| vec![op])
}

/// Operation sequences that are accepted by the parser.
pub fn arb_revision() -> impl Strategy<Value = Vec<RevisionOp>> {
    prop_oneof![
        3 => arb_revision_from_reference(),
        1 => arb_revision_from_at(),
        1 => arb_revision_from_colon(),
    ]
}

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

use assert_matches::assert_matches;
use gitrev_lib::revision::ObjectKind;
use gitrev_lib::revision::RevisionOp;
use gitrev_lib::revision::format_revision;
use gitrev_lib::revision_parser::RevisionParseErrorKind;
use gitrev_lib::revision_parser::RevisionParser;
use gitrev_lib::revision_parser::parse_revision;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use test_case::test_case;
use testutils::format_ops;
use testutils::head;
use testutils::parse_err;
use testutils::parse_ok;
use testutils::pattern;
use testutils::proptest::arb_revision;
use testutils::reference;
use testutils::utc_date;

#[test]
fn test_parse_empty() {
    assert_eq!(parse_ok(""), [head()]);
}

#[test]
fn test_parse_at() {
    let date = utc_date("2016-12-16T21:42:47Z");
    assert_eq!(parse_ok("@"), [head()]);
    assert_eq!(parse_ok("@~3"), [head(), RevisionOp::TildePath(3)]);
    assert_eq!(
        parse_ok("@{2016-12-16T21:42:47Z}"),
        [RevisionOp::AtDate(date)]
    );
    assert_eq!(parse_ok("@{1}"), [RevisionOp::AtReflog(1)]);
    assert_eq!(parse_ok("@{-1}"), [RevisionOp::AtCheckout(1)]);
    assert_eq!(parse_ok("@{upstream}"), [RevisionOp::AtUpstream]);
    assert_eq!(parse_ok("@{u}"), [RevisionOp::AtUpstream]);
    assert_eq!(
        parse_ok("master@{upstream}"),
        [reference("master"), RevisionOp::AtUpstream]
    );
    assert_eq!(
        parse_ok("master@{push}"),
        [reference("master"), RevisionOp::AtPush]
    );
    assert_eq!(
        parse_ok("master@{2016-12-16T21:42:47Z}"),
        [reference("master"), RevisionOp::AtDate(date)]
    );
    // A suffix may follow the "@" form
    assert_eq!(
        parse_ok("master@{1}~2"),
        [
            reference("master"),
            RevisionOp::AtReflog(1),
            RevisionOp::TildePath(2),
        ]
    );
    assert_eq!(
        parse_ok("@{-2}:README"),
        [
            RevisionOp::AtCheckout(2),
            RevisionOp::ColonPath("README".to_owned()),
        ]
    );
}

#[test]
fn test_parse_caret_and_tilde() {
    assert_eq!(parse_ok("HEAD^"), [head(), RevisionOp::CaretPath(1)]);
    assert_eq!(
        parse_ok("master~3"),
        [reference("master"), RevisionOp::TildePath(3)]
    );
    assert_eq!(
        parse_ok("v0.99.8^{commit}"),
        [
            reference("v0.99.8"),
            RevisionOp::CaretType(ObjectKind::Commit),
        ]
    );
    assert_eq!(
        parse_ok("v0.99.8^{}"),
        [reference("v0.99.8"), RevisionOp::CaretType(ObjectKind::Tag)]
    );
    assert_eq!(
        parse_ok("HEAD^{/fix nasty bug}"),
        [
            head(),
            RevisionOp::CaretReg(pattern("fix nasty bug", false)),
        ]
    );
    assert_eq!(
        parse_ok("master~1^{/update}~5~^^1"),
        [
            reference("master"),
            RevisionOp::TildePath(1),
            RevisionOp::CaretReg(pattern("update", false)),
            RevisionOp::TildePath(5),
            RevisionOp::TildePath(1),
            RevisionOp::CaretPath(1),
            RevisionOp::CaretPath(1),
        ]
    );
}

#[test]
fn test_parse_colon() {
    assert_eq!(
        parse_ok(":/fix nasty bug"),
        [RevisionOp::ColonReg(pattern("fix nasty bug", false))]
    );
    assert_eq!(
        parse_ok("HEAD:README"),
        [head(), RevisionOp::ColonPath("README".to_owned())]
    );
    assert_eq!(
        parse_ok(":README"),
        [RevisionOp::ColonPath("README".to_owned())]
    );
    assert_eq!(
        parse_ok("master:./README"),
        [reference("master"), RevisionOp::ColonPath("./README".to_owned())]
    );
    assert_eq!(
        parse_ok("master^1~:./README"),
        [
            reference("master"),
            RevisionOp::CaretPath(1),
            RevisionOp::TildePath(1),
            RevisionOp::ColonPath("./README".to_owned()),
        ]
    );
    assert_eq!(
        parse_ok(":0:README"),
        [RevisionOp::ColonStagePath {
            path: "README".to_owned(),
            stage: 0,
        }]
    );
    assert_eq!(
        parse_ok(":3:README"),
        [RevisionOp::ColonStagePath {
            path: "README".to_owned(),
            stage: 3,
        }]
    );
}

#[test]
fn test_parse_snapshot() {
    insta::assert_snapshot!(
        format_ops(&parse_ok("origin/main@{2}^{/!-wip}~2^2:src/lib.rs")), @r#"
    Reference(RefNameBuf("origin/main"))
    AtReflog(2)
    CaretReg(DescriptionPattern { pattern: "wip", negate: true })
    TildePath(2)
    CaretPath(2)
    ColonPath("src/lib.rs")
    "#);
}

#[test_case("..", r#"must not start with ".""#; "dots only")]
#[test_case("master^1master", "reference must be defined once at the beginning"; "second reference")]
#[test_case(
    "master^1@{2016-12-16T21:42:47Z}",
    r#""@" statement is not valid, could be : <refname>@{<ISO-8601 date>}, @{<ISO-8601 date>}"#;
    "date after suffix"
)]
#[test_case(
    "master^1@{1}",
    r#""@" statement is not valid, could be : <refname>@{<n>}, @{<n>}"#;
    "reflog after suffix"
)]
#[test_case(
    "master@{-1}",
    r#""@" statement is not valid, could be : @{-<n>}"#;
    "checkout after reference"
)]
#[test_case(
    "master^1@{upstream}",
    r#""@" statement is not valid, could be : <refname>@{upstream}, @{upstream}, <refname>@{u}, @{u}"#;
    "upstream after suffix"
)]
#[test_case(
    "master^1@{u}",
    r#""@" statement is not valid, could be : <refname>@{upstream}, @{upstream}, <refname>@{u}, @{u}"#;
    "short upstream after suffix"
)]
#[test_case(
    "master^1@{push}",
    r#""@" statement is not valid, could be : <refname>@{push}, @{push}"#;
    "push after suffix"
)]
#[test_case(
    "^1",
    r#""~" or "^" statement must have a reference defined at the beginning"#;
    "leading caret"
)]
#[test_case(
    "^{/test}",
    r#""~" or "^" statement must have a reference defined at the beginning"#;
    "leading caret regex"
)]
#[test_case(
    "~1",
    r#""~" or "^" statement must have a reference defined at the beginning"#;
    "leading tilde"
)]
#[test_case(
    "@{1}~1",
    r#""~" or "^" statement must have a reference defined at the beginning"#;
    "tilde after reflog without reference"
)]
#[test_case("master:/test", r#"":" statement is not valid, could be : :/<regexp>"#; "colon regex after reference")]
#[test_case("master:0:README", r#"":" statement is not valid, could be : :<n>:<path>"#; "stage after reference")]
#[test_case("^{/", r#"missing "}" in ^{<data>} structure"#; "unclosed caret regex")]
#[test_case("~@{", r#"missing "}" in @{<data>} structure"#; "unclosed brace wins over missing reference")]
#[test_case("@@{{0", r#"missing "}" in @{<data>} structure"#; "unclosed nested brace")]
#[test_case("master@{-1", r#"missing "}" in @{-n} structure"#; "unclosed checkout")]
#[test_case("master^3", r#""3" found must be 0, 1 or 2 after "^""#; "parent out of range")]
#[test_case("master^{blob", r#"missing "}" in ^{<data>} structure"#; "unclosed kind")]
#[test_case("master^{tags}", r#""tags" is not a valid revision suffix brace component"#; "unknown kind")]
#[test_case("master@{yesterday}", r#"wrong date "yesterday" must fit ISO-8601 format : 2006-01-02T15:04:05Z"#; "relative date")]
#[test_case("master~99999999999", r#""99999999999" is not a valid number"#; "tilde overflow")]
#[test_case("refs/heads/main.lock", "cannot end with .lock"; "lock reference")]
#[test_case("main  branch", r#"must not contains "  ""#; "whitespace run in reference")]
#[test_case("@{2016-1-2T3:4:5Z}", r#"wrong date "2016-1-2T3:4:5Z" must fit ISO-8601 format : 2006-01-02T15:04:05Z"#; "short date fields")]
fn test_parse_invalid(text: &str, message: &str) {
    assert_eq!(parse_err(text), message);
}

#[test]
fn test_parse_invalid_regex() {
    let err = parse_revision("HEAD^{/(}").unwrap_err();
    assert_matches!(err.kind(), RevisionParseErrorKind::InvalidRegex(_));
    assert!(
        err.to_string()
            .starts_with("Revision invalid : revision suffix brace component, error parsing regexp: ")
    );
}

#[test]
fn test_parse_error_display() {
    let err = parse_revision("..").unwrap_err();
    assert_matches!(err.kind(), RevisionParseErrorKind::InvalidRefName(_));
    insta::assert_snapshot!(err, @r#"Revision invalid : must not start with ".""#);
}

#[test]
fn test_parser_is_single_use() {
    let mut parser = RevisionParser::new("master~2");
    assert_eq!(
        parser.parse().unwrap(),
        [reference("master"), RevisionOp::TildePath(2)]
    );
    // Input is consumed, so parsing again yields the default.
    assert_eq!(parser.parse().unwrap(), [head()]);
}

#[test]
fn test_format_revision_parses_back() {
    for text in [
        "@",
        "master~3",
        "master^1~:./README",
        "v0.99.8^{commit}",
        ":/!! hello",
        ":1:README",
        "@{-1}",
        "master@{2016-12-16T21:42:47Z}",
        "HEAD^{/!-fix}^0",
        "@:x",
        "a{1}~",
        "v1^{}",
        ":4:x",
        ":/!--x",
        "@{u}",
        "HEAD@{007}~010",
    ] {
        let ops = parse_ok(text);
        assert_eq!(parse_ok(&format_revision(&ops)), ops, "{text:?}");
    }
}

fn arb_revision_text() -> impl Strategy<Value = String> {
    // Mostly revision syntax, so that a fair share of inputs is accepted.
    prop_oneof![
        3 => "[a-z0-9./@{}~^:!-]{0,24}",
        1 => "\\PC{0,32}",
    ]
}

proptest! {
    #[test]
    fn test_format_then_parse(ops in arb_revision()) {
        let text = format_revision(&ops);
        let parsed = parse_revision(&text);
        prop_assert_eq!(parsed.as_ref(), Ok(&ops), "{:?}", text);
    }

    #[test]
    fn test_parse_arbitrary_text_round_trips(text in arb_revision_text()) {
        match parse_revision(&text) {
            Ok(ops) => {
                let formatted = format_revision(&ops);
                let reparsed = parse_revision(&formatted);
                prop_assert_eq!(reparsed.as_ref(), Ok(&ops), "{:?} -> {:?}", text, formatted);
            }
            Err(err) => {
                prop_assert!(!err.message().is_empty());
            }
        }
    }
}

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

//! Parser for Git-style revision expressions.
//!
//! An expression such as `master~1^{/update}:README` is turned into a list of
//! [`RevisionOp`](revision::RevisionOp)s to be applied left to right:
//!
//! ```
//! use gitrev_lib::revision::RevisionOp;
//! use gitrev_lib::revision_parser::parse_revision;
//!
//! let ops = parse_revision("master~3").unwrap();
//! assert_eq!(
//!     ops,
//!     [RevisionOp::Reference("master".into()), RevisionOp::TildePath(3)]
//! );
//! ```
//!
//! Resolving the operations against a repository is up to the caller.

#![warn(missing_docs)]
#![deny(unused_must_use)]

pub mod ref_name;
pub mod revision;
pub mod revision_parser;
pub mod revision_scanner;

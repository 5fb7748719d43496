//! Query conditions and access-path selection.
//!
//! A scan locates candidate records through exactly one access path and
//! then re-evaluates every condition against each candidate:
//!
//! 1. an `=` condition on the primary key reads one record directly
//! 2. otherwise the first `=` or `is_null` condition on an indexed column
//!    replays that index bucket
//! 3. otherwise the query is rejected with `INVALID_KEY_SPECIFICATION`
//!
//! Range operators never select an access path; they only filter.

mod access;
mod condition;

pub use access::{select_access_path, AccessPath};
pub use condition::{Condition, Operator};

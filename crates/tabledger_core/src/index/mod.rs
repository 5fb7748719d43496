//! Index buckets as delta logs.
//!
//! An index bucket is an asset whose versions each hold a delta: an array of
//! entries that add a primary key to the bucket or mark it deleted. Nothing
//! is ever erased; the current membership is rebuilt by replaying every
//! version in ascending age order, and the last entry for a key wins.
//!
//! ```text
//! age 0: [{pkey: "k1", age: 0}, {pkey: "k2", age: 0}]
//! age 1: [{pkey: "k1", age: 1, deleted: true}]
//! members: {"k2"}
//! ```

mod delta;
mod membership;

pub use delta::{IndexDeltas, IndexEntry, ADDED_AGE, DELETED};
pub use membership::current_members;

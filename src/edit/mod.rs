//! Targeted edits on C# source text.
//!
//! Each operation locates exactly one node, builds a [`TextEdit`] for it and
//! splices it into the original text, so everything outside the edited
//! range comes back byte-identical.
//!
//! - [`method::replace_method_body`] — swap a method's body for new statements
//! - [`imports::ensure_import`] — add a `using` directive if it is missing
//! - [`namespace::normalize_namespace`] — make the declared namespace match
//!   the file's folder, then apply extra imports
//!
//! [`TextEdit`]: crate::syntax::TextEdit

pub mod diff;
pub mod imports;
pub mod method;
pub mod namespace;

pub use imports::ensure_import;
pub use method::replace_method_body;
pub use namespace::{expected_namespace, fix_namespaces, normalize_namespace};

//! # tagmap macros
//!
//! Derive macro generating the `tagmap::Reflect` and `tagmap::Record`
//! implementations for configuration structs.
//!
//! ## Examples
//!
//! ```ignore
//! use tagmap::Record;
//!
//! #[derive(Debug, Record)]
//! pub struct Datapath {
//!     #[tag(config = "ENABLE_IPV6")]
//!     enable_ipv6: bool,
//!
//!     limits: Limits,
//!
//!     #[tag(skip)]
//!     scratch: Scratch,
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

extern crate proc_macro;

use proc_macro::TokenStream;

mod record;
mod support;

/// Derive macro for the `Record` trait.
///
/// Generates `Reflect` (with a record shape) and `Record` (enumerating every
/// field in declaration order). Every field type must implement `Reflect`
/// unless the field is skipped.
///
/// # Attributes
///
/// ## Field attributes (`#[tag(...)]`)
///
/// - `name = "value"` - Attach the tag `name` with `value`; repeatable for
///   different names, e.g. `#[tag(config = "PORT", env = "APP_PORT")]`
/// - `skip` - Leave the field out entirely; it cannot be combined with tags
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Record)]
/// pub struct Limits {
///     #[tag(config = "MAX_ENTRIES")]
///     max_entries: u32,
///
///     #[tag(config = "POLICY_MAP_SIZE")]
///     policy_map_size: u32,
/// }
/// ```
#[proc_macro_derive(Record, attributes(tag))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive(input)
}

//! Control-flow normalization for the goflow compiler.
//!
//! [`simplify`] takes a type-checked [`File`][goflow_ast::File] and
//! returns an equivalent one in which `switch` statements are
//! `if`/`else` chains, `fallthrough` is gone, and (optionally) calls
//! only appear where the emitter can place them directly. See the
//! [`Simplifier`] builder for the available settings.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(clippy::arithmetic_side_effects)]
#![warn(missing_docs)]

mod build;
mod calls;
mod ctx;
mod diag;
mod names;
mod simplify;
mod typeinfo;

#[cfg(test)]
mod tests;

pub use calls::contains_call;
pub use diag::ExplicitBug;
pub use simplify::{Simplifier, simplify};
pub use typeinfo::{Type, TypeInfo, TypeMap};

//! The syntax tree consumed and produced by `goflow-simplify`.
//!
//! The tree models a statically typed, Go-like language: packages
//! of declarations, functions made of statements, and
//! expressions that may call functions. Expression children are
//! shared through [`Arc`][alloc::sync::Arc] so a rewriting pass can
//! return unchanged subtrees without copying them.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(any(test, doctest, feature = "std")), no_std)]
#![warn(missing_docs)]

extern crate alloc;

mod ast;
pub mod dsl;
mod print;
mod span;
pub mod visit;


pub use ast::*;
pub use print::stmts_to_string;
pub use span::{Span, Spanned};

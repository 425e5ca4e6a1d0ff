#![doc = include_str!("../README.md")]
#![doc(html_root_url = "https://docs.rs/yaml-reader/0.1.0")]
#![warn(clippy::pedantic)]
#![allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::manual_range_contains,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::struct_excessive_bools,
    clippy::too_many_lines,
    clippy::match_wildcard_for_single_variants
)]
#![deny(unsafe_code)]

extern crate alloc;

mod anchor;
mod chars;
mod error;
mod mark;
mod options;
mod parser;
mod queue;
mod reader;
mod scalar;
mod tag;
mod token;
mod tokenizer;

pub use crate::anchor::Anchor;
pub use crate::error::*;
pub use crate::mark::Mark;
pub use crate::options::*;
pub use crate::parser::*;
pub use crate::queue::InsertionQueue;
pub use crate::reader::{Input, Lookahead};
pub use crate::scalar::*;
pub use crate::tag::Tag;
pub use crate::token::*;
pub use crate::tokenizer::Tokenizer;

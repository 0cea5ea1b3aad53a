//! Markup conversion
//!
//! Turns post body HTML into simplified Markdown for language-model
//! consumption and derives plain text from it.
//!
//! # Example
//!
//! ```
//! use je_core::convert::{word_count, MarkupConverter};
//!
//! let converter = MarkupConverter::new();
//! assert_eq!(converter.convert("<p>Hello <b>world</b></p>"), "Hello **world**");
//! assert_eq!(word_count("<p>Hello <b>world</b></p>"), 2);
//! ```

mod markdown;
mod text;

pub use markdown::MarkupConverter;
pub use text::{
    decode_entities, escape_html, sanitize_title, strip_tags, trim_words, word_count,
};

pub(crate) use text::is_block as is_block_tag;

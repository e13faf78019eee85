//! Script detection and tokenization

pub mod script;
pub mod tokenizer;

pub use script::{detect_language, is_cjk_char, is_cjk_text, ScriptLanguage};
pub use tokenizer::{term_frequencies, tokenize};

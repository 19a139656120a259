pub mod document;
pub mod manual;

pub use document::{DocumentKind, extract_text};
pub use manual::assemble_text;

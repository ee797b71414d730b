//! Formatting layer: decrypted field bytes to strings, HTML and geometry.
//!
//! Everything here is a pure function of the decrypted bytes (plus the image
//! crop capability for drag-and-drop areas) and knows nothing about the
//! container layout.
//!
//! - [`tokenizer`]: delimiter-driven byte tokenizer
//! - [`text`]: rich-text tokens and HTML rendering
//! - [`sections`]: sentinel-separated sections and plain/blank answers
//! - [`areas`]: hot-area and drag-and-drop geometry and answers
//! - [`image`]: `<img>` tags and the crop capability

pub mod areas;
pub mod image;
pub mod sections;
pub mod text;
pub mod tokenizer;

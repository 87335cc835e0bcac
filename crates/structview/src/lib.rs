//! # structview
//!
//! A structure-driven binary decoder. Describe a binary format as an ordered
//! list of typed fields (with lengths and repeat counts that may come from
//! earlier fields, nested substructures, value maps, and bit labels), then
//! decode any byte source into a tree of typed, offset-tagged fields.
//!
//! Decoding never fails on bad data: truncated, unresolved, or broken fields
//! come back as null or error-describing values with their intended span, so
//! a viewer can always render what was decoded.
//!
//! ## Example
//!
//! ```
//! use structview::decoder::decode_structure;
//! use structview::field::{FieldDescriptor, SubstructureCatalog};
//! use structview::kind::FieldKind;
//! use structview::source::MemorySource;
//! use structview::value::Value;
//!
//! let mut text = FieldDescriptor::new("text", FieldKind::String);
//! text.set_length_ref("len");
//! let fields = vec![FieldDescriptor::new("len", FieldKind::Uint8), text];
//!
//! let source = MemorySource::new(b"\x05Hello".to_vec());
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let decoded = rt.block_on(decode_structure(&fields, &SubstructureCatalog::new(), &source));
//!
//! assert_eq!(decoded.get("text").map(|f| &f.value), Some(&Value::String("Hello".into())));
//! assert_eq!(decoded.get("text").map(|f| f.offset), Some(1));
//! ```

pub mod config;
pub mod decoded;
pub mod decoder;
pub mod entropy;
pub mod errors;
pub mod field;
pub mod kind;
pub mod postprocess;
pub mod project;
pub mod reference;
pub mod script;
#[cfg(feature = "serde")]
pub mod serde;
pub mod source;
pub mod value;

//! # zpl-codec — Metadata-Driven Specification Codec
//!
//! Converts between YAML documents and the specification model using only
//! the parameter tables of `zpl-spec`. No node kind has its own
//! serialization code.
//!
//! ## Encoding (`encode`)
//!
//! [`encode`] writes the parameters of one node as a mapping, leaving out
//! every value equal to its effective default. [`encode_specs`] writes a
//! named collection, `DEFAULTS` first.
//!
//! ## Decoding (`decode`)
//!
//! [`decode`] reads a mapping back into parameters, coercing values to
//! their declared kinds and reporting anything it cannot use through the
//! build context's diagnostics.
//!
//! ## Documents (`document`)
//!
//! [`compile`] turns the text of a `!ZenPackSpec` document into a
//! [`ZenPackSpec`](zpl_spec::ZenPackSpec); [`dump`] writes one back.
//!
//! ## Crate Policy
//!
//! - Depends on `zpl-core` and `zpl-spec` internally.
//! - `decode(encode(node))` rebuilds a node equal to the original, for
//!   every node kind.
//! - Decoding never aborts on a recoverable problem in lenient mode.

pub mod decode;
pub mod document;
pub mod encode;

pub use decode::{decode, decode_specs};
pub use document::{compile, dump, load_params, parse_document, to_document, CompileOptions, DOCUMENT_TAG};
pub use encode::{encode, encode_node, encode_specs};

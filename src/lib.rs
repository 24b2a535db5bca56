//! typegen — re-derive typed models from rendered documentation tables and
//! emit source code for multiple target languages.
//!
//! Three pipelines share a small core:
//!
//! - **types**: rendered HTML tables → [`model::StructData`] →
//!   TypeScript/Python/Rust/Go declarations
//! - **endpoints**: route headers → per-language endpoint URL builders
//! - **pmo**: compact interface/enum declarations in markdown code fences →
//!   the same table markup the tokenizer re-parses

pub mod dom;
pub mod endpoint;
pub mod generate;
pub mod model;
pub mod name;
pub mod pmo;
pub mod tokenizer;

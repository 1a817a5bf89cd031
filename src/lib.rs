//! cyphergen - compiles declarative graph requests into parameterised Cypher
//!
//! A request names node labels, the relationships between them, per-property
//! filters and neighbor existence checks. The crate turns it into one query:
//! - label enrichment and connectivity checks over the requested graph
//! - partitioning into a mandatory `MATCH` and `OPTIONAL MATCH` groups
//! - filter and existence predicates with generated `$par_N` parameters
//! - WITH/RETURN projection shaping (packing, ordering, disjoint columns)
//!
//! ```
//! use cyphergen::{QueryCompiler, QueryRequest, Relationship};
//!
//! let request = QueryRequest::new(["Subject", "Sex"])
//!     .with_relationships(vec![Relationship::new("Subject", "Sex")]);
//! let compiled = QueryCompiler::default().compile(&request).unwrap();
//! assert!(compiled.query.starts_with("MATCH (`Subject`:`Subject`)"));
//! ```

pub mod compiler;
pub mod config;
pub mod cypher_generator;
pub mod errors;
pub mod graph;
pub mod predicate_compiler;
pub mod query_model;
pub mod schema;

pub use compiler::QueryCompiler;
pub use config::CompilerConfig;
pub use cypher_generator::CompiledQuery;
pub use errors::{CompileError, CompileResult};
pub use query_model::{Label, LabelSpec, QueryRequest, Relationship, ReturnOptions};
pub use schema::{InMemorySchema, NoSchema, SchemaMetadata};

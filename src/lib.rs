//! mson-runtime-mcp: MCP server that converts MSON models into System Runtime bundles
//!
//! This library turns structural software models (entities, attributes,
//! methods, relationships) into System Runtime bundles and validates them.
//!
//! # Architecture
//!
//! The conversion core is pure and synchronous:
//!
//! - **Role inference**: decides whether an attribute is a property, a link
//!   or a collection
//! - **Schema/model generation**: one structural schema plus one type model
//!   per entity, including reverse fields of bidirectional relationships
//! - **Validation**: referential integrity, unique identities, acyclic
//!   inheritance and well-formed method signatures
//!
//! The MCP server exposes these as tools over stdio JSON-RPC.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading and validation
//! - [`diagnostics`]: Warning/error entries shared by the checkers
//! - [`error`]: Error types
//! - [`mcp`]: MCP protocol implementation
//! - [`mson`]: Input model types and model checks
//! - [`runtime`]: Bundle types, conversion and validation

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod mcp;
pub mod mson;
pub mod runtime;

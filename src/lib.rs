//! PDFEdit Server Library
//!
//! REST API for editing PDF documents: text and image insertion, page
//! deletion, reordering and extraction, merging, text search, redaction and
//! replacement, and metadata reads. The server binary is in main.rs.
//!
//! # Modules
//!
//! - `document`: Engine-independent operations, validation and match filtering
//! - `engine`: lopdf/MuPDF implementation of the engine traits
//! - `routes`: HTTP endpoints and multipart handling
//! - `workspace`: Per-request temporary directories

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod routes;
pub mod state;
pub mod workspace;

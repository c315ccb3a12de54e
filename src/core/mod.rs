//! Core XML parsing primitives
//!
//! This module contains the fundamental building blocks for XML parsing:
//! - Scanner: SIMD-accelerated delimiter detection using memchr
//! - Tokenizer: State machine for XML token extraction
//! - Entities: XML entity decoding and output escaping, Cow (zero-copy when possible)
//! - Attributes: Attribute parsing and extraction
//! - Encoding: UTF-16 detection and conversion to UTF-8
//! - Namespace: Stack-based prefix bindings for reader and writer

pub mod attributes;
pub mod encoding;
pub mod entities;
pub mod namespace;
pub mod scanner;
pub mod tokenizer;

//! # Transport
//!
//! Socket primitives for the messaging fabric. All platform and option
//! handling is isolated here so broker and listener code stays
//! transport-agnostic.

pub mod udp;

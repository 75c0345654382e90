//! Integration tests for Layer 2: Engine
//!
//! Tests for reactive bindings, propagation order, and capability casts.

mod capabilities;

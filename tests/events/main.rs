//! Integration tests for Layer 3: Events
//!
//! Tests for dispatch over a host that owns a world.

mod dispatch;

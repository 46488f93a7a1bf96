//! Shared utility modules used across Pilum components.

pub mod varint;

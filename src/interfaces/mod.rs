//! Inbound/outbound adapters for the submission layer.

pub mod csv;

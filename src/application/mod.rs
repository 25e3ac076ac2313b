//! Application layer containing the transaction handlers.
//!
//! This module defines the `LoanEngine`, the composition root exposed to the
//! submission layer. Every handler re-reads the loan record from the ledger,
//! so no state survives between calls.

pub mod engine;

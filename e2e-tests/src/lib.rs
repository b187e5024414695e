//! End-to-end tests for the zkApp worker session
//!
//! These run the orchestrating side (proxy, orchestrator) on a tokio
//! current-thread runtime and the background runtime on its own OS thread,
//! connected by the real Message Channel. The digest prover and the
//! in-memory ledger stand in for the proving library and the network.

#[cfg(test)]
mod tests;

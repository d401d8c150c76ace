//! Conformance suite for the kernel runtime core.
//!
//! The crates under test are wired together here the way a real boot
//! wires them: kernel plus window server plus terminal, driven by
//! scripted devices. See `tests/invariants.rs` for the property suite and
//! `tests/scenarios.rs` for the end-to-end boot scenarios.

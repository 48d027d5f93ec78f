//! Test modules for the module engine
//!
//! Shared mocks live in `utils`; the remaining files cover the manager's
//! bulk bring-up, tear-down, targeted operations and load/save sweeps.

pub(crate) mod utils;

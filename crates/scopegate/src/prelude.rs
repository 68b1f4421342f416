pub use scopegate_core::prelude::*;

// vim: ts=4

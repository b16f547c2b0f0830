//! Helpers shared by the remap integration tests.
//!
//! [`JarFixture`] and [`ClassFixture`] describe small class sets the way a bytecode front end
//! would report them, so tests can build real indexes without class files.

mod fixtures;

#[cfg(feature = "strategies")]
pub mod strategies;

pub use fixtures::*;

mod chain;
mod process;
mod reader;

#[cfg(test)]
pub mod mock;

pub use chain::{ChainStep, follow_chain};
pub use process::*;
pub use reader::{MemoryReader, PointerWidth, ReadMemory};

#[cfg(test)]
pub use mock::{MockMemoryBuilder, MockMemoryReader};

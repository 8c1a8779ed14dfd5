pub mod generation;
pub mod retrieval;
pub mod sweeper;
pub mod synthesizer;
pub mod voices;

pub use generation::*;
pub use retrieval::*;
pub use sweeper::*;
pub use synthesizer::*;
pub use voices::*;

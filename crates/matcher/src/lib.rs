pub mod registry;

pub use registry::{MatchError, PatternRegistry};

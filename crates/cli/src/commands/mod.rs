pub mod corpus;
pub mod extract;
pub mod project;
pub mod runs;
pub mod segment;
pub mod tokenize;
pub mod util;

pub use corpus::*;
pub use extract::*;
pub use project::*;
pub use runs::*;
pub use segment::*;
pub use tokenize::*;
pub use util::*;

pub mod documents;
pub mod time;

pub use documents::*;
pub use time::*;

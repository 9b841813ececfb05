mod entry;
mod installer;
mod prompt;

pub use entry::*;
pub use installer::*;
pub use prompt::*;

mod file;
mod result;

pub use file::*;
pub use result::*;

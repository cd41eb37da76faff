mod handlers;
mod parser;
mod patterns;

pub mod extractors;

pub use extractors::{ExtractedContent, ExtractionMode, SmartExtractor};
pub use handlers::media_type_for;
pub use parser::{FileParser, Route};
pub use patterns::HumanSignalMatcher;

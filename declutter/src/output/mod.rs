//! Writers for everything the binary leaves on disk: the extracted text
//! bundle, plus topic journals, a jCal calendar and flat index documents for
//! the structured result.

mod bundle;
mod calendar;
mod index;
mod journal;

pub use bundle::BundleWriter;
pub use calendar::CalendarWriter;
pub use index::{build_index_documents, IndexDocument, IndexMetadata, IndexStats, IndexWriter};
pub use journal::{title_case, JournalFile, JournalWriter};

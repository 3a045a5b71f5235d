pub mod accuracy;
pub mod derep;
pub mod mock_annotate;
pub mod otu_table;
pub mod padding;

pub use accuracy::{AccuracySummary, MockEvaluation};
pub use derep::{dereplicate, DerepStats};

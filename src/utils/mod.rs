pub mod external_tools;
pub(crate) mod progress_bar_builder;
pub mod record_count;
pub mod run_log;

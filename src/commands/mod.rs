pub mod cluster;
pub mod config;
pub mod dereplicate;
pub mod mock_stats;

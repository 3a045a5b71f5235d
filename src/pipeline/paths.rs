use std::path::PathBuf;

/// Every file a run writes, derived from the base name and the EE threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub filtered: PathBuf,
    pub derep: PathBuf,
    pub denoised: PathBuf,
    pub sorted: PathBuf,
    pub otus: PathBuf,
    pub clean_otus: PathBuf,
    pub uchime_otus: PathBuf,
    pub mock_otus: PathBuf,
    /// Transient; removed once the mock has been evaluated.
    pub mock_map: PathBuf,
    pub mapping: PathBuf,
    pub otu_table: PathBuf,
    pub log: PathBuf,
}

impl OutputPaths {
    pub fn new(base: &str, max_ee: &str) -> Self {
        let staged = |suffix: &str| PathBuf::from(format!("{}.EE{}.{}", base, max_ee, suffix));
        Self {
            filtered: staged("filter.fq"),
            derep: staged("derep.fa"),
            denoised: staged("denoised.fa"),
            sorted: staged("sort.fa"),
            otus: staged("otus.fa"),
            clean_otus: staged("clean.otus.fa"),
            uchime_otus: staged("uchime.otus.fa"),
            mock_otus: staged("mock.otus.fa"),
            mock_map: PathBuf::from(format!("{}.mockmap.uc", base)),
            mapping: staged("mapping.uc"),
            otu_table: staged("otu_table.txt"),
            log: Self::log_for(base),
        }
    }

    pub fn log_for(base: &str) -> PathBuf {
        PathBuf::from(format!("{}.log", base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_carry_base_and_threshold() {
        let paths = OutputPaths::new("run1", "0.5");
        assert_eq!(paths.filtered, PathBuf::from("run1.EE0.5.filter.fq"));
        assert_eq!(paths.clean_otus, PathBuf::from("run1.EE0.5.clean.otus.fa"));
        assert_eq!(paths.otu_table, PathBuf::from("run1.EE0.5.otu_table.txt"));
        assert_eq!(paths.mock_map, PathBuf::from("run1.mockmap.uc"));
        assert_eq!(paths.log, PathBuf::from("run1.log"));
    }
}

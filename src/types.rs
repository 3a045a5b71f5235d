use std::path::{Path, PathBuf};

/// Reference database used for reference-based chimera filtering.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChimeraReference {
    #[value(name = "ITS1")]
    Its1,
    #[value(name = "ITS2")]
    Its2,
    #[value(name = "Full")]
    Full,
}

impl ChimeraReference {
    // Dated file names are kept so the database origin stays obvious.
    pub fn file_name(&self) -> &'static str {
        match self {
            ChimeraReference::Its1 => "uchime_sh_refs_dynamic_develop_985_11.03.2015.ITS1.fasta",
            ChimeraReference::Its2 => "uchime_sh_refs_dynamic_develop_985_11.03.2015.ITS2.fasta",
            ChimeraReference::Full => "uchime_sh_refs_dynamic_original_985_11.03.2015.fasta",
        }
    }

    pub fn path_in(&self, reference_dir: &Path) -> PathBuf {
        reference_dir.join(self.file_name())
    }
}

/// Mock community shipped in the reference directory when none is given.
pub const DEFAULT_MOCK_REFERENCE: &str = "ufits_mock3.fa";

/// Largest input the 32-bit clustering engine can address, exclusive.
pub const MAX_INPUT_BYTES: u64 = 4_294_967_296;

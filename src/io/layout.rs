use std::path::{Path, PathBuf};

use crate::Segment;

/// File names of every artifact written for one input, all derived from an
/// output prefix such as `out/firmware` -> `out/firmware_seg00.bin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    dir: PathBuf,
    stem: String,
}

impl OutputLayout {
    pub fn new(prefix: &Path) -> Self {
        let dir = match prefix.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let stem = prefix
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "firmware".to_string());
        Self { dir, stem }
    }

    /// Prefix derived from the input path with its extension removed.
    pub fn for_input(input: &Path) -> Self {
        Self::new(&input.with_extension(""))
    }

    /// Prefix a sidecar such as `out/fw_seg03.json` was written under.
    pub fn for_sidecar(sidecar: &Path) -> Self {
        let stem = sidecar.with_extension("");
        let prefix = stem
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.rsplit_once("_seg"))
            .map(|(prefix, _)| stem.with_file_name(prefix))
            .unwrap_or(stem);
        Self::new(&prefix)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn bin_name(&self, segment: &Segment) -> String {
        format!("{}_seg{:02}.bin", self.stem, segment.id)
    }

    pub fn bin_path(&self, segment: &Segment) -> PathBuf {
        self.dir.join(self.bin_name(segment))
    }

    pub fn sidecar_path(&self, segment: &Segment) -> PathBuf {
        self.dir.join(format!("{}_seg{:02}.json", self.stem, segment.id))
    }

    pub fn listing_name(&self, segment: &Segment) -> String {
        format!("{}_seg{:02}_disasm.asm", self.stem, segment.id)
    }

    pub fn listing_path(&self, segment: &Segment) -> PathBuf {
        self.dir.join(self.listing_name(segment))
    }

    pub fn filtered_hex_path(&self) -> PathBuf {
        self.dir.join(format!("{}.filtered.hex", self.stem))
    }

    pub fn summary_path(&self) -> PathBuf {
        self.file("segments.txt")
    }

    pub fn strings_path(&self) -> PathBuf {
        self.file("strings.txt")
    }

    pub fn functions_path(&self) -> PathBuf {
        self.file("functions.txt")
    }

    pub fn reset_vector_path(&self) -> PathBuf {
        self.file("reset_vector.txt")
    }

    pub fn vectors_path(&self) -> PathBuf {
        self.file("vectors.txt")
    }

    fn file(&self, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}_{suffix}", self.stem))
    }
}

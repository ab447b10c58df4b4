use std::path::{Path, PathBuf};

use fwscan::{AnalysisConfig, OutputLayout};

use super::error::CliError;
use super::types::GlobalOptions;

/// Config file (if any) with command-line overrides applied on top.
pub(super) fn load_config(options: &GlobalOptions) -> Result<AnalysisConfig, CliError> {
    let mut config = match options.config {
        Some(ref path) => AnalysisConfig::load(path).map_err(fwscan::Error::from)?,
        None => AnalysisConfig::default(),
    };
    if let Some(min_len) = options.min_len {
        config.strings.min_length = min_len;
    }
    if options.no_listings {
        config.output.write_listings = false;
    }
    config.validate().map_err(fwscan::Error::from)?;
    Ok(config)
}

pub(super) fn resolve_layout(input: &Path, output: Option<&PathBuf>) -> OutputLayout {
    match output {
        Some(prefix) => OutputLayout::new(prefix),
        None => OutputLayout::for_input(input),
    }
}

pub(super) fn resolve_report_layout(
    sidecars: &[PathBuf],
    output: Option<&PathBuf>,
) -> Result<OutputLayout, CliError> {
    if let Some(prefix) = output {
        return Ok(OutputLayout::new(prefix));
    }
    sidecars
        .first()
        .map(|first| OutputLayout::for_sidecar(first))
        .ok_or_else(|| CliError::Other("no sidecar files given".into()))
}

/// Path as printed in progress lines: file name only.
pub(super) fn display_name(path: Option<&PathBuf>) -> String {
    path.and_then(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let options = GlobalOptions {
            min_len: Some(8),
            no_listings: true,
            ..GlobalOptions::default()
        };
        let config = load_config(&options).unwrap();
        assert_eq!(config.strings.min_length, 8);
        assert!(!config.output.write_listings);
    }

    #[test]
    fn test_zero_min_len_rejected() {
        let options = GlobalOptions {
            min_len: Some(0),
            ..GlobalOptions::default()
        };
        assert!(matches!(load_config(&options), Err(CliError::Scan(fwscan::Error::Config(_)))));
    }

    #[test]
    fn test_report_layout_from_first_sidecar() {
        let layout =
            resolve_report_layout(&[PathBuf::from("out/fw_seg01.json")], None).unwrap();
        assert_eq!(layout.stem(), "fw");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Some(&PathBuf::from("a/b/fw_seg00.bin"))), "fw_seg00.bin");
        assert_eq!(display_name(None), "-");
    }
}

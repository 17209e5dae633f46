use std::path::{Path, PathBuf};

use super::model::SampleSeries;
use crate::error::{Result, SparkError};

/// Suffix appended to the input base name for the cleaned table.
pub const OUTPUT_SUFFIX: &str = "-sparkremoved.csv";

/// `<dir>/<base>-sparkremoved.csv` next to the input file.
pub fn output_path_for(input: &Path) -> PathBuf {
    sibling_with_suffix(input, OUTPUT_SUFFIX)
}

/// File name with a trailing `.csv` removed; other extensions are kept so
/// `run1.csv` and `run1.asc` in one folder never share output names.
pub fn base_name(input: &Path) -> String {
    let name = input
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let cut = name.len().saturating_sub(4);
    match name.get(cut..) {
        Some(ext) if cut > 0 && ext.eq_ignore_ascii_case(".csv") => name[..cut].to_string(),
        _ => name,
    }
}

/// Sibling of `input` named after its base name plus `suffix`.
pub fn sibling_with_suffix(input: &Path, suffix: &str) -> PathBuf {
    input.with_file_name(format!("{}{suffix}", base_name(input)))
}

/// Write `x,y` pairs, one per line, no header.
///
/// Floats are written in their shortest round-trip form, so reading the file
/// back with the loader yields the same values.
pub fn write_csv(path: &Path, series: &SampleSeries) -> Result<()> {
    let write_err = |reason: String| SparkError::ArtifactWrite {
        path: path.to_path_buf(),
        reason,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| write_err(e.to_string()))?;

    for (x, y) in series.x.iter().zip(&series.y) {
        writer
            .write_record([x.to_string(), y.to_string()])
            .map_err(|e| write_err(e.to_string()))?;
    }
    writer.flush().map_err(|e| write_err(e.to_string()))?;

    log::debug!("Wrote {} rows to {}", series.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_file;

    #[test]
    fn test_output_path_strips_only_csv() {
        assert_eq!(
            output_path_for(Path::new("/data/run1.csv")),
            PathBuf::from("/data/run1-sparkremoved.csv")
        );
        assert_eq!(
            output_path_for(Path::new("/data/run1.CSV")),
            PathBuf::from("/data/run1-sparkremoved.csv")
        );
        assert_eq!(
            output_path_for(Path::new("/data/run1.asc")),
            PathBuf::from("/data/run1.asc-sparkremoved.csv")
        );
        assert_eq!(
            sibling_with_suffix(Path::new("scan.v2.csv"), "-comparison.jpg"),
            PathBuf::from("scan.v2-comparison.jpg")
        );
        assert_eq!(base_name(Path::new("noext")), "noext");
        assert_eq!(base_name(Path::new(".csv")), ".csv");
    }

    #[test]
    fn test_round_trip_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let series = SampleSeries::new(
            vec![2800.5, 2801.25, 2802.0, 1.0e-7],
            vec![0.1 + 0.2, -3.75, 12345.678901234, 6.02e23],
        )
        .unwrap();

        write_csv(&path, &series).unwrap();
        let back = load_file(&path).unwrap();
        assert_eq!(back, series);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(text.starts_with("2800.5,"));
    }

    #[test]
    fn test_unwritable_path_is_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let series = SampleSeries::new(vec![1.0], vec![2.0]).unwrap();
        let err = write_csv(&path, &series).unwrap_err();
        assert!(matches!(err, SparkError::ArtifactWrite { .. }));
    }
}

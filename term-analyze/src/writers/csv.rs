//! Statistics table as delimited text.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use arrow::csv::WriterBuilder;
use tracing::debug;

use super::{statistics_batch, ArtifactKind};
use crate::analyzers::AnalysisResult;
use crate::prelude::*;

/// Writes the describe-style statistics table to `path`.
///
/// Undefined statistics are written as empty fields.
pub fn write_statistics_csv(result: &AnalysisResult, path: &Path) -> Result<()> {
    let batch = statistics_batch(result)?;
    let fail = |e: Box<dyn std::error::Error + Send + Sync>| {
        TermError::write(ArtifactKind::StatisticsCsv, path, e)
    };

    let file = File::create(path).map_err(|e| fail(e.into()))?;
    let mut sink = BufWriter::new(file);
    {
        let mut writer = WriterBuilder::new().with_header(true).build(&mut sink);
        writer.write(&batch).map_err(|e| fail(e.into()))?;
    }
    sink.flush().map_err(|e| fail(e.into()))?;

    debug!(
        columns = batch.num_columns(),
        path = %path.display(),
        "Statistics CSV written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writers::tests::sample_result;

    #[test]
    fn test_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.csv");
        write_statistics_csv(&sample_result(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "statistic,age");
        assert_eq!(lines.len(), 10);
        assert!(lines[1].starts_with("count,3"));
        assert!(lines[6].starts_with("25%,25"));
    }

    #[test]
    fn test_missing_directory_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("stats.csv");
        let err = write_statistics_csv(&sample_result(), &path).unwrap_err();

        assert!(matches!(
            err,
            TermError::Write {
                artifact: ArtifactKind::StatisticsCsv,
                ..
            }
        ));
        assert_eq!(err.io_kind(), Some(std::io::ErrorKind::NotFound));
    }
}

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::types::{ReadError, ReferenceSeries};

/// Read a 1-D reference series (e.g. DOC concentrations) from a text file.
///
/// The first line is a header label (first whitespace token only); every
/// following line carries one real number. Lines that do not parse, such as
/// a trailing blank line, are skipped — this is a forgiving parse, not a
/// strict format.
pub fn read_reference(path: impl AsRef<Path>) -> Result<ReferenceSeries, ReadError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let header_line = lines
        .next()
        .ok_or_else(|| ReadError::Format(format!("{}: empty reference file", path.display())))??;
    let header = header_line
        .split_whitespace()
        .next()
        .ok_or_else(|| {
            ReadError::Format(format!("{}: reference file has no header token", path.display()))
        })?
        .to_string();

    let mut values = Vec::new();
    for line in lines {
        let line = line?;
        let Some(first) = line.split_whitespace().next() else {
            continue;
        };
        if let Ok(value) = first.parse::<f64>() {
            values.push(value);
        }
    }

    Ok(ReferenceSeries { values, header })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_reads_header_and_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"DOC (mg/L)\n1.0\n2.5\n4.8\n").unwrap();

        let series = read_reference(&path).unwrap();
        assert_eq!(series.header, "DOC");
        assert_eq!(series.values, vec![1.0, 2.5, 4.8]);
    }

    #[test]
    fn test_trailing_blank_line_is_tolerated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"DOC (mg/L)\n1.0\n2.5\n\n").unwrap();

        let series = read_reference(&path).unwrap();
        assert_eq!(series.values.len(), 2);
    }
}

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::NaiveDateTime;
use log::debug;
use ndarray::Array2;

use super::types::ReadError;
use super::utils::list_files;
use crate::timestamp::parse_score_timestamp;

/// Loadings of one PARAFAC mode. Rows carry a two-level index of
/// (series-type label, wavelength); columns are the model components,
/// labeled `component 1` .. `component N`.
#[derive(Debug, Clone)]
pub struct LoadingsTable {
    pub series_types: Vec<String>,
    pub wavelengths: Vec<f64>,
    pub components: Vec<String>,
    pub values: Array2<f64>,
}

/// Per-sample component scores, indexed by (series-type label, timestamp).
#[derive(Debug, Clone)]
pub struct ScoresTable {
    pub series_types: Vec<String>,
    pub timestamps: Vec<NaiveDateTime>,
    pub components: Vec<String>,
    pub values: Array2<f64>,
}

/// A pre-computed PARAFAC model read from an OpenFluor-style file. Models
/// downloaded from OpenFluor normally carry no scores.
#[derive(Debug, Clone)]
pub struct ParafacModel {
    pub excitation: LoadingsTable,
    pub emission: LoadingsTable,
    pub scores: Option<ScoresTable>,
    pub metadata: BTreeMap<String, String>,
}

/// Cursor over the file's lines. Block extents are discovered by walking
/// forward once; each table is handed to its sub-parser as a
/// `(start, count)` window, never by rescanning the file.
struct LineCursor<'a> {
    lines: &'a [String],
    pos: usize,
}

impl<'a> LineCursor<'a> {
    fn current(&self) -> Option<&'a str> {
        self.lines.get(self.pos).map(|s| s.as_str())
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn at_comment(&self) -> bool {
        self.current()
            .is_some_and(|line| line.trim_start().starts_with('#'))
    }

    fn at_prefix(&self, prefix: &str) -> bool {
        self.current().is_some_and(|line| line.starts_with(prefix))
    }

    /// Skip a comment block, reporting whether any line contained `marker`.
    fn skip_comment_block(&mut self, marker: &str) -> bool {
        let mut saw_marker = false;
        while self.at_comment() {
            if self.current().is_some_and(|line| line.contains(marker)) {
                saw_marker = true;
            }
            self.advance();
        }
        saw_marker
    }

    /// Consume the rows starting with `prefix` and return their window.
    fn take_prefixed_rows(&mut self, prefix: &str) -> (usize, usize) {
        let start = self.pos;
        while self.at_prefix(prefix) {
            self.advance();
        }
        (start, self.pos - start)
    }
}

/// Import a PARAFAC model from a text file written in the format suggested
/// by OpenFluor (https://openfluor.lablicate.com/).
pub fn read_parafac_model(path: impl AsRef<Path>) -> Result<ParafacModel, ReadError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let lines: Vec<String> = BufReader::new(file)
        .lines()
        .map(|line| line.map(|l| l.trim_end().to_string()))
        .collect::<Result<_, _>>()?;

    let mut cursor = LineCursor {
        lines: &lines,
        pos: 0,
    };

    if cursor.skip_comment_block("Fluorescence") {
        debug!("{}: reading fluorescence measurement info", path.display());
    }

    let mut metadata = BTreeMap::new();
    while let Some(line) = cursor.current() {
        if cursor.at_comment() {
            break;
        }
        let mut parts = line.splitn(2, '\t');
        let key = parts.next().unwrap_or("").trim();
        let value = parts.next().unwrap_or("").trim();
        if !key.is_empty() {
            metadata.insert(key.to_string(), value.to_string());
        }
        cursor.advance();
    }

    if cursor.current().is_none() {
        return Err(ReadError::Format(format!(
            "{}: file ends before the loadings section",
            path.display()
        )));
    }
    if cursor.skip_comment_block("Excitation") {
        debug!("{}: reading Ex/Em loadings", path.display());
    }

    let (ex_start, ex_count) = cursor.take_prefixed_rows("Ex");
    if ex_count == 0 {
        return Err(ReadError::Format(format!(
            "{}: no excitation loadings rows",
            path.display()
        )));
    }
    let (em_start, em_count) = cursor.take_prefixed_rows("Em");
    if em_count == 0 {
        return Err(ReadError::Format(format!(
            "{}: no emission loadings rows",
            path.display()
        )));
    }

    let excitation = parse_loadings(&lines[ex_start..ex_start + ex_count], path)?;
    let emission = parse_loadings(&lines[em_start..em_start + em_count], path)?;
    if emission.components.len() != excitation.components.len() {
        return Err(ReadError::DimensionMismatch {
            expected: excitation.components.len(),
            found: emission.components.len(),
        });
    }

    // When a model carries no scores, the score-announce block and the
    // terminating block collapse into one comment block, so the end marker
    // may show up on either side of the (possibly empty) score rows.
    let mut saw_score_marker = false;
    let mut saw_end = false;
    while cursor.at_comment() {
        if let Some(line) = cursor.current() {
            saw_score_marker |= line.contains("Score");
            saw_end |= line.contains("end");
        }
        cursor.advance();
    }
    if saw_score_marker {
        debug!("{}: reading component scores", path.display());
    }

    let (score_start, score_count) = cursor.take_prefixed_rows("Score");

    while cursor.at_comment() {
        if let Some(line) = cursor.current() {
            saw_end |= line.contains("end");
        }
        cursor.advance();
    }
    if !saw_end {
        return Err(ReadError::Format(format!(
            "{}: missing end marker",
            path.display()
        )));
    }

    let scores = if score_count > 0 {
        Some(parse_scores(
            &lines[score_start..score_start + score_count],
            excitation.components.len(),
            path,
        )?)
    } else {
        None
    };

    debug!("{}: reading complete", path.display());

    Ok(ParafacModel {
        excitation,
        emission,
        scores,
        metadata,
    })
}

/// Import every PARAFAC model in a folder whose filename contains `kw`,
/// recording the filename in each model's metadata.
pub fn read_parafac_models(
    dir: impl AsRef<Path>,
    kw: &str,
) -> Result<Vec<ParafacModel>, ReadError> {
    let dir = dir.as_ref();
    let mut models = Vec::new();

    for name in list_files(dir, kw)? {
        let mut model = read_parafac_model(dir.join(&name))?;
        model.metadata.insert("filename".to_string(), name);
        models.push(model);
    }

    Ok(models)
}

fn component_labels(n: usize) -> Vec<String> {
    (1..=n).map(|rank| format!("component {}", rank)).collect()
}

fn parse_loadings(rows: &[String], path: &Path) -> Result<LoadingsTable, ReadError> {
    let mut series_types = Vec::with_capacity(rows.len());
    let mut wavelengths = Vec::with_capacity(rows.len());
    let mut data: Vec<f64> = Vec::new();
    let mut n_components: Option<usize> = None;

    for row in rows {
        let mut fields = row.split('\t');

        let series = fields.next().unwrap_or("").trim();
        let wavelength = fields
            .next()
            .ok_or_else(|| {
                ReadError::Format(format!("{}: loadings row missing wavelength", path.display()))
            })?
            .trim()
            .parse::<f64>()
            .map_err(|_| {
                ReadError::Format(format!(
                    "{}: non-numeric loadings wavelength",
                    path.display()
                ))
            })?;

        let values = fields
            .map(|field| field.trim().parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|_| {
                ReadError::Format(format!(
                    "{}: non-numeric loading at {} nm",
                    path.display(),
                    wavelength
                ))
            })?;
        if values.is_empty() {
            return Err(ReadError::Format(format!(
                "{}: loadings row has no component columns",
                path.display()
            )));
        }

        match n_components {
            None => n_components = Some(values.len()),
            Some(expected) if expected != values.len() => {
                return Err(ReadError::DimensionMismatch {
                    expected,
                    found: values.len(),
                });
            }
            Some(_) => {}
        }

        series_types.push(series.to_string());
        wavelengths.push(wavelength);
        data.extend_from_slice(&values);
    }

    let n = n_components.unwrap_or(0);
    let values = Array2::from_shape_vec((rows.len(), n), data)
        .map_err(|e| ReadError::Format(format!("{}: {}", path.display(), e)))?;

    Ok(LoadingsTable {
        series_types,
        wavelengths,
        components: component_labels(n),
        values,
    })
}

fn parse_scores(
    rows: &[String],
    n_components: usize,
    path: &Path,
) -> Result<ScoresTable, ReadError> {
    let mut series_types = Vec::with_capacity(rows.len());
    let mut timestamps = Vec::with_capacity(rows.len());
    let mut data: Vec<f64> = Vec::new();

    for row in rows {
        let mut fields = row.split('\t');

        let series = fields.next().unwrap_or("").trim();
        let timestamp = fields.next().ok_or_else(|| {
            ReadError::Format(format!("{}: score row missing timestamp", path.display()))
        })?;
        let timestamp = parse_score_timestamp(timestamp.trim())?;

        let values = fields
            .map(|field| field.trim().parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|_| {
                ReadError::Format(format!("{}: non-numeric score value", path.display()))
            })?;
        if values.len() != n_components {
            return Err(ReadError::DimensionMismatch {
                expected: n_components,
                found: values.len(),
            });
        }

        series_types.push(series.to_string());
        timestamps.push(timestamp);
        data.extend_from_slice(&values);
    }

    let values = Array2::from_shape_vec((rows.len(), n_components), data)
        .map_err(|e| ReadError::Format(format!("{}: {}", path.display(), e)))?;

    Ok(ScoresTable {
        series_types,
        timestamps,
        components: component_labels(n_components),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use std::io::Write;
    use tempfile::tempdir;

    const MODEL_WITH_SCORES: &str = "\
# Fluorescence Model
#
Name\tLake survey
Components\t2
Toolbox\tdrEEM
#
# Excitation spectra
#
Ex\t240\t0.10\t0.30
Ex\t245\t0.20\t0.40
Ex\t250\t0.30\t0.50
Em\t300\t0.50\t0.10
Em\t310\t0.60\t0.20
Em\t320\t0.70\t0.30
#
# Score values
#
Score\t2017-05-23 12:30:00\t11.0\t21.0
Score\t2017-05-24 08:15:00\t12.0\t22.0
Score\t2017-05-25 09:45:00\t13.0\t23.0
#
# end of model
";

    const MODEL_WITHOUT_SCORES: &str = "\
# Fluorescence Model
Name\tOpenFluor export
#
# Excitation spectra
#
Ex\t240\t0.10\t0.30
Ex\t245\t0.20\t0.40
Em\t300\t0.50\t0.10
Em\t310\t0.60\t0.20
#
# end of model
";

    fn write_model(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_two_component_model_with_scores() {
        let dir = tempdir().unwrap();
        let path = write_model(dir.path(), "lake_model.txt", MODEL_WITH_SCORES);

        let model = read_parafac_model(&path).unwrap();

        assert_eq!(model.metadata["Name"], "Lake survey");
        assert_eq!(model.metadata["Components"], "2");

        assert_eq!(model.excitation.components, vec!["component 1", "component 2"]);
        assert_eq!(model.excitation.wavelengths, vec![240.0, 245.0, 250.0]);
        assert_eq!(model.excitation.values.dim(), (3, 2));
        assert_eq!(model.excitation.values[[2, 1]], 0.50);

        assert_eq!(model.emission.components.len(), 2);
        assert_eq!(model.emission.series_types, vec!["Em", "Em", "Em"]);

        let scores = model.scores.unwrap();
        assert_eq!(scores.values.dim(), (3, 2));
        assert_eq!(scores.timestamps[0].day(), 23);
        assert_eq!(scores.timestamps[1].hour(), 8);
        assert_eq!(scores.components, vec!["component 1", "component 2"]);
    }

    #[test]
    fn test_model_without_scores() {
        let dir = tempdir().unwrap();
        let path = write_model(dir.path(), "openfluor_model.txt", MODEL_WITHOUT_SCORES);

        let model = read_parafac_model(&path).unwrap();
        assert!(model.scores.is_none());
        assert_eq!(model.excitation.values.dim(), (2, 2));
        assert_eq!(model.emission.values.dim(), (2, 2));
    }

    #[test]
    fn test_single_token_metadata_maps_to_empty() {
        let dir = tempdir().unwrap();
        let content = MODEL_WITHOUT_SCORES.replace("Name\tOpenFluor export", "Validated");
        let path = write_model(dir.path(), "meta_model.txt", &content);

        let model = read_parafac_model(&path).unwrap();
        assert_eq!(model.metadata["Validated"], "");
    }

    #[test]
    fn test_missing_end_marker_fails() {
        let dir = tempdir().unwrap();
        let content = MODEL_WITHOUT_SCORES.replace("# end of model\n", "");
        let path = write_model(dir.path(), "truncated_model.txt", &content);

        let err = read_parafac_model(&path).unwrap_err();
        assert!(matches!(err, ReadError::Format(_)));
    }

    #[test]
    fn test_batch_import_attaches_filenames() {
        let dir = tempdir().unwrap();
        write_model(dir.path(), "a_model.txt", MODEL_WITH_SCORES);
        write_model(dir.path(), "b_model.txt", MODEL_WITHOUT_SCORES);
        write_model(dir.path(), "ignore.csv", "not a model");

        let models = read_parafac_models(dir.path(), "model.txt").unwrap();
        assert_eq!(models.len(), 2);

        let mut filenames: Vec<&str> = models
            .iter()
            .map(|m| m.metadata["filename"].as_str())
            .collect();
        filenames.sort();
        assert_eq!(filenames, vec!["a_model.txt", "b_model.txt"]);
    }
}

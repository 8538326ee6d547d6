use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use crate::interp::InterpMethod;
use crate::readers::DataFormat;

pub mod error;
pub use error::ConfigError;

/// Options driving a dataset import: which files to pick up, how to read
/// them, and whether to align wavelength grids across the dataset.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    keyword: String,
    data_format: DataFormat,
    index_pos: Option<(usize, usize)>,
    custom_filenames: Option<Vec<String>>,
    wavelength_alignment: bool,
    interpolation_method: InterpMethod,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            keyword: "PEM.dat".to_string(),
            data_format: DataFormat::Aqualog,
            index_pos: None,
            custom_filenames: None,
            wavelength_alignment: false,
            interpolation_method: InterpMethod::Linear,
        }
    }
}

// Deserializes ImportOptions from JSON, resolving the string tags and
// rejecting an index window whose start lies past its end.
impl<'de> Deserialize<'de> for ImportOptions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ImportOptionsHelper {
            keyword: Option<String>,
            data_format: Option<String>,
            index_pos: Option<(usize, usize)>,
            custom_filenames: Option<Vec<String>>,
            wavelength_alignment: Option<bool>,
            interpolation_method: Option<InterpMethod>,
        }

        let helper = ImportOptionsHelper::deserialize(deserializer)?;
        let defaults = ImportOptions::default();

        let data_format = match helper.data_format {
            Some(tag) => DataFormat::from_str(&tag)
                .map_err(|e| D::Error::custom(format!("Invalid data_format: {}", e)))?,
            None => defaults.data_format,
        };

        let interpolation_method = helper
            .interpolation_method
            .unwrap_or(defaults.interpolation_method);

        if let Some((start, end)) = helper.index_pos
            && start > end
        {
            return Err(D::Error::custom(ConfigError::IndexPos));
        }

        Ok(ImportOptions {
            keyword: helper.keyword.unwrap_or(defaults.keyword),
            data_format,
            index_pos: helper.index_pos,
            custom_filenames: helper.custom_filenames,
            wavelength_alignment: helper.wavelength_alignment.unwrap_or(false),
            interpolation_method,
        })
    }
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ImportOptions, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let options: ImportOptions =
            serde_json::from_reader(reader).map_err(ConfigError::from)?;

        Ok(options)
    }

    pub fn with_keyword(mut self, kw: impl Into<String>) -> Self {
        self.keyword = kw.into();
        self
    }

    pub fn with_data_format(mut self, format: DataFormat) -> Self {
        self.data_format = format;
        self
    }

    pub fn with_index_pos(mut self, start: usize, end: usize) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::IndexPos);
        }
        self.index_pos = Some((start, end));
        Ok(self)
    }

    pub fn with_custom_filenames(mut self, filenames: Vec<String>) -> Self {
        self.custom_filenames = Some(filenames);
        self
    }

    pub fn with_wavelength_alignment(mut self, align: bool) -> Self {
        self.wavelength_alignment = align;
        self
    }

    pub fn with_interpolation_method(mut self, method: InterpMethod) -> Self {
        self.interpolation_method = method;
        self
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn data_format(&self) -> DataFormat {
        self.data_format
    }

    pub fn index_pos(&self) -> Option<(usize, usize)> {
        self.index_pos
    }

    pub fn custom_filenames(&self) -> Option<&[String]> {
        self.custom_filenames.as_deref()
    }

    pub fn wavelength_alignment(&self) -> bool {
        self.wavelength_alignment
    }

    pub fn interpolation_method(&self) -> InterpMethod {
        self.interpolation_method
    }
}

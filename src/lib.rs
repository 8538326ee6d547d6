//! Import of instrument-generated fluorescence spectroscopy data: Aqualog
//! excitation-emission matrices and UV absorbance spectra, OpenFluor
//! PARAFAC model files, and batch import of whole folders with optional
//! wavelength-grid alignment across mixed spectral resolutions.

pub mod config;
pub mod dataset;
pub mod interp;
pub mod readers;
pub mod timestamp;

pub use config::ImportOptions;
pub use dataset::{AbsorbanceDataset, EemDataset, read_absorbance_dataset, read_eem_dataset};
pub use readers::{
    Absorbance, DataFormat, Eem, ParafacModel, ReadError, read_absorbance, read_eem,
    read_parafac_model, read_parafac_models, read_reference,
};

pub mod absorbance;
pub mod eem;
pub mod parafac;
pub mod reference;
pub mod types;
pub mod utils;

pub use absorbance::read_absorbance;
pub use eem::read_eem;
pub use parafac::{LoadingsTable, ParafacModel, ScoresTable, read_parafac_model, read_parafac_models};
pub use reference::read_reference;
pub use types::{Absorbance, DataFormat, Eem, ReadError, ReferenceSeries};
pub use utils::{extract_index, list_files};

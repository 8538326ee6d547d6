pub mod absorbance;
pub mod eem;

pub use absorbance::{AbsorbanceDataset, read_absorbance_dataset};
pub use eem::{EemDataset, read_eem_dataset};

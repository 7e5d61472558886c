// Reports module - income statement (DRE) and tax burden built from the engine outputs

pub mod burden;
pub mod dre;

pub use burden::{summarize_burden, TaxBurden, TaxShare};
pub use dre::{build_dre, Deductions, DreResult, IncomeTaxes};

//! Apuracao - Brazilian corporate tax engine (Lucro Real)
//!
//! This library computes ICMS, PIS, COFINS, IRPJ and CSLL from a single
//! [`config::TaxConfiguration`] and assembles the resulting income statement
//! (DRE). Every engine is a pure function of its inputs; see
//! [`tax::compute`] for the full pipeline and [`tax::TaxCalculator`] for the
//! memoizing front-end.

pub mod config;
pub mod error;
pub mod reports;
pub mod tax;
pub mod utils;

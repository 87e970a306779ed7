//! Tax Computation Engine for salaried employees
//!
//! This crate resolves an employee's salary structure, annualises it and
//! computes income tax under the old and new regimes: exemptions,
//! deductions, slab tax, rebate, surcharge with marginal relief, cess and
//! the per-period withholding schedule, each step recorded in an audit trace.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;

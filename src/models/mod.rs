//! Core data models for the Tax Computation Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod assignment;
mod claims;
mod component;
mod computation_input;
mod regime;
mod tax_result;
mod taxpayer;

pub use assignment::{
    AssignmentLine, AssignmentStatus, EmployeeSalaryAssignment, SalaryAssignmentHistory,
    SalaryAssignmentHistoryRecord,
};
pub use claims::{
    CapExceededWarning, DeductionClaim, ExemptionClaim, ExemptionDeclarations,
    HouseRentDeclaration,
};
pub use component::{ComponentCatalogue, ComponentKind, SalaryComponent, ValueKind};
pub use computation_input::{SalarySource, TaxComputationInput, WithholdingStatus};
pub use regime::{Regime, TieBreak};
pub use tax_result::{
    AuditStep, AuditTrace, AuditWarning, MonthlyProjection, RegimeComparison, SlabLine,
    TaxComputationResult,
};
pub use taxpayer::{AgeBand, ResidentialStatus, TaxpayerProfile};

//! Error types for the Tax Computation Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can abort a tax computation. Non-fatal
//! conditions such as a capped claim are not errors; they are attached to
//! the result as warnings.

use thiserror::Error;

/// The main error type for the Tax Computation Engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use tax_engine::error::EngineError;
///
/// let error = EngineError::CyclicDependency {
///     codes: vec!["HRA".to_string(), "SPECIAL".to_string()],
/// };
/// assert_eq!(
///     error.to_string(),
///     "Cyclic dependency between salary components: HRA, SPECIAL"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but describes an unusable regime.
    #[error("Invalid configuration for tax year '{tax_year}': {message}")]
    InvalidConfig {
        /// The tax year the configuration belongs to.
        tax_year: String,
        /// What is wrong with it.
        message: String,
    },

    /// No configuration exists for the requested tax year.
    #[error("Tax year not found: {tax_year}")]
    TaxYearNotFound {
        /// The tax year identifier that was requested.
        tax_year: String,
    },

    /// A formula could not be parsed.
    #[error("Invalid expression '{expression}': {message}")]
    InvalidExpression {
        /// The offending formula.
        expression: String,
        /// A description of the syntax problem.
        message: String,
    },

    /// A formula refers to a component code with no resolved value.
    #[error("Unknown reference '{reference}' in expression '{expression}'")]
    UnknownReference {
        /// The identifier that could not be resolved.
        reference: String,
        /// The formula containing it.
        expression: String,
    },

    /// A formula divided by a value that evaluated to zero.
    #[error("Division by zero in expression '{expression}'")]
    DivisionByZero {
        /// The offending formula.
        expression: String,
    },

    /// Formula components reference each other in a cycle.
    #[error("Cyclic dependency between salary components: {}", codes.join(", "))]
    CyclicDependency {
        /// The component codes that take part in (or depend on) the cycle.
        codes: Vec<String>,
    },

    /// A salary assignment refers to a component missing from the catalogue.
    #[error("Salary component not found: {code}")]
    UnknownComponent {
        /// The component code that was not found.
        code: String,
    },

    /// A raw input failed validation before entering the pipeline.
    #[error("Invalid input field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

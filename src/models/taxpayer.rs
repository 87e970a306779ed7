//! Taxpayer profile: the personal facts that change how tax is computed.

use serde::{Deserialize, Serialize};

/// Residential status for the tax year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidentialStatus {
    /// Resident for the tax year.
    #[default]
    Resident,
    /// Non-resident for the tax year.
    NonResident,
}

/// Age band used to select an age-dependent slab table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBand {
    /// Younger than 60.
    Below60,
    /// 60 to 79 inclusive.
    Age60To79,
    /// 80 or older.
    Age80Plus,
}

impl AgeBand {
    /// Returns the band an age falls in.
    ///
    /// # Example
    ///
    /// ```
    /// use tax_engine::models::AgeBand;
    ///
    /// assert_eq!(AgeBand::from_age(59), AgeBand::Below60);
    /// assert_eq!(AgeBand::from_age(60), AgeBand::Age60To79);
    /// assert_eq!(AgeBand::from_age(80), AgeBand::Age80Plus);
    /// ```
    pub fn from_age(age: u32) -> Self {
        match age {
            0..=59 => AgeBand::Below60,
            60..=79 => AgeBand::Age60To79,
            _ => AgeBand::Age80Plus,
        }
    }

    /// Returns the snake_case tag used in configuration and audit output.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeBand::Below60 => "below_60",
            AgeBand::Age60To79 => "age_60_to_79",
            AgeBand::Age80Plus => "age_80_plus",
        }
    }
}

/// The employee-level facts a computation depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxpayerProfile {
    /// Unique identifier for the employee.
    pub employee_id: String,
    /// Age at the end of the tax year.
    pub age: u32,
    /// Residential status for the tax year.
    #[serde(default)]
    pub residential_status: ResidentialStatus,
}

impl TaxpayerProfile {
    /// Returns true if the taxpayer is resident.
    pub fn is_resident(&self) -> bool {
        self.residential_status == ResidentialStatus::Resident
    }

    /// Age band, considered only for residents when `residents_only` is set.
    pub fn age_band(&self, residents_only: bool) -> AgeBand {
        if residents_only && !self.is_resident() {
            AgeBand::Below60
        } else {
            AgeBand::from_age(self.age)
        }
    }
}

use serde::{Deserialize, Serialize};

#[cfg(feature = "growth")]
use crate::growth::{
    fixed_deposit::{BankRateTable, FdTaxConfig},
    ppf::PpfConfig,
    retirement::RetirementConfig,
};
#[cfg(feature = "loans")]
use crate::loans::amortization::LoanRateTable;
#[cfg(feature = "tax")]
use crate::tax::regime::TaxConfig;
use crate::FinPlanResult;

/// Jurisdiction- and year-dependent parameters for every calculator.
///
/// Every section defaults to the FY 2024-25 values, so a config file only
/// needs the sections it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    #[cfg(feature = "tax")]
    pub tax: TaxConfig,
    #[cfg(feature = "growth")]
    pub fixed_deposit: FdTaxConfig,
    #[cfg(feature = "growth")]
    pub bank_rates: BankRateTable,
    #[cfg(feature = "growth")]
    pub ppf: PpfConfig,
    #[cfg(feature = "growth")]
    pub retirement: RetirementConfig,
    #[cfg(feature = "loans")]
    pub loan_rates: LoanRateTable,
}

impl PlannerConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json_str(json: &str) -> FinPlanResult<Self> {
        let config: PlannerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject slab tables that do not partition taxable income.
    pub fn validate(&self) -> FinPlanResult<()> {
        #[cfg(feature = "tax")]
        {
            self.tax.old_regime.validate()?;
            self.tax.new_regime.validate()?;
        }
        log::debug!("config validated");
        Ok(())
    }
}

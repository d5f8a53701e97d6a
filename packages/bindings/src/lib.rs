use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

#[napi]
pub fn amortize_loan(input_json: String) -> NapiResult<String> {
    let input: finplan_core::loans::amortization::LoanInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finplan_core::loans::amortization::amortize(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(serde::Deserialize)]
struct LoanComparisonBindingInput {
    loans: Vec<finplan_core::loans::portfolio::LoanRecord>,
}

#[napi]
pub fn compare_loans(input_json: String) -> NapiResult<String> {
    let binding_input: LoanComparisonBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finplan_core::loans::portfolio::aggregate(&binding_input.loans)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Growth
// ---------------------------------------------------------------------------

#[napi]
pub fn project_sip(input_json: String) -> NapiResult<String> {
    let input: finplan_core::growth::sip::SipInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finplan_core::growth::sip::project_sip(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn project_compound_interest(input_json: String) -> NapiResult<String> {
    let input: finplan_core::growth::compound::CompoundInterestInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finplan_core::growth::compound::project_compound_interest(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn project_fixed_deposit(input_json: String) -> NapiResult<String> {
    let input: finplan_core::growth::fixed_deposit::FdInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finplan_core::growth::fixed_deposit::project_fixed_deposit(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn project_ppf(input_json: String) -> NapiResult<String> {
    let input: finplan_core::growth::ppf::PpfInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = finplan_core::growth::ppf::project_ppf(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn plan_retirement(input_json: String) -> NapiResult<String> {
    let input: finplan_core::growth::retirement::RetirementInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        finplan_core::growth::retirement::plan_retirement(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn project_growth(input_json: String) -> NapiResult<String> {
    let input: finplan_core::growth::scenario::GrowthScenario =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        finplan_core::growth::scenario::project_scenario(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Tax
// ---------------------------------------------------------------------------

/// Regime chosen by name, with the slab tables taken from `config`.
#[derive(serde::Deserialize)]
struct TaxBindingInput {
    gross_income: rust_decimal::Decimal,
    #[serde(default)]
    regime: finplan_core::tax::regime::RegimeKind,
    #[serde(default)]
    deductions: finplan_core::tax::income_tax::Deductions,
    #[serde(default)]
    config: finplan_core::tax::regime::TaxConfig,
}

#[napi]
pub fn compute_income_tax(input_json: String) -> NapiResult<String> {
    let binding_input: TaxBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let input = finplan_core::tax::income_tax::TaxInput::from_config(
        binding_input.gross_income,
        binding_input.regime,
        binding_input.deductions,
        &binding_input.config,
    );
    let output = finplan_core::tax::income_tax::compute_tax(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_tax_regimes(input_json: String) -> NapiResult<String> {
    let input: finplan_core::tax::income_tax::RegimeComparisonInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        finplan_core::tax::income_tax::compare_regimes(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[napi]
pub fn default_config() -> NapiResult<String> {
    serde_json::to_string(&finplan_core::PlannerConfig::default()).map_err(to_napi_error)
}

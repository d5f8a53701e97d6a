pub mod growth;
pub mod loans;
pub mod tax;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::input;

/// Raw JSON from `--input <file>` or piped stdin, if either is present.
pub fn read_raw_input(path: Option<&str>) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(Some(input::file::read_json(path)?)),
        None => input::stdin::read_stdin(),
    }
}

/// Typed input from `--input <file>` or piped stdin, if either is present.
pub fn read_input<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    Ok(read_raw_input(path)?
        .map(serde_json::from_value)
        .transpose()?)
}

/// Like [`read_input`], but top-level fields the document leaves out are
/// taken from `defaults` (the loaded `--config` sections).
pub fn read_input_with_defaults<T: DeserializeOwned>(
    path: Option<&str>,
    defaults: Vec<(&str, Value)>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    match read_raw_input(path)? {
        Some(mut value) => {
            fill_missing(&mut value, defaults);
            Ok(Some(serde_json::from_value(value)?))
        }
        None => Ok(None),
    }
}

/// Insert each default whose key is absent from a JSON object.
pub fn fill_missing(value: &mut Value, defaults: Vec<(&str, Value)>) {
    if let Value::Object(map) = value {
        for (key, default) in defaults {
            if !map.contains_key(key) {
                log::debug!("input: '{key}' taken from config");
                map.insert(key.to_string(), default);
            }
        }
    }
}

/// Calculator catalogue shown by `finplan calculators`.
pub fn run_calculators() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(json!([
        { "id": "sip", "title": "SIP Calculator", "command": "sip",
          "description": "Future value of a monthly systematic investment plan" },
        { "id": "emi", "title": "EMI Calculator", "command": "emi",
          "description": "Equated monthly installment and yearly amortisation" },
        { "id": "ppf", "title": "PPF Calculator", "command": "ppf",
          "description": "Public Provident Fund maturity with extension blocks" },
        { "id": "fd", "title": "FD Calculator", "command": "fd",
          "description": "Fixed deposit maturity with post-tax returns" },
        { "id": "tax", "title": "Income Tax Calculator", "command": "tax, tax-compare",
          "description": "Slab tax with cess under the old or new regime" },
        { "id": "retirement", "title": "Retirement Planner", "command": "retirement",
          "description": "Required corpus and the monthly SIP that funds it" },
        { "id": "loan", "title": "Loan Comparison", "command": "loans",
          "description": "Side-by-side EMIs and totals for several loans" },
        { "id": "compound", "title": "Compound Interest Calculator", "command": "compound",
          "description": "Compound growth with top-ups against simple interest" },
    ]))
}

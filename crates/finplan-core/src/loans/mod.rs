pub mod amortization;
pub mod portfolio;

use serde::Serialize;

/// Snapshot of the user's assumptions at calculation time. Rates are
/// fractions (0.3 means 30%), not percentages.
#[derive(Debug, Clone, Copy)]
pub struct Assumptions {
    pub current_tax_rate: f64,
    pub retirement_tax_rate: f64,
    pub deposit_amount: f64,
    pub years_of_investment: u32,
    pub return_on_investment: f64,
    pub inflation_rate: f64,
}

/// Inflation-adjusted comparison of the two account types, in the same
/// currency unit as the deposit. Unrounded; formatting happens at display.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub tsfa_deposit: f64,
    pub tsfa_future_value: f64,
    pub tsfa_tax_paid: f64,
    pub tsfa_after_tax_future_value: f64,
    pub rrsp_deposit: f64,
    pub rrsp_future_value: f64,
    pub rrsp_tax_paid: f64,
    pub rrsp_after_tax_future_value: f64,
}

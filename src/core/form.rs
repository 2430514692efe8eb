use std::time::{Duration, Instant};

use serde::Serialize;

use super::engine::project;
use super::format::format_currency;
use super::types::{Assumptions, Projection};
use super::validate::validate;

/// Quiet period after the last edit anywhere before a recomputation runs.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(500);

const FIELD_COUNT: usize = 6;

/// The six tracked inputs. Percent-labelled fields are divided by 100 when
/// assumptions are read.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FieldId {
    CurrentTaxRate,
    RetirementTaxRate,
    DepositAmount,
    YearsOfInvestment,
    ReturnOnInvestment,
    InflationRate,
}

impl FieldId {
    pub const ALL: [FieldId; FIELD_COUNT] = [
        FieldId::CurrentTaxRate,
        FieldId::RetirementTaxRate,
        FieldId::DepositAmount,
        FieldId::YearsOfInvestment,
        FieldId::ReturnOnInvestment,
        FieldId::InflationRate,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// One timer shared by the whole field group: every edit reschedules the
/// same deadline, so rapid edits to any mix of fields coalesce into a single
/// recomputation once the quiet period elapses.
#[derive(Debug)]
pub struct DebounceTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn restart(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consumes the deadline when it has been reached.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// The output surface: formatted currency strings for the eight projection
/// figures plus the plain-text years echo. Replaced wholesale on every
/// successful recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPanel {
    pub years_of_investment: String,
    pub tsfa_deposit: String,
    pub tsfa_future_value: String,
    pub tsfa_tax_paid: String,
    pub tsfa_after_tax_future_value: String,
    pub rrsp_deposit: String,
    pub rrsp_future_value: String,
    pub rrsp_tax_paid: String,
    pub rrsp_after_tax_future_value: String,
}

impl DisplayPanel {
    pub fn render(years_of_investment: u32, projection: &Projection) -> Self {
        Self {
            years_of_investment: years_of_investment.to_string(),
            tsfa_deposit: format_currency(projection.tsfa_deposit),
            tsfa_future_value: format_currency(projection.tsfa_future_value),
            tsfa_tax_paid: format_currency(projection.tsfa_tax_paid),
            tsfa_after_tax_future_value: format_currency(projection.tsfa_after_tax_future_value),
            rrsp_deposit: format_currency(projection.rrsp_deposit),
            rrsp_future_value: format_currency(projection.rrsp_future_value),
            rrsp_tax_paid: format_currency(projection.rrsp_tax_paid),
            rrsp_after_tax_future_value: format_currency(projection.rrsp_after_tax_future_value),
        }
    }
}

/// Aggregation layer over the engine: raw field text, at most one error
/// annotation per field, the shared debounce timer, and the displayed panel.
///
/// The engine never runs while any field is empty or annotated; on a
/// projection error the stale panel stays until the input is corrected.
#[derive(Debug)]
pub struct FormSession {
    values: [String; FIELD_COUNT],
    annotations: [Option<&'static str>; FIELD_COUNT],
    panel: Option<DisplayPanel>,
    timer: DebounceTimer,
    last_error: Option<String>,
}

impl FormSession {
    pub fn new() -> Self {
        Self::with_delay(DEBOUNCE_DELAY)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            values: Default::default(),
            annotations: [None; FIELD_COUNT],
            panel: None,
            timer: DebounceTimer::new(delay),
            last_error: None,
        }
    }

    /// Stores the new text, re-validates the field (clearing any previous
    /// annotation before inserting the new one), and restarts the shared
    /// timer.
    pub fn edit(&mut self, field: FieldId, text: &str, now: Instant) {
        self.values[field.index()] = text.to_string();
        self.annotations[field.index()] = validate(text).err().map(|e| e.message());
        self.timer.restart(now);
    }

    /// Runs the pending recomputation if the quiet period has elapsed and
    /// every field is filled and valid. Returns whether the panel was
    /// replaced.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.timer.fire_if_due(now) {
            return false;
        }
        if !self.all_fields_filled() || !self.all_fields_valid() {
            return false;
        }
        let Some(assumptions) = self.read_assumptions() else {
            return false;
        };

        match project(&assumptions) {
            Ok(projection) => {
                self.panel = Some(DisplayPanel::render(
                    assumptions.years_of_investment,
                    &projection,
                ));
                self.last_error = None;
                true
            }
            Err(message) => {
                self.last_error = Some(message);
                false
            }
        }
    }

    pub fn annotation(&self, field: FieldId) -> Option<&'static str> {
        self.annotations[field.index()]
    }

    pub fn panel(&self) -> Option<&DisplayPanel> {
        self.panel.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn all_fields_filled(&self) -> bool {
        self.values.iter().all(|value| !value.trim().is_empty())
    }

    fn all_fields_valid(&self) -> bool {
        self.annotations.iter().all(Option::is_none)
    }

    fn read_assumptions(&self) -> Option<Assumptions> {
        let mut parsed = [0i64; FIELD_COUNT];
        for field in FieldId::ALL {
            parsed[field.index()] = validate(&self.values[field.index()]).ok()?;
        }

        let percent = |field: FieldId| parsed[field.index()] as f64 / 100.0;
        Some(Assumptions {
            current_tax_rate: percent(FieldId::CurrentTaxRate),
            retirement_tax_rate: percent(FieldId::RetirementTaxRate),
            deposit_amount: parsed[FieldId::DepositAmount.index()] as f64,
            years_of_investment: u32::try_from(parsed[FieldId::YearsOfInvestment.index()])
                .unwrap_or(u32::MAX),
            return_on_investment: percent(FieldId::ReturnOnInvestment),
            inflation_rate: percent(FieldId::InflationRate),
        })
    }
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new()
    }
}

mod engine;
mod form;
mod format;
mod types;
mod validate;

pub use engine::{future_value, project, real_rate_of_return};
pub use form::{DEBOUNCE_DELAY, DebounceTimer, DisplayPanel, FieldId, FormSession};
pub use format::format_currency;
pub use types::{Assumptions, Projection};
pub use validate::{FieldError, parse_leading_int, validate};

/// Why a raw field value was rejected, paired with the inline message shown
/// next to the offending input.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FieldError {
    NotANumber,
    NotPositive,
}

impl FieldError {
    pub fn message(self) -> &'static str {
        match self {
            FieldError::NotANumber => "Please enter a number",
            FieldError::NotPositive => "Please enter a positive value",
        }
    }
}

/// Loose integer parse: leading whitespace and an optional sign are accepted,
/// a maximal digit prefix is consumed, and trailing content is ignored
/// ("5abc" parses as 5). Returns None when no digit prefix exists. The
/// magnitude saturates at the i64 bound instead of failing.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let rest = raw.trim_start();
    let (negative, rest) = match rest.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, rest.strip_prefix('+').unwrap_or(rest)),
    };

    let digit_count = rest
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digit_count == 0 {
        return None;
    }

    let mut value: i64 = 0;
    for digit in rest[..digit_count].bytes() {
        value = value
            .saturating_mul(10)
            .saturating_add((digit - b'0') as i64);
    }
    Some(if negative {
        value.saturating_neg()
    } else {
        value
    })
}

/// Verdict for one raw field value: the parsed positive integer, or the
/// reason it was rejected.
pub fn validate(raw: &str) -> Result<i64, FieldError> {
    match parse_leading_int(raw) {
        None => Err(FieldError::NotANumber),
        Some(value) if value <= 0 => Err(FieldError::NotPositive),
        Some(value) => Ok(value),
    }
}

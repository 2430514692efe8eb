/// CAD currency rendering: two decimal places, comma thousands separators,
/// "$" prefix, sign ahead of the symbol ("-$381.79").
pub fn format_currency(amount: f64) -> String {
    let rounded = format!("{:.2}", amount.abs());
    let (int_part, dec_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let grouped = group_thousands(int_part);
    if amount.is_sign_negative() && rounded != "0.00" {
        format!("-${grouped}.{dec_part}")
    } else {
        format!("${grouped}.{dec_part}")
    }
}

fn group_thousands(digits: &str) -> String {
    let bytes = digits.as_bytes();
    let mut grouped = String::with_capacity(bytes.len() + bytes.len() / 3);
    for (idx, byte) in bytes.iter().enumerate() {
        if idx > 0 && (bytes.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*byte as char);
    }
    grouped
}

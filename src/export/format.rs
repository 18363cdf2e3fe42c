use rust_decimal::Decimal;

/// Render with a fixed number of decimals and `,` as thousands separator, e.g. `1,234,567.89`
pub fn format_thousands(value: Decimal, decimals: u32) -> String {
    let mut value = value.round_dp(decimals);
    value.rescale(decimals);
    let rendered = value.abs().to_string();
    let (integer, fraction) = match rendered.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (rendered.as_str(), None),
    };

    let mut result = String::with_capacity(rendered.len() + integer.len() / 3 + 1);
    if value.is_sign_negative() && !value.is_zero() {
        result.push('-');
    }
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            result.push(',');
        }
        result.push(digit);
    }
    if let Some(fraction) = fraction {
        result.push('.');
        result.push_str(fraction);
    }
    result
}

pub fn format_money(value: Decimal) -> String {
    let formatted = format_thousands(value, 2);
    match formatted.strip_prefix('-') {
        Some(positive) => format!("-${}", positive),
        None => format!("${}", formatted),
    }
}

use rust_decimal::{prelude::ToPrimitive as _, Decimal};
use std::str::FromStr as _;

const CURRENCY_SYMBOLS: [char; 3] = ['$', '€', '£'];

/// Parse a revenue cell like `1234.5`, `$1,234.56`, `-$14.44`, `$-14.44` or `($14.44)`.
pub fn parse_amount(content: &str) -> Result<Decimal, &'static str> {
    let mut content = content.trim();
    let mut negative = false;
    if let Some(inner) = content
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        negative = true;
        content = inner.trim();
    }
    if let Some(rest) = content.strip_prefix('-') {
        negative = !negative;
        content = rest.trim_start();
    }
    if let Some(rest) = content.strip_prefix(CURRENCY_SYMBOLS) {
        content = rest.trim_start();
        if let Some(rest) = content.strip_prefix('-') {
            negative = !negative;
            content = rest;
        }
    }
    let content: String = content
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if content.is_empty() {
        return Err("Empty amount");
    }
    if content.starts_with(['-', '+']) {
        return Err("Misplaced sign");
    }
    let amount = Decimal::from_str(&content)
        .or_else(|_| Decimal::from_scientific(&content))
        .map_err(|_| "Failed to parse amount")?;
    Ok(if negative { -amount } else { amount })
}

/// Parse a quantity cell. Integral floats like `3.0` are accepted since spreadsheet exports often produce them.
pub fn parse_quantity(content: &str) -> Result<i64, &'static str> {
    let content = content.trim();
    if content.is_empty() {
        return Err("Empty quantity");
    }
    let quantity = Decimal::from_str(content).map_err(|_| "Failed to parse quantity")?;
    if !quantity.fract().is_zero() {
        return Err("Quantity is not a whole number");
    }
    quantity.to_i64().ok_or("Quantity out of range")
}

#[cfg(test)]
mod test {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_amount(
        #[values("", "$", "€", "£")] currency_symbol: &str,
        #[values(("123.45", Decimal::new(12345, 2)), ("0.00", Decimal::new(0, 2)), ("7", Decimal::new(7, 0)))]
        (input, expected): (&str, Decimal),
    ) {
        let input = format!("{}{}", currency_symbol, input);
        assert_eq!(Ok(expected), parse_amount(&input));
    }

    #[test]
    fn with_thousand_separator() {
        assert_eq!(Ok(Decimal::new(123456, 2)), parse_amount("$1,234.56"));
        assert_eq!(Ok(Decimal::new(123456789, 2)), parse_amount("1,234,567.89"));
    }

    #[test]
    fn surrounding_whitespace() {
        assert_eq!(Ok(Decimal::new(12345, 2)), parse_amount("  $ 123.45 "));
    }

    #[rstest]
    #[case("-$14.44")]
    #[case("$-14.44")]
    #[case("-14.44")]
    #[case("($14.44)")]
    #[case("(14.44)")]
    fn negative_amount(#[case] input: &str) {
        assert_eq!(Ok(Decimal::new(-1444, 2)), parse_amount(input));
    }

    #[test]
    fn scientific_notation() {
        assert_eq!(Ok(Decimal::new(1500, 0)), parse_amount("1.5e3"));
    }

    #[rstest]
    #[case("")]
    #[case("$")]
    #[case("abc")]
    #[case("$123.4.5")]
    #[case("12 USD")]
    #[case("--5")]
    fn invalid_amount(#[case] input: &str) {
        assert!(parse_amount(input).is_err(), "{input}");
    }

    #[rstest]
    #[case("3", 3)]
    #[case("3.0", 3)]
    #[case(" 10 ", 10)]
    #[case("-2", -2)]
    fn valid_quantity(#[case] input: &str, #[case] expected: i64) {
        assert_eq!(Ok(expected), parse_quantity(input));
    }

    #[rstest]
    #[case("")]
    #[case("2.5")]
    #[case("two")]
    fn invalid_quantity(#[case] input: &str) {
        assert!(parse_quantity(input).is_err(), "{input}");
    }
}

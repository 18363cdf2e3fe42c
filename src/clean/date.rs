use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Parse the date of a sale. Timestamps are accepted and their time of day discarded.
pub fn parse_date(content: &str) -> Result<NaiveDate, &'static str> {
    let content = content.trim();
    if content.is_empty() {
        return Err("Empty date");
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(content, format) {
            return Ok(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(content, format) {
            return Ok(datetime.date());
        }
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(content) {
        return Ok(datetime.date_naive());
    }
    Err("Unrecognized date format")
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[rstest]
    #[case("2021-01-01", ymd(2021, 1, 1))]
    #[case("2021-12-31", ymd(2021, 12, 31))]
    #[case(" 1980-05-14 ", ymd(1980, 5, 14))]
    #[case("2024/07/18", ymd(2024, 7, 18))]
    #[case("07/18/2024", ymd(2024, 7, 18))]
    #[case("7/8/2024", ymd(2024, 7, 8))]
    #[case("07-18-2024", ymd(2024, 7, 18))]
    #[case("2024-07-18 14:33:12", ymd(2024, 7, 18))]
    #[case("2024-07-18 14:33:12.123456", ymd(2024, 7, 18))]
    #[case("2024-07-18T14:33:12", ymd(2024, 7, 18))]
    #[case("2024-07-18 14:33", ymd(2024, 7, 18))]
    #[case("07/18/2024 09:15:00", ymd(2024, 7, 18))]
    #[case("2024-07-18T23:30:00+02:00", ymd(2024, 7, 18))]
    #[case("2024-07-18T23:30:00Z", ymd(2024, 7, 18))]
    fn valid_date(#[case] input: &str, #[case] expected: NaiveDate) {
        assert_eq!(Ok(expected), parse_date(input));
    }

    #[rstest]
    #[case("")]
    #[case("2021-02-29")]
    #[case("1980-13-14")]
    #[case("1980-05-32")]
    #[case("1980-00-14")]
    #[case("yesterday")]
    #[case("18.07.2024")]
    fn invalid_date(#[case] input: &str) {
        assert!(parse_date(input).is_err(), "{input}");
    }
}

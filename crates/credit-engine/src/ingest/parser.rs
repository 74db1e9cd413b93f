use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug, Deserialize)]
pub(crate) struct CustomerRow {
    #[serde(rename = "Customer ID", default, deserialize_with = "empty_string_as_none")]
    pub(crate) customer_id: Option<String>,
    #[serde(rename = "First Name", default, deserialize_with = "empty_string_as_none")]
    pub(crate) first_name: Option<String>,
    #[serde(rename = "Last Name", default, deserialize_with = "empty_string_as_none")]
    pub(crate) last_name: Option<String>,
    #[serde(rename = "Phone Number", default, deserialize_with = "empty_string_as_none")]
    pub(crate) phone_number: Option<String>,
    #[serde(rename = "Age", default, deserialize_with = "empty_string_as_none")]
    pub(crate) age: Option<String>,
    #[serde(
        rename = "Monthly Salary",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) monthly_salary: Option<String>,
    #[serde(
        rename = "Approved Limit",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) approved_limit: Option<String>,
    #[serde(
        rename = "Current Debt",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) current_debt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoanRow {
    #[serde(rename = "Customer ID", default, deserialize_with = "empty_string_as_none")]
    pub(crate) customer_id: Option<String>,
    #[serde(rename = "Loan ID", default, deserialize_with = "empty_string_as_none")]
    pub(crate) loan_id: Option<String>,
    #[serde(rename = "Loan Amount", default, deserialize_with = "empty_string_as_none")]
    pub(crate) loan_amount: Option<String>,
    #[serde(rename = "Tenure", default, deserialize_with = "empty_string_as_none")]
    pub(crate) tenure: Option<String>,
    #[serde(
        rename = "Interest Rate",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) interest_rate: Option<String>,
    #[serde(
        rename = "EMIs paid on Time",
        alias = "EMIs Paid on Time",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) emis_paid_on_time: Option<String>,
    #[serde(
        rename = "Date of Approval",
        alias = "Start Date",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) start_date: Option<String>,
    #[serde(rename = "End Date", default, deserialize_with = "empty_string_as_none")]
    pub(crate) end_date: Option<String>,
}

pub(crate) fn parse_rows<R, T>(reader: R) -> Result<Vec<T>, csv::Error>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    csv_reader.deserialize::<T>().collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

/// Spreadsheet exports write integer ids as `12` or `12.0`; zero is treated as absent.
pub(crate) fn parse_id(value: Option<&str>) -> Option<u64> {
    let number = parse_number(value)?;
    if number >= 1.0 && number.fract() == 0.0 && number <= u64::MAX as f64 {
        Some(number as u64)
    } else {
        None
    }
}

pub(crate) fn parse_count(value: Option<&str>) -> Option<u32> {
    let number = parse_number(value)?;
    if number >= 0.0 && number.fract() == 0.0 && number <= f64::from(u32::MAX) {
        Some(number as u32)
    } else {
        None
    }
}

pub(crate) fn parse_number(value: Option<&str>) -> Option<f64> {
    let cleaned = value?.replace(',', "");
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

pub(crate) fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc().date());
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date())
        })
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn ids_accept_spreadsheet_floats_and_reject_zero() {
        assert_eq!(parse_id(Some("12")), Some(12));
        assert_eq!(parse_id(Some("12.0")), Some(12));
        assert_eq!(parse_id(Some("0")), None);
        assert_eq!(parse_id(Some("12.5")), None);
        assert_eq!(parse_id(Some("abc")), None);
        assert_eq!(parse_id(None), None);
    }

    #[test]
    fn numbers_tolerate_thousands_separators() {
        assert_eq!(parse_number(Some("1,800,000")), Some(1_800_000.0));
        assert_eq!(parse_number(Some("NaN")), None);
        assert_eq!(parse_count(Some("-1")), None);
        assert_eq!(parse_count(Some("86")), Some(86));
    }

    #[test]
    fn dates_support_plain_timestamp_and_rfc3339_forms() {
        let expected = NaiveDate::from_ymd_opt(2022, 11, 7);
        assert_eq!(parse_date(Some("2022-11-07")), expected);
        assert_eq!(parse_date(Some("2022-11-07 00:00:00")), expected);
        assert_eq!(parse_date(Some("2022-11-07T10:00:00Z")), expected);
        assert_eq!(parse_date(Some("07/11/2022")), None);
        assert_eq!(parse_date(Some("  ")), None);
    }

    #[test]
    fn blank_cells_deserialize_as_none() {
        let rows: Vec<CustomerRow> = parse_rows(Cursor::new(
            "Customer ID,First Name,Last Name,Phone Number,Age,Monthly Salary,Approved Limit\n\
7,Aarav,  ,9629317944,63,  ,1800000\n",
        ))
        .expect("parse");
        let row = &rows[0];
        assert_eq!(row.customer_id.as_deref(), Some("7"));
        assert!(row.last_name.is_none());
        assert!(row.monthly_salary.is_none());
        assert!(row.current_debt.is_none());
    }
}

//! Derived-field extraction.
//!
//! Passenger ids (`"<group>_<position>"`) and cabins
//! (`"<deck>/<number>/<side>"`) are split into their parts. Extraction is
//! all-or-nothing: a value that does not parse completely yields nulls for
//! every derived field, never a mix of real and missing parts. Malformed
//! values are not errors.

use crate::error::Result;
use crate::schema::{
    BOOLEAN_COLUMNS, CABIN, CABIN_NUMBER, DECK, EXPENSE_COLUMNS, GROUP_NUMBER, GROUP_POSITION, ID,
    SIDE, TOTAL_EXPENSES,
};
use crate::utils::{column_bool_as_f64, column_strings, float_column, optional_f64_series};
use polars::prelude::*;
use tracing::debug;

/// The three parts of a cabin designation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CabinParts {
    pub deck: String,
    pub number: i64,
    pub side: String,
}

/// Split a passenger id into `(group_number, group_position)`.
///
/// Both halves must parse as integers.
pub fn parse_passenger_id(id: &str) -> Option<(i64, i64)> {
    let (group, position) = id.split_once('_')?;
    Some((group.parse().ok()?, position.parse().ok()?))
}

/// Split a cabin into deck, number and side.
///
/// Requires exactly three `/`-separated parts, a non-empty deck and side, and
/// an integer number.
pub fn parse_cabin(cabin: &str) -> Option<CabinParts> {
    let mut parts = cabin.split('/');
    let (deck, number, side) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || deck.is_empty() || side.is_empty() {
        return None;
    }
    Some(CabinParts {
        deck: deck.to_string(),
        number: number.parse().ok()?,
        side: side.to_string(),
    })
}

/// Add group_number, group_position, deck, cabin_number and side.
///
/// The source `id` and `cabin` columns are left in place; they are dropped by
/// the final projection.
pub fn derive_identity_fields(df: &DataFrame) -> Result<DataFrame> {
    let ids = column_strings(df, ID)?;
    let cabins = column_strings(df, CABIN)?;

    let (group_number, group_position): (Vec<Option<f64>>, Vec<Option<f64>>) = ids
        .iter()
        .map(|id| match id.as_deref().and_then(parse_passenger_id) {
            Some((group, position)) => (Some(group as f64), Some(position as f64)),
            None => (None, None),
        })
        .unzip();

    let parsed: Vec<Option<CabinParts>> = cabins
        .iter()
        .map(|c| c.as_deref().and_then(parse_cabin))
        .collect();
    let malformed = cabins
        .iter()
        .zip(&parsed)
        .filter(|(raw, parts)| raw.is_some() && parts.is_none())
        .count();
    if malformed > 0 {
        debug!("{} cabin values did not parse and were treated as missing", malformed);
    }

    let deck: Vec<Option<String>> = parsed.iter().map(|p| p.as_ref().map(|p| p.deck.clone())).collect();
    let number: Vec<Option<f64>> = parsed.iter().map(|p| p.as_ref().map(|p| p.number as f64)).collect();
    let side: Vec<Option<String>> = parsed.iter().map(|p| p.as_ref().map(|p| p.side.clone())).collect();

    let mut out = df.clone();
    out.with_column(optional_f64_series(GROUP_NUMBER, group_number))?;
    out.with_column(optional_f64_series(GROUP_POSITION, group_position))?;
    out.with_column(Series::new(DECK.into(), deck))?;
    out.with_column(optional_f64_series(CABIN_NUMBER, number))?;
    out.with_column(Series::new(SIDE.into(), side))?;
    Ok(out)
}

/// Convert cryo_sleep and vip to 0.0 / 1.0 floats, keeping nulls.
pub fn coerce_boolean_columns(df: &DataFrame) -> Result<DataFrame> {
    let mut out = df.clone();
    for column in BOOLEAN_COLUMNS {
        let values = column_bool_as_f64(df, column)?;
        out.with_column(optional_f64_series(column, values))?;
    }
    Ok(out)
}

/// Row-wise sum of the five raw expense columns, treating nulls as zero.
pub fn total_expenses(df: &DataFrame) -> Result<Series> {
    let mut totals = Float64Chunked::full(TOTAL_EXPENSES.into(), 0.0, df.height());
    for column in EXPENSE_COLUMNS {
        totals = &totals + &float_column(df, column)?.fill_null_with_values(0.0)?;
    }
    Ok(totals.with_name(TOTAL_EXPENSES.into()).into_series())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::column_f64;

    #[test]
    fn test_parse_passenger_id_valid() {
        assert_eq!(parse_passenger_id("1234_56"), Some((1234, 56)));
        assert_eq!(parse_passenger_id("0001_01"), Some((1, 1)));
    }

    #[test]
    fn test_parse_passenger_id_malformed() {
        assert_eq!(parse_passenger_id("invalid"), None);
        assert_eq!(parse_passenger_id("12_ab"), None);
        assert_eq!(parse_passenger_id("12_3_4"), None);
        assert_eq!(parse_passenger_id("_3"), None);
    }

    #[test]
    fn test_parse_cabin_valid() {
        assert_eq!(
            parse_cabin("B/123/P"),
            Some(CabinParts {
                deck: "B".to_string(),
                number: 123,
                side: "P".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_cabin_malformed_is_all_or_nothing() {
        assert_eq!(parse_cabin("invalid"), None);
        assert_eq!(parse_cabin("B/x/P"), None);
        assert_eq!(parse_cabin("B/12"), None);
        assert_eq!(parse_cabin("B/12/P/extra"), None);
        assert_eq!(parse_cabin("/12/P"), None);
    }

    #[test]
    fn test_derive_identity_fields_nulls_together() {
        let df = df![
            ID => [Some("1234_56"), Some("invalid"), None],
            CABIN => [Some("B/123/P"), Some("G/x/S"), None],
        ]
        .unwrap();

        let out = derive_identity_fields(&df).unwrap();

        assert_eq!(
            column_f64(&out, GROUP_NUMBER).unwrap(),
            vec![Some(1234.0), None, None]
        );
        assert_eq!(
            column_f64(&out, GROUP_POSITION).unwrap(),
            vec![Some(56.0), None, None]
        );
        assert_eq!(
            column_strings(&out, DECK).unwrap(),
            vec![Some("B".to_string()), None, None]
        );
        assert_eq!(
            column_f64(&out, CABIN_NUMBER).unwrap(),
            vec![Some(123.0), None, None]
        );
        assert_eq!(
            column_strings(&out, SIDE).unwrap(),
            vec![Some("P".to_string()), None, None]
        );
        // source columns are untouched
        assert!(out.column(ID).is_ok());
        assert!(out.column(CABIN).is_ok());
    }

    #[test]
    fn test_coerce_boolean_columns() {
        let df = df![
            "cryo_sleep" => [Some(true), None, Some(false)],
            "vip" => [Some("False"), Some("True"), None],
        ]
        .unwrap();

        let out = coerce_boolean_columns(&df).unwrap();
        assert_eq!(out.column("cryo_sleep").unwrap().dtype(), &DataType::Float64);
        assert_eq!(
            column_f64(&out, "cryo_sleep").unwrap(),
            vec![Some(1.0), None, Some(0.0)]
        );
        assert_eq!(column_f64(&out, "vip").unwrap(), vec![Some(0.0), Some(1.0), None]);
    }

    #[test]
    fn test_total_expenses_treats_null_as_zero() {
        let df = df![
            "room_service" => [Some(100.0), None],
            "food_court" => [Some(50.0), Some(1.0)],
            "shopping_mall" => [Some(0.0), None],
            "spa" => [Some(200.0), None],
            "vr_deck" => [Some(30.0), Some(2.0)],
        ]
        .unwrap();

        let totals = total_expenses(&df).unwrap();
        let values: Vec<Option<f64>> = totals.f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(380.0), Some(3.0)]);
    }
}

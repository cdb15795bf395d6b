//! Column names and input schema resolution.
//!
//! Raw tables arrive either with the Kaggle column names (`PassengerId`,
//! `HomePlanet`, ...) or with the canonical snake_case names used throughout
//! the crate. [`resolve_input`] maps whichever spelling is present onto the
//! canonical names, rejects tables missing a required field, and splits off
//! the label column.

use crate::error::{PreprocessingError, Result};
use polars::prelude::*;
use tracing::debug;

pub const ID: &str = "id";
pub const HOME_PLANET: &str = "home_planet";
pub const CRYO_SLEEP: &str = "cryo_sleep";
pub const CABIN: &str = "cabin";
pub const DESTINATION: &str = "destination";
pub const AGE: &str = "age";
pub const VIP: &str = "vip";
pub const ROOM_SERVICE: &str = "room_service";
pub const FOOD_COURT: &str = "food_court";
pub const SHOPPING_MALL: &str = "shopping_mall";
pub const SPA: &str = "spa";
pub const VR_DECK: &str = "vr_deck";

pub const GROUP_NUMBER: &str = "group_number";
pub const GROUP_POSITION: &str = "group_position";
pub const DECK: &str = "deck";
pub const CABIN_NUMBER: &str = "cabin_number";
pub const SIDE: &str = "side";
pub const TOTAL_EXPENSES: &str = "total_expenses";
pub const AGE_BIN: &str = "age_bin";

/// Name of the passenger id column in a submission table.
pub const SUBMISSION_ID: &str = "PassengerId";

/// The five raw expense columns, in input order.
pub const EXPENSE_COLUMNS: [&str; 5] = [ROOM_SERVICE, FOOD_COURT, SHOPPING_MALL, SPA, VR_DECK];

/// Boolean fields carried as 0.0 / 1.0 floats.
pub const BOOLEAN_COLUMNS: [&str; 2] = [CRYO_SLEEP, VIP];

/// Label-encoded categorical fields.
pub const CATEGORICAL_COLUMNS: [&str; 4] = [HOME_PLANET, DESTINATION, DECK, SIDE];

/// Columns whose nulls are filled with the fit-time median.
pub const MEDIAN_COLUMNS: [&str; 9] = [
    AGE,
    GROUP_NUMBER,
    GROUP_POSITION,
    CABIN_NUMBER,
    ROOM_SERVICE,
    FOOD_COURT,
    SHOPPING_MALL,
    SPA,
    VR_DECK,
];

/// Columns standardized with the fit-time mean and standard deviation.
pub const SCALED_COLUMNS: [&str; 5] = [AGE, GROUP_NUMBER, GROUP_POSITION, CABIN_NUMBER, TOTAL_EXPENSES];

/// Fixed column order of every transformed frame.
pub const OUTPUT_COLUMNS: [&str; 17] = [
    GROUP_NUMBER,
    GROUP_POSITION,
    DECK,
    CABIN_NUMBER,
    SIDE,
    HOME_PLANET,
    CRYO_SLEEP,
    DESTINATION,
    AGE,
    VIP,
    TOTAL_EXPENSES,
    "room_service_bin",
    "food_court_bin",
    "shopping_mall_bin",
    "spa_bin",
    "vr_deck_bin",
    AGE_BIN,
];

/// Name of the bin column derived from `column`.
pub fn bin_column(column: &str) -> String {
    format!("{column}_bin")
}

/// Names the passenger id is accepted under.
pub const ID_ALIASES: &[&str] = &[SUBMISSION_ID, ID];

/// A required input field and the column names it is accepted under.
#[derive(Debug, Clone, Copy)]
pub struct InputField {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
}

/// Every field a raw table must carry.
pub const REQUIRED_FIELDS: [InputField; 12] = [
    InputField { canonical: ID, aliases: ID_ALIASES },
    InputField { canonical: HOME_PLANET, aliases: &["HomePlanet", HOME_PLANET] },
    InputField { canonical: CRYO_SLEEP, aliases: &["CryoSleep", CRYO_SLEEP] },
    InputField { canonical: CABIN, aliases: &["Cabin", CABIN] },
    InputField { canonical: DESTINATION, aliases: &["Destination", DESTINATION] },
    InputField { canonical: AGE, aliases: &["Age", AGE] },
    InputField { canonical: VIP, aliases: &["VIP", VIP] },
    InputField { canonical: ROOM_SERVICE, aliases: &["RoomService", ROOM_SERVICE] },
    InputField { canonical: FOOD_COURT, aliases: &["FoodCourt", FOOD_COURT] },
    InputField { canonical: SHOPPING_MALL, aliases: &["ShoppingMall", SHOPPING_MALL] },
    InputField { canonical: SPA, aliases: &["Spa", SPA] },
    InputField { canonical: VR_DECK, aliases: &["VRDeck", VR_DECK] },
];

/// A raw table mapped onto canonical names, with the label split off.
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    pub frame: DataFrame,
    pub labels: Option<Series>,
}

/// Find the first alias of `field` present in `df`.
pub fn find_column<'a>(df: &'a DataFrame, aliases: &[&str]) -> Option<&'a Column> {
    aliases.iter().find_map(|name| df.column(name).ok())
}

/// Map a raw table onto the canonical schema.
///
/// Returns a new frame containing exactly the required fields under their
/// canonical names. The label column (`target_column`, or its lowercase
/// spelling) is returned separately and unchanged.
pub fn resolve_input(df: &DataFrame, target_column: &str) -> Result<ResolvedInput> {
    if df.height() == 0 {
        return Err(PreprocessingError::Schema(
            "input table has no rows".to_string(),
        ));
    }

    let mut columns = Vec::with_capacity(REQUIRED_FIELDS.len());
    for field in REQUIRED_FIELDS {
        let column = find_column(df, field.aliases)
            .ok_or_else(|| PreprocessingError::missing_column(field.canonical, field.aliases))?;
        let mut series = column.as_materialized_series().clone();
        series.rename(field.canonical.into());
        columns.push(series.into_column());
    }

    let target_lower = target_column.to_ascii_lowercase();
    let labels = find_column(df, &[target_column, target_lower.as_str()])
        .map(|c| c.as_materialized_series().clone());

    let ignored = df
        .width()
        .saturating_sub(columns.len() + usize::from(labels.is_some()));
    if ignored > 0 {
        debug!("Ignoring {} columns outside the passenger schema", ignored);
    }

    Ok(ResolvedInput {
        frame: DataFrame::new(columns)?,
        labels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kaggle_row() -> DataFrame {
        df![
            "PassengerId" => ["0001_01"],
            "HomePlanet" => ["Europa"],
            "CryoSleep" => [false],
            "Cabin" => ["B/0/P"],
            "Destination" => ["TRAPPIST-1e"],
            "Age" => [39.0],
            "VIP" => [false],
            "RoomService" => [0.0],
            "FoodCourt" => [0.0],
            "ShoppingMall" => [0.0],
            "Spa" => [0.0],
            "VRDeck" => [0.0],
            "Name" => ["Maham Ofracculy"],
            "Transported" => [false],
        ]
        .unwrap()
    }

    #[test]
    fn test_resolve_kaggle_names() {
        let resolved = resolve_input(&kaggle_row(), "Transported").unwrap();
        let names: Vec<String> = resolved
            .frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let expected: Vec<String> = REQUIRED_FIELDS.iter().map(|f| f.canonical.to_string()).collect();
        assert_eq!(names, expected);
        assert_eq!(resolved.labels.unwrap().name().as_str(), "Transported");
    }

    #[test]
    fn test_resolve_without_label() {
        let df = kaggle_row().drop("Transported").unwrap();
        let resolved = resolve_input(&df, "Transported").unwrap();
        assert!(resolved.labels.is_none());
    }

    #[test]
    fn test_resolve_lowercase_label_alias() {
        let mut df = kaggle_row();
        df.rename("Transported", "transported".into()).unwrap();
        let resolved = resolve_input(&df, "Transported").unwrap();
        assert!(resolved.labels.is_some());
    }

    #[test]
    fn test_missing_required_column() {
        let df = kaggle_row().drop("Cabin").unwrap();
        let err = resolve_input(&df, "Transported").unwrap_err();
        assert!(err.is_schema_error());
        assert!(err.to_string().contains("cabin"));
    }

    #[test]
    fn test_empty_table_rejected() {
        let df = kaggle_row().head(Some(0));
        let err = resolve_input(&df, "Transported").unwrap_err();
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_bin_column_name() {
        assert_eq!(bin_column(SPA), "spa_bin");
        assert!(OUTPUT_COLUMNS.contains(&bin_column(VR_DECK).as_str()));
    }
}

//! End-to-end helpers around the preprocessor.
//!
//! These tie the pipeline to an external [`Classifier`]: split a labelled
//! table, fit on one part, score on the other, and build a submission table
//! from an unlabelled one.

use crate::error::{PreprocessingError, Result};
use crate::pipeline::Preprocessor;
use crate::schema::{ID, ID_ALIASES, SUBMISSION_ID, find_column};
use crate::types::{Classifier, TrainingReport};
use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::info;

/// Shuffle rows with `seed` and split off `validation_fraction` of them.
///
/// The validation part gets `round(n * fraction)` rows, but both parts keep
/// at least one row when the table has two or more.
pub fn train_validation_split(
    df: &DataFrame,
    validation_fraction: f64,
    seed: u64,
) -> Result<(DataFrame, DataFrame)> {
    if !(validation_fraction > 0.0 && validation_fraction < 1.0) {
        return Err(PreprocessingError::InvalidConfig(format!(
            "validation fraction must be in (0, 1), got {}",
            validation_fraction
        )));
    }

    let n = df.height();
    if n < 2 {
        return Err(PreprocessingError::Schema(format!(
            "need at least 2 rows to split, got {}",
            n
        )));
    }

    let mut indices: Vec<IdxSize> = (0..n as IdxSize).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_validation = ((n as f64 * validation_fraction).round() as usize).clamp(1, n - 1);
    let (validation_idx, train_idx) = indices.split_at(n_validation);

    let train = df.take(&IdxCa::from_vec("idx".into(), train_idx.to_vec()))?;
    let validation = df.take(&IdxCa::from_vec("idx".into(), validation_idx.to_vec()))?;

    info!(
        "Split {} rows into {} train / {} validation",
        n,
        train.height(),
        validation.height()
    );
    Ok((train, validation))
}

/// Fit `preprocessor` and `classifier` on a training split of `df` and score
/// the classifier on the held-out rows.
///
/// The split fraction and seed come from the preprocessor's own config.
/// `preprocessor` must be unfit; on success it holds the parameters learned
/// from the training split only.
pub fn train_and_validate<C: Classifier>(
    preprocessor: &mut Preprocessor,
    classifier: &mut C,
    df: &DataFrame,
) -> Result<TrainingReport> {
    if preprocessor.is_fitted() {
        return Err(PreprocessingError::AlreadyFitted);
    }

    let config = preprocessor.config();
    let (train_df, validation_df) =
        train_validation_split(df, config.validation_fraction, config.random_seed)?;

    let train = preprocessor.fit_transform(&train_df)?;
    let train_matrix = train.to_matrix()?;
    classifier.fit(&train_matrix, &train.label_vector()?)?;

    let validation = preprocessor.transform(&validation_df)?;
    let validation_matrix = validation.to_matrix()?;
    let expected = validation.label_vector()?;
    let predicted = classifier.predict(&validation_matrix)?;
    if predicted.len() != expected.len() {
        return Err(PreprocessingError::Schema(format!(
            "classifier returned {} predictions for {} rows",
            predicted.len(),
            expected.len()
        )));
    }

    let correct = predicted.iter().zip(&expected).filter(|(p, e)| p == e).count();
    let report = TrainingReport {
        train_rows: train_matrix.n_rows,
        validation_rows: validation_matrix.n_rows,
        n_features: train_matrix.n_cols(),
        validation_accuracy: correct as f64 / expected.len() as f64,
    };

    info!("Validation accuracy: {:.4}", report.validation_accuracy);
    Ok(report)
}

/// Predict every row of `df` and return a `PassengerId`/`Transported` table.
///
/// Passenger ids are copied from the input as-is, so malformed ids still get
/// a prediction.
pub fn predict_submission<C: Classifier>(
    preprocessor: &Preprocessor,
    classifier: &C,
    df: &DataFrame,
) -> Result<DataFrame> {
    let processed = preprocessor.transform(df)?;
    let predictions = classifier.predict(&processed.to_matrix()?)?;
    if predictions.len() != df.height() {
        return Err(PreprocessingError::Schema(format!(
            "classifier returned {} predictions for {} rows",
            predictions.len(),
            df.height()
        )));
    }

    let ids = find_column(df, ID_ALIASES)
        .ok_or_else(|| PreprocessingError::missing_column(ID, ID_ALIASES))?
        .as_materialized_series()
        .cast(&DataType::String)?
        .with_name(SUBMISSION_ID.into());

    let target = preprocessor.config().target_column.as_str();
    let transported = Series::new(target.into(), predictions);

    Ok(DataFrame::new(vec![ids.into_column(), transported.into_column()])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeatureMatrix;

    /// Predicts `true` whenever the named feature is positive.
    struct ThresholdClassifier {
        feature: &'static str,
        column: Option<usize>,
    }

    impl ThresholdClassifier {
        fn new(feature: &'static str) -> Self {
            Self { feature, column: None }
        }
    }

    impl Classifier for ThresholdClassifier {
        fn fit(&mut self, features: &FeatureMatrix, labels: &[bool]) -> Result<()> {
            assert_eq!(features.n_rows, labels.len());
            self.column = features.column_index(self.feature);
            Ok(())
        }

        fn predict(&self, features: &FeatureMatrix) -> Result<Vec<bool>> {
            let column = self.column.ok_or(PreprocessingError::NotFitted)?;
            Ok(features.rows().map(|row| row[column] > 0.0).collect())
        }
    }

    fn passengers(n: usize) -> DataFrame {
        let ids: Vec<String> = (0..n).map(|i| format!("{:04}_01", i + 1)).collect();
        let cryo: Vec<bool> = (0..n).map(|i| i % 2 == 0).collect();
        let cabins: Vec<String> = (0..n).map(|i| format!("B/{}/P", i)).collect();
        let ages: Vec<f64> = (0..n).map(|i| 20.0 + i as f64).collect();
        let spend: Vec<f64> = (0..n).map(|i| if i % 2 == 0 { 0.0 } else { 500.0 }).collect();
        df![
            "PassengerId" => ids,
            "HomePlanet" => vec!["Earth"; n],
            "CryoSleep" => cryo.clone(),
            "Cabin" => cabins,
            "Destination" => vec!["TRAPPIST-1e"; n],
            "Age" => ages,
            "VIP" => vec![false; n],
            "RoomService" => spend.clone(),
            "FoodCourt" => spend.clone(),
            "ShoppingMall" => spend.clone(),
            "Spa" => spend.clone(),
            "VRDeck" => spend,
            "Transported" => cryo,
        ]
        .unwrap()
    }

    #[test]
    fn test_split_sizes_and_determinism() {
        let df = passengers(10);
        let (train, validation) = train_validation_split(&df, 0.2, 42).unwrap();
        assert_eq!(train.height(), 8);
        assert_eq!(validation.height(), 2);

        let (again, _) = train_validation_split(&df, 0.2, 42).unwrap();
        assert!(train.equals(&again));
    }

    #[test]
    fn test_split_rejects_bad_fraction() {
        let df = passengers(10);
        assert_eq!(
            train_validation_split(&df, 1.0, 42).unwrap_err().error_code(),
            "INVALID_CONFIG"
        );
        assert_eq!(
            train_validation_split(&df, 0.0, 42).unwrap_err().error_code(),
            "INVALID_CONFIG"
        );
    }

    #[test]
    fn test_split_keeps_both_sides_non_empty() {
        let (train, validation) = train_validation_split(&passengers(2), 0.01, 7).unwrap();
        assert_eq!((train.height(), validation.height()), (1, 1));
    }

    #[test]
    fn test_train_and_validate_reports_accuracy() {
        let mut preprocessor = Preprocessor::new();
        let mut classifier = ThresholdClassifier::new("cryo_sleep");

        let report = train_and_validate(&mut preprocessor, &mut classifier, &passengers(20)).unwrap();

        assert!(preprocessor.is_fitted());
        assert_eq!(report.train_rows, 16);
        assert_eq!(report.validation_rows, 4);
        assert_eq!(report.n_features, 17);
        // cryo_sleep stays 0/1 and matches the label exactly
        assert_eq!(report.validation_accuracy, 1.0);
    }

    #[test]
    fn test_train_and_validate_uses_preprocessor_config() {
        let config = crate::config::PreprocessorConfig::builder()
            .validation_fraction(0.5)
            .random_seed(7)
            .build()
            .unwrap();
        let mut preprocessor = Preprocessor::with_config(config);
        let mut classifier = ThresholdClassifier::new("cryo_sleep");

        let report = train_and_validate(&mut preprocessor, &mut classifier, &passengers(20)).unwrap();
        assert_eq!((report.train_rows, report.validation_rows), (10, 10));

        // parameters come from the rows the configured seed put in training
        let (train, _) = train_validation_split(&passengers(20), 0.5, 7).unwrap();
        let mut reference = Preprocessor::new();
        reference.fit_transform(&train).unwrap();
        assert_eq!(
            reference.params().unwrap().scaler("age").unwrap(),
            preprocessor.params().unwrap().scaler("age").unwrap()
        );
    }

    #[test]
    fn test_predict_submission_shape() {
        let df = passengers(6);
        let mut preprocessor = Preprocessor::new();
        let train = preprocessor.fit_transform(&df).unwrap();
        let mut classifier = ThresholdClassifier::new("total_expenses");
        classifier
            .fit(&train.to_matrix().unwrap(), &train.label_vector().unwrap())
            .unwrap();

        let test = df.drop("Transported").unwrap();
        let submission = predict_submission(&preprocessor, &classifier, &test).unwrap();

        let names: Vec<String> = submission
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, ["PassengerId", "Transported"]);
        assert_eq!(submission.height(), 6);
        let predicted: Vec<Option<bool>> = submission
            .column("Transported")
            .unwrap()
            .as_materialized_series()
            .bool()
            .unwrap()
            .into_iter()
            .collect();
        // spenders are the odd rows
        assert_eq!(
            predicted,
            vec![Some(false), Some(true), Some(false), Some(true), Some(false), Some(true)]
        );
    }

    #[test]
    fn test_predict_submission_requires_fit() {
        let classifier = ThresholdClassifier::new("age");
        let err = predict_submission(&Preprocessor::new(), &classifier, &passengers(2)).unwrap_err();
        assert!(err.is_not_fitted());
    }
}

//! Seeded train/test split

use crate::config::ModelingConfig;
use crate::error::{HeartError, Result};
use ndarray::Array1;
use polars::prelude::*;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// Features and labels partitioned into train and test sets
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: DataFrame,
    pub x_test: DataFrame,
    pub y_train: Array1<u8>,
    pub y_test: Array1<u8>,
}

/// Shuffle `0..n_samples` and cut it into `(train, test)` index sets.
///
/// `n_test = ceil(test_size * n_samples)`; the test set is the head of the
/// permutation. `None` seeds from OS entropy.
pub fn train_test_split_indices(
    n_samples: usize,
    test_size: f64,
    random_state: Option<u64>,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(HeartError::ConfigError(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    let n_test = (test_size * n_samples as f64).ceil() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(HeartError::DataError(format!(
            "cannot split {} samples with test_size {}: one partition would be empty",
            n_samples, test_size
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = match random_state {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok((train, indices))
}

/// Read the target column as 0/1 labels
pub fn extract_labels(df: &DataFrame, target: &str) -> Result<Array1<u8>> {
    let column = df
        .column(target)
        .map_err(|_| HeartError::FeatureNotFound(target.to_string()))?;
    let casted = column
        .cast(&DataType::Float64)
        .map_err(|e| HeartError::DataError(format!("target `{}`: {}", target, e)))?;

    casted
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(v) if v == 0.0 => Ok(0u8),
            Some(v) if v == 1.0 => Ok(1u8),
            Some(v) => Err(HeartError::DataError(format!(
                "target `{}` must be 0 or 1, found {} at row {}",
                target, v, row
            ))),
            None => Err(HeartError::DataError(format!(
                "target `{}` is missing at row {}",
                target, row
            ))),
        })
        .collect::<Result<Vec<u8>>>()
        .map(Array1::from_vec)
}

fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx = IdxCa::from_vec(
        "idx".into(),
        indices.iter().map(|&i| i as IdxSize).collect(),
    );
    Ok(df.take(&idx)?)
}

/// Separate the target from the features and split both with the configured seed
pub fn split_data(config: &ModelingConfig, df: &DataFrame) -> Result<TrainTestSplit> {
    let labels = extract_labels(df, &config.target)?;
    let features = df.drop(&config.target)?;

    let (train_idx, test_idx) =
        train_test_split_indices(df.height(), config.test_size, config.random_state)?;

    let split = TrainTestSplit {
        x_train: take_rows(&features, &train_idx)?,
        x_test: take_rows(&features, &test_idx)?,
        y_train: train_idx.iter().map(|&i| labels[i]).collect(),
        y_test: test_idx.iter().map(|&i| labels[i]).collect(),
    };

    info!(
        n_train = split.y_train.len(),
        n_test = split.y_test.len(),
        random_state = ?config.random_state,
        "Split dataset"
    );
    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(test_size: f64, seed: Option<u64>) -> ModelingConfig {
        ModelingConfig {
            target: "HeartDisease".to_string(),
            test_size,
            random_state: seed,
        }
    }

    fn frame(n: usize) -> DataFrame {
        let ids: Vec<i64> = (0..n as i64).collect();
        let labels: Vec<i64> = (0..n as i64).map(|i| i % 2).collect();
        df!("id" => ids, "HeartDisease" => labels).unwrap()
    }

    #[test]
    fn test_sizes_use_ceiling() {
        let (train, test) = train_test_split_indices(10, 0.25, Some(1)).unwrap();
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 7);

        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_partition() {
        let a = train_test_split_indices(50, 0.2, Some(42)).unwrap();
        let b = train_test_split_indices(50, 0.2, Some(42)).unwrap();
        let c = train_test_split_indices(50, 0.2, Some(7)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_empty_partition_rejected() {
        assert!(train_test_split_indices(1, 0.5, Some(0)).is_err());
        assert!(train_test_split_indices(0, 0.5, Some(0)).is_err());
        assert!(train_test_split_indices(10, 1.0, Some(0)).is_err());
    }

    #[test]
    fn test_split_data_keeps_rows_aligned() {
        let df = frame(20);
        let split = split_data(&config(0.2, Some(42)), &df).unwrap();

        assert_eq!(split.x_train.height(), 16);
        assert_eq!(split.x_test.height(), 4);
        assert!(split.x_train.column("HeartDisease").is_err());

        let ids = split.x_test.column("id").unwrap().i64().unwrap();
        for (id, label) in ids.into_iter().zip(split.y_test.iter()) {
            assert_eq!(id.unwrap() % 2, *label as i64);
        }
    }

    #[test]
    fn test_non_binary_target() {
        let df = df!("id" => &[1i64, 2], "HeartDisease" => &[0i64, 2]).unwrap();
        assert!(matches!(
            split_data(&config(0.5, Some(0)), &df),
            Err(HeartError::DataError(_))
        ));
    }

    #[test]
    fn test_missing_target_value() {
        let df = df!("id" => &[1i64, 2], "HeartDisease" => &[Some(0i64), None]).unwrap();
        assert!(extract_labels(&df, "HeartDisease").is_err());
    }

    #[test]
    fn test_missing_target_column() {
        let df = df!("id" => &[1i64, 2]).unwrap();
        assert!(matches!(
            extract_labels(&df, "HeartDisease"),
            Err(HeartError::FeatureNotFound(_))
        ));
    }
}

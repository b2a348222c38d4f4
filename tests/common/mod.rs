//! Shared fixtures for integration tests

#![allow(dead_code)]

use polars::prelude::*;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::path::Path;

use heart_failure_prediction::config::TrainConfig;

/// Synthetic records shaped like the heart failure dataset.
///
/// The label follows a noisy linear rule so a logistic regression can learn
/// it. About one row in ten has a zero cholesterol reading.
pub fn heart_frame(n_rows: usize, seed: u64) -> DataFrame {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut age = Vec::with_capacity(n_rows);
    let mut sex = Vec::with_capacity(n_rows);
    let mut chest_pain = Vec::with_capacity(n_rows);
    let mut resting_bp = Vec::with_capacity(n_rows);
    let mut cholesterol = Vec::with_capacity(n_rows);
    let mut fasting_bs = Vec::with_capacity(n_rows);
    let mut resting_ecg = Vec::with_capacity(n_rows);
    let mut max_hr = Vec::with_capacity(n_rows);
    let mut exercise_angina = Vec::with_capacity(n_rows);
    let mut oldpeak = Vec::with_capacity(n_rows);
    let mut st_slope = Vec::with_capacity(n_rows);
    let mut label = Vec::with_capacity(n_rows);

    for _ in 0..n_rows {
        let a: i64 = rng.gen_range(30..78);
        let male = rng.gen_bool(0.7);
        let cp = ["ASY", "NAP", "ATA", "TA"][rng.gen_range(0..4)];
        let bp: i64 = rng.gen_range(100..180);
        let chol: i64 = if rng.gen_bool(0.1) { 0 } else { rng.gen_range(150..350) };
        let fbs: i64 = rng.gen_bool(0.2) as i64;
        let ecg = ["Normal", "ST", "LVH"][rng.gen_range(0..3)];
        let hr: i64 = rng.gen_range(80..200);
        let angina = rng.gen_bool(0.4);
        let peak: f64 = (rng.gen_range(0.0..4.0f64) * 10.0).round() / 10.0;
        let slope = ["Up", "Flat", "Down"][rng.gen_range(0..3)];

        let score = 0.05 * (a - 54) as f64
            + if male { 0.8 } else { -0.8 }
            + if cp == "ASY" { 1.2 } else { -0.6 }
            + if angina { 1.0 } else { -0.5 }
            + 0.8 * (peak - 1.0)
            + if slope == "Flat" { 1.0 } else { -0.7 }
            - 0.02 * (hr - 140) as f64
            + rng.gen_range(-1.0..1.0);

        age.push(a);
        sex.push(if male { "M" } else { "F" });
        chest_pain.push(cp);
        resting_bp.push(bp);
        cholesterol.push(chol);
        fasting_bs.push(fbs);
        resting_ecg.push(ecg);
        max_hr.push(hr);
        exercise_angina.push(if angina { "Y" } else { "N" });
        oldpeak.push(peak);
        st_slope.push(slope);
        label.push((score > 0.0) as i64);
    }

    df!(
        "Age" => age,
        "Sex" => sex,
        "ChestPainType" => chest_pain,
        "RestingBP" => resting_bp,
        "Cholesterol" => cholesterol,
        "FastingBS" => fasting_bs,
        "RestingECG" => resting_ecg,
        "MaxHR" => max_hr,
        "ExerciseAngina" => exercise_angina,
        "Oldpeak" => oldpeak,
        "ST_Slope" => st_slope,
        "HeartDisease" => label
    )
    .unwrap()
}

/// Write `df` as a CSV file at `path`
pub fn write_frame(df: &mut DataFrame, path: &Path) {
    let mut file = std::fs::File::create(path).unwrap();
    CsvWriter::new(&mut file).include_header(true).finish(df).unwrap();
}

/// Configuration matching the shipped `conf/config.toml`
pub fn train_config(data_path: &Path, output_dir: &Path) -> TrainConfig {
    let toml = format!(
        r#"
[raw_data]
path = "{}"

[processing]
missing_vals_cols = ["Cholesterol", "RestingBP"]
num_features = ["Age", "RestingBP", "Cholesterol", "FastingBS", "MaxHR", "Oldpeak"]
cat_features = ["Sex", "ChestPainType", "RestingECG", "ExerciseAngina", "ST_Slope"]

[modeling]
target = "HeartDisease"
test_size = 0.2
random_state = 42

[output]
dir = "{}"
model_path = "{}"
"#,
        data_path.display(),
        output_dir.join("runs").display(),
        output_dir.join("models").join("model.json").display(),
    );
    TrainConfig::from_toml_str(&toml, &[]).unwrap()
}

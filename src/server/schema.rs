//! Request schema for a single patient record
//!
//! Records are validated field by field from a JSON object so that every
//! failing field is reported at once, in the `{"loc", "msg", "type"}` shape
//! browser clients already understand.

use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One validation failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn new(field: &str, msg: impl Into<String>, kind: &str) -> Self {
        Self {
            loc: vec!["body".to_string(), field.to_string()],
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }

    /// Failure concerning the body as a whole
    pub fn body(msg: impl Into<String>, kind: &str) -> Self {
        Self {
            loc: vec!["body".to_string()],
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }

    fn missing(field: &str) -> Self {
        Self::new(field, "Field required", "missing")
    }
}

macro_rules! categorical_field {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const VARIANTS: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }

            fn expected() -> String {
                let quoted: Vec<String> = Self::VARIANTS
                    .iter()
                    .map(|v| format!("'{}'", v.as_str()))
                    .collect();
                match quoted.split_last() {
                    Some((last, rest)) if !rest.is_empty() => {
                        format!("{} or {}", rest.join(", "), last)
                    }
                    _ => quoted.join(""),
                }
            }
        }
    };
}

categorical_field!(
    /// Sex of the patient
    Sex { Male => "M", Female => "F" }
);

categorical_field!(
    /// Chest pain type
    ChestPainType {
        TypicalAngina => "TA",
        AtypicalAngina => "ATA",
        NonAnginalPain => "NAP",
        Asymptomatic => "ASY",
    }
);

categorical_field!(
    /// Resting electrocardiogram result
    RestingEcg { Normal => "Normal", StTAbnormality => "ST", LeftVentricularHypertrophy => "LVH" }
);

categorical_field!(
    /// Exercise-induced angina
    ExerciseAngina { Yes => "Y", No => "N" }
);

categorical_field!(
    /// Slope of the peak exercise ST segment
    StSlope { Up => "Up", Flat => "Flat", Down => "Down" }
);

/// A validated prediction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartDiseaseRecord {
    /// Age of the patient in years, > 0
    #[serde(rename = "Age")]
    pub age: i64,
    #[serde(rename = "Sex")]
    pub sex: Sex,
    #[serde(rename = "ChestPainType")]
    pub chest_pain_type: ChestPainType,
    /// Resting blood pressure in mm Hg, > 0
    #[serde(rename = "RestingBP")]
    pub resting_bp: i64,
    /// Serum cholesterol in mm/dl, >= 0 when present
    #[serde(rename = "Cholesterol", default)]
    pub cholesterol: Option<i64>,
    /// 1 if fasting blood sugar > 120 mg/dl
    #[serde(rename = "FastingBS")]
    pub fasting_bs: u8,
    #[serde(rename = "RestingECG")]
    pub resting_ecg: RestingEcg,
    /// Maximum heart rate achieved, 60..=202
    #[serde(rename = "MaxHR")]
    pub max_hr: i64,
    #[serde(rename = "ExerciseAngina")]
    pub exercise_angina: ExerciseAngina,
    /// ST depression induced by exercise
    #[serde(rename = "Oldpeak")]
    pub oldpeak: f64,
    #[serde(rename = "ST_Slope")]
    pub st_slope: StSlope,
}

/// Bounds on an integer field
enum Bound {
    Gt(i64),
    Ge(i64),
    Le(i64),
}

struct Validator<'a> {
    body: &'a Map<String, Value>,
    errors: Vec<FieldError>,
}

impl<'a> Validator<'a> {
    fn lookup(&self, field: &str) -> Option<&'a Value> {
        self.body.get(field)
    }

    fn integer(&mut self, field: &str, value: &Value, bounds: &[Bound]) -> Option<i64> {
        let parsed = match value {
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Some(i),
                (None, Some(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(f as i64),
                (None, Some(f)) if f.fract() != 0.0 => {
                    self.errors.push(FieldError::new(
                        field,
                        "Input should be a valid integer, got a number with a fractional part",
                        "int_from_float",
                    ));
                    return None;
                }
                _ => None,
            },
            Value::String(text) => {
                let text = text.trim();
                match text.parse::<i64>() {
                    Ok(i) => Some(i),
                    Err(_) => match text.parse::<f64>() {
                        Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                            Some(f as i64)
                        }
                        _ => {
                            self.errors.push(FieldError::new(
                                field,
                                "Input should be a valid integer, unable to parse string as an integer",
                                "int_parsing",
                            ));
                            return None;
                        }
                    },
                }
            }
            _ => None,
        };

        let Some(v) = parsed else {
            self.errors.push(FieldError::new(
                field,
                "Input should be a valid integer",
                "int_type",
            ));
            return None;
        };

        for bound in bounds {
            let failure = match *bound {
                Bound::Gt(limit) if v <= limit => Some((
                    format!("Input should be greater than {}", limit),
                    "greater_than",
                )),
                Bound::Ge(limit) if v < limit => Some((
                    format!("Input should be greater than or equal to {}", limit),
                    "greater_than_equal",
                )),
                Bound::Le(limit) if v > limit => Some((
                    format!("Input should be less than or equal to {}", limit),
                    "less_than_equal",
                )),
                _ => None,
            };
            if let Some((msg, kind)) = failure {
                self.errors.push(FieldError::new(field, msg, kind));
                return None;
            }
        }
        Some(v)
    }

    fn required_integer(&mut self, field: &str, bounds: &[Bound]) -> Option<i64> {
        match self.lookup(field) {
            Some(value) => self.integer(field, value, bounds),
            None => {
                self.errors.push(FieldError::missing(field));
                None
            }
        }
    }

    /// `Some(None)` for an absent or null value
    fn optional_integer(&mut self, field: &str, bounds: &[Bound]) -> Option<Option<i64>> {
        match self.lookup(field) {
            None | Some(Value::Null) => Some(None),
            Some(value) => self.integer(field, value, bounds).map(Some),
        }
    }

    fn number(&mut self, field: &str) -> Option<f64> {
        match self.lookup(field) {
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) if v.is_finite() => Some(v),
                _ => {
                    self.errors.push(FieldError::new(
                        field,
                        "Input should be a finite number",
                        "finite_number",
                    ));
                    None
                }
            },
            Some(Value::String(text)) => match text.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => Some(v),
                _ => {
                    self.errors.push(FieldError::new(
                        field,
                        "Input should be a valid number, unable to parse string as a number",
                        "float_parsing",
                    ));
                    None
                }
            },
            Some(_) => {
                self.errors.push(FieldError::new(
                    field,
                    "Input should be a valid number",
                    "float_type",
                ));
                None
            }
            None => {
                self.errors.push(FieldError::missing(field));
                None
            }
        }
    }

    fn categorical<T>(
        &mut self,
        field: &str,
        parse: fn(&str) -> Option<T>,
        expected: fn() -> String,
    ) -> Option<T> {
        match self.lookup(field) {
            Some(Value::String(s)) => {
                let parsed = parse(s);
                if parsed.is_none() {
                    self.errors.push(FieldError::new(
                        field,
                        format!("Input should be {}", expected()),
                        "enum",
                    ));
                }
                parsed
            }
            Some(_) => {
                self.errors.push(FieldError::new(
                    field,
                    format!("Input should be {}", expected()),
                    "enum",
                ));
                None
            }
            None => {
                self.errors.push(FieldError::missing(field));
                None
            }
        }
    }

    fn flag(&mut self, field: &str) -> Option<u8> {
        let value = match self.lookup(field) {
            Some(value) => value,
            None => {
                self.errors.push(FieldError::missing(field));
                return None;
            }
        };
        match value.as_i64() {
            Some(0) => Some(0),
            Some(1) => Some(1),
            _ => {
                self.errors.push(FieldError::new(
                    field,
                    "Input should be 0 or 1",
                    "literal_error",
                ));
                None
            }
        }
    }
}

impl HeartDiseaseRecord {
    /// Validate a JSON body, collecting every field error.
    ///
    /// Unknown fields are ignored. Numeric strings such as `"45"` are read as
    /// numbers before the bounds are checked.
    pub fn from_json(value: &Value) -> std::result::Result<Self, Vec<FieldError>> {
        let body = value.as_object().ok_or_else(|| {
            vec![FieldError::body(
                "Input should be a valid dictionary or object to extract fields from",
                "model_attributes_type",
            )]
        })?;

        let mut v = Validator {
            body,
            errors: Vec::new(),
        };

        let age = v.required_integer("Age", &[Bound::Gt(0)]);
        let sex = v.categorical("Sex", Sex::parse, Sex::expected);
        let chest_pain_type = v.categorical(
            "ChestPainType",
            ChestPainType::parse,
            ChestPainType::expected,
        );
        let resting_bp = v.required_integer("RestingBP", &[Bound::Gt(0)]);
        let cholesterol = v.optional_integer("Cholesterol", &[Bound::Ge(0)]);
        let fasting_bs = v.flag("FastingBS");
        let resting_ecg = v.categorical("RestingECG", RestingEcg::parse, RestingEcg::expected);
        let max_hr = v.required_integer("MaxHR", &[Bound::Ge(60), Bound::Le(202)]);
        let exercise_angina = v.categorical(
            "ExerciseAngina",
            ExerciseAngina::parse,
            ExerciseAngina::expected,
        );
        let oldpeak = v.number("Oldpeak");
        let st_slope = v.categorical("ST_Slope", StSlope::parse, StSlope::expected);

        match (
            age,
            sex,
            chest_pain_type,
            resting_bp,
            cholesterol,
            fasting_bs,
            resting_ecg,
            max_hr,
            exercise_angina,
            oldpeak,
            st_slope,
        ) {
            (
                Some(age),
                Some(sex),
                Some(chest_pain_type),
                Some(resting_bp),
                Some(cholesterol),
                Some(fasting_bs),
                Some(resting_ecg),
                Some(max_hr),
                Some(exercise_angina),
                Some(oldpeak),
                Some(st_slope),
            ) if v.errors.is_empty() => Ok(Self {
                age,
                sex,
                chest_pain_type,
                resting_bp,
                cholesterol,
                fasting_bs,
                resting_ecg,
                max_hr,
                exercise_angina,
                oldpeak,
                st_slope,
            }),
            _ => Err(v.errors),
        }
    }

    /// Build a frame with the training column names and dtypes
    pub fn to_dataframe(records: &[HeartDiseaseRecord]) -> Result<DataFrame> {
        let df = df!(
            "Age" => records.iter().map(|r| r.age).collect::<Vec<_>>(),
            "Sex" => records.iter().map(|r| r.sex.as_str()).collect::<Vec<_>>(),
            "ChestPainType" => records.iter().map(|r| r.chest_pain_type.as_str()).collect::<Vec<_>>(),
            "RestingBP" => records.iter().map(|r| r.resting_bp).collect::<Vec<_>>(),
            "Cholesterol" => records.iter().map(|r| r.cholesterol).collect::<Vec<_>>(),
            "FastingBS" => records.iter().map(|r| i64::from(r.fasting_bs)).collect::<Vec<_>>(),
            "RestingECG" => records.iter().map(|r| r.resting_ecg.as_str()).collect::<Vec<_>>(),
            "MaxHR" => records.iter().map(|r| r.max_hr).collect::<Vec<_>>(),
            "ExerciseAngina" => records.iter().map(|r| r.exercise_angina.as_str()).collect::<Vec<_>>(),
            "Oldpeak" => records.iter().map(|r| r.oldpeak).collect::<Vec<_>>(),
            "ST_Slope" => records.iter().map(|r| r.st_slope.as_str()).collect::<Vec<_>>()
        )?;
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "Age": 45,
            "Sex": "M",
            "ChestPainType": "ATA",
            "RestingBP": 130,
            "Cholesterol": 230,
            "FastingBS": 0,
            "RestingECG": "Normal",
            "MaxHR": 140,
            "ExerciseAngina": "N",
            "Oldpeak": 1.5,
            "ST_Slope": "Flat"
        })
    }

    fn error_fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.loc[1].as_str()).collect()
    }

    #[test]
    fn test_valid_record() {
        let record = HeartDiseaseRecord::from_json(&valid()).unwrap();
        assert_eq!(record.age, 45);
        assert_eq!(record.chest_pain_type, ChestPainType::AtypicalAngina);
        assert_eq!(record.cholesterol, Some(230));
        assert_eq!(record.st_slope, StSlope::Flat);
    }

    #[test]
    fn test_negative_age_and_missing_field() {
        let mut body = valid();
        body["Age"] = json!(-45);
        body.as_object_mut().unwrap().remove("RestingECG");

        let errors = HeartDiseaseRecord::from_json(&body).unwrap_err();
        assert_eq!(error_fields(&errors), vec!["Age", "RestingECG"]);
        assert_eq!(errors[0].kind, "greater_than");
        assert_eq!(errors[1].kind, "missing");
        assert_eq!(errors[1].msg, "Field required");
    }

    #[test]
    fn test_cholesterol_optional() {
        let mut body = valid();
        body.as_object_mut().unwrap().remove("Cholesterol");
        assert_eq!(HeartDiseaseRecord::from_json(&body).unwrap().cholesterol, None);

        body["Cholesterol"] = Value::Null;
        assert_eq!(HeartDiseaseRecord::from_json(&body).unwrap().cholesterol, None);

        body["Cholesterol"] = json!(-1);
        let errors = HeartDiseaseRecord::from_json(&body).unwrap_err();
        assert_eq!(errors[0].kind, "greater_than_equal");
    }

    #[test]
    fn test_extra_fields_ignored_and_slope_name_exact() {
        let mut body = valid();
        body.as_object_mut()
            .unwrap()
            .insert("PatientName".to_string(), json!("ignored"));
        assert_eq!(HeartDiseaseRecord::from_json(&body).unwrap().st_slope, StSlope::Flat);

        let object = body.as_object_mut().unwrap();
        object.remove("ST_Slope");
        object.insert("st_slope".to_string(), json!("Up"));
        let errors = HeartDiseaseRecord::from_json(&body).unwrap_err();
        assert_eq!(error_fields(&errors), vec!["ST_Slope"]);
        assert_eq!(errors[0].kind, "missing");
    }

    #[test]
    fn test_bounds_and_enums() {
        let mut body = valid();
        body["MaxHR"] = json!(203);
        body["FastingBS"] = json!(2);
        body["Sex"] = json!("X");
        body["ChestPainType"] = json!(3);
        body["Oldpeak"] = json!("high");
        body["RestingBP"] = json!(120.5);

        let errors = HeartDiseaseRecord::from_json(&body).unwrap_err();
        assert_eq!(
            error_fields(&errors),
            vec!["Sex", "ChestPainType", "RestingBP", "FastingBS", "MaxHR", "Oldpeak"]
        );
        assert_eq!(errors[0].msg, "Input should be 'M' or 'F'");
        assert_eq!(errors[1].msg, "Input should be 'TA', 'ATA', 'NAP' or 'ASY'");
        assert_eq!(errors[2].kind, "int_from_float");
        assert_eq!(errors[3].kind, "literal_error");
        assert_eq!(errors[4].kind, "less_than_equal");
        assert_eq!(errors[5].kind, "float_parsing");
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let mut body = valid();
        body["Age"] = json!("45");
        body["Cholesterol"] = json!(" 230 ");
        body["MaxHR"] = json!("150.0");
        body["Oldpeak"] = json!("1.5");

        let record = HeartDiseaseRecord::from_json(&body).unwrap();
        assert_eq!(record.age, 45);
        assert_eq!(record.cholesterol, Some(230));
        assert_eq!(record.max_hr, 150);
        assert_eq!(record.oldpeak, 1.5);
    }

    #[test]
    fn test_numeric_strings_checked_against_bounds() {
        let mut body = valid();
        body["Age"] = json!("0");
        body["RestingBP"] = json!("abc");
        body["MaxHR"] = json!("203");
        body["Oldpeak"] = json!("NaN");

        let errors = HeartDiseaseRecord::from_json(&body).unwrap_err();
        assert_eq!(error_fields(&errors), vec!["Age", "RestingBP", "MaxHR", "Oldpeak"]);
        assert_eq!(errors[0].kind, "greater_than");
        assert_eq!(errors[1].kind, "int_parsing");
        assert_eq!(errors[2].kind, "less_than_equal");
        assert_eq!(errors[3].kind, "float_parsing");
    }

    #[test]
    fn test_bound_edges() {
        let cases: &[(&str, Value, Option<&str>)] = &[
            ("Age", json!(1), None),
            ("Age", json!(0), Some("greater_than")),
            ("RestingBP", json!(1), None),
            ("RestingBP", json!(0), Some("greater_than")),
            ("Cholesterol", json!(0), None),
            ("Cholesterol", json!(-1), Some("greater_than_equal")),
            ("MaxHR", json!(60), None),
            ("MaxHR", json!(202), None),
            ("MaxHR", json!(59), Some("greater_than_equal")),
            ("MaxHR", json!(203), Some("less_than_equal")),
            ("FastingBS", json!(1), None),
            ("FastingBS", json!(-1), Some("literal_error")),
        ];

        for (field, value, expected) in cases {
            let mut body = valid();
            body[*field] = value.clone();
            match (HeartDiseaseRecord::from_json(&body), expected) {
                (Ok(_), None) => {}
                (Err(errors), Some(kind)) => {
                    assert_eq!(error_fields(&errors), vec![*field], "{} = {}", field, value);
                    assert_eq!(errors[0].kind, *kind, "{} = {}", field, value);
                }
                (result, _) => panic!("{} = {}: unexpected {:?}", field, value, result),
            }
        }
    }

    #[test]
    fn test_integral_float_accepted() {
        let mut body = valid();
        body["Age"] = json!(45.0);
        assert_eq!(HeartDiseaseRecord::from_json(&body).unwrap().age, 45);
    }

    #[test]
    fn test_non_object_body() {
        let errors = HeartDiseaseRecord::from_json(&json!([1, 2])).unwrap_err();
        assert_eq!(errors[0].loc, vec!["body"]);
    }

    #[test]
    fn test_to_dataframe() {
        let mut body = valid();
        body["Cholesterol"] = Value::Null;
        let record = HeartDiseaseRecord::from_json(&body).unwrap();

        let df = HeartDiseaseRecord::to_dataframe(&[record]).unwrap();
        assert_eq!(df.shape(), (1, 11));
        assert_eq!(df.column("Cholesterol").unwrap().null_count(), 1);
        assert_eq!(df.column("ST_Slope").unwrap().str().unwrap().get(0), Some("Flat"));
        assert_eq!(df.column("FastingBS").unwrap().i64().unwrap().get(0), Some(0));
    }

    #[test]
    fn test_serialized_field_names() {
        let record = HeartDiseaseRecord::from_json(&valid()).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["ST_Slope"], json!("Flat"));
        assert_eq!(value["RestingECG"], json!("Normal"));
    }
}

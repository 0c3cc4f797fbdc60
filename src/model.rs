use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Rendered in place of any form field the clinic left blank.
pub const PLACEHOLDER: &str = "—";

/// A free-form scalar from the intake form. The web client sends numbers for
/// some fields (age, wheal diameter) and strings for the rest; empty strings
/// mean "not filled in" and render as the placeholder dash.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormField(Option<String>);

impl FormField {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            FormField(None)
        } else {
            FormField(Some(value))
        }
    }

    pub const fn empty() -> Self {
        FormField(None)
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// The field value, or the placeholder dash when blank.
    pub fn or_dash(&self) -> &str {
        self.0.as_deref().unwrap_or(PLACEHOLDER)
    }
}

impl From<&str> for FormField {
    fn from(value: &str) -> Self {
        FormField::new(value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Str(String),
    Int(i64),
    Float(f64),
}

impl<'de> Deserialize<'de> for FormField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let field = match Option::<RawScalar>::deserialize(deserializer)? {
            Some(RawScalar::Str(s)) => FormField::new(s),
            Some(RawScalar::Int(n)) => FormField(Some(n.to_string())),
            Some(RawScalar::Float(n)) => FormField(Some(n.to_string())),
            None => FormField(None),
        };
        Ok(field)
    }
}

impl Serialize for FormField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// One row of the results table, in input order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TestRow {
    /// Full-width section divider (e.g. "Food Panel"). Carries no measurement
    /// and no positive/negative remark.
    Heading { label: String },
    /// One antigen measurement.
    #[serde(rename_all = "camelCase")]
    Data {
        #[serde(default)]
        row_label: FormField,
        #[serde(default)]
        antigen: FormField,
        #[serde(default)]
        wheal_diameter: FormField,
        is_positive: bool,
    },
}

/// Remarks column text derived from the measurement flag. There is no
/// tri-state; absent flags are a validation concern upstream.
pub(crate) fn remark_text(is_positive: bool) -> &'static str {
    if is_positive { "Positive" } else { "Negative" }
}

/// Everything the layout engine needs for one report. Field names follow the
/// intake client's JSON (camelCase on the wire).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportRequest {
    pub patient_name: FormField,
    pub patient_id: FormField,
    pub age: FormField,
    pub sex: FormField,
    pub test_name: FormField,
    pub doctor_name: FormField,
    pub mobile: FormField,
    pub time_in: FormField,
    pub time_out: FormField,
    pub diagnosis: FormField,
    pub test_items: Vec<TestRow>,
    /// Timestamp the report was requested at, as sent by the intake client
    /// (RFC 3339 or datetime-local). Rendered in the header, never read from
    /// the wall clock.
    pub generated_at: String,
}

impl ReportRequest {
    pub fn from_json(json: &str) -> Result<Self, crate::Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// `<patient name>_allergy_test.pdf`, falling back to a generic name.
    pub fn output_file_name(&self) -> String {
        let stem = self.patient_name.as_deref().unwrap_or("report");
        format!("{stem}_allergy_test.pdf")
    }

    /// The two patient-info columns, always five lines each so the grid's
    /// vertical extent is independent of which fields were filled in.
    pub(crate) fn info_columns(&self) -> ([String; 5], [String; 5]) {
        let age = match self.age.as_deref() {
            Some(age) => format!("Age: {age} years"),
            None => format!("Age: {PLACEHOLDER}"),
        };
        let left = [
            format!("Patient Name: {}", self.patient_name.or_dash()),
            format!("Patient ID: {}", self.patient_id.or_dash()),
            age,
            format!("Sex: {}", self.sex.or_dash()),
            format!("Test Name: {}", self.test_name.or_dash()),
        ];
        let right = [
            format!("Doctor: {}", self.doctor_name.or_dash()),
            format!("Mobile: {}", self.mobile.or_dash()),
            format!("Time In: {}", self.time_in.or_dash()),
            format!("Time Out: {}", self.time_out.or_dash()),
            format!("Diagnosis: {}", self.diagnosis.or_dash()),
        ];
        (left, right)
    }
}

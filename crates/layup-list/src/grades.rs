//! Letter-grade medians mapped onto a numeric scale for averaging and sorting.

/// Scale used for every median. Registrar data marks failing grades as `E`.
const GRADE_POINTS: [(&str, f64); 13] = [
    ("A", 12.0),
    ("A-", 11.0),
    ("B+", 10.0),
    ("B", 9.0),
    ("B-", 8.0),
    ("C+", 7.0),
    ("C", 6.0),
    ("C-", 5.0),
    ("D+", 4.0),
    ("D", 3.0),
    ("D-", 2.0),
    ("E", 1.0),
    ("F", 1.0),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized grade '{0}'")]
pub struct GradeError(pub String);

/// Numeric value of a median such as `A-` or a split median such as `A/A-`
/// (the mean of both halves).
pub fn numeric_value_for_grade(raw: &str) -> Result<f64, GradeError> {
    let normalized = raw.trim().to_ascii_uppercase();
    let unrecognized = || GradeError(raw.to_string());

    let mut total = 0.0;
    let mut parts = 0u32;
    for part in normalized.split('/') {
        total += single_grade(part.trim()).ok_or_else(unrecognized)?;
        parts += 1;
    }

    if parts > 2 {
        return Err(unrecognized());
    }

    Ok(total / f64::from(parts))
}

fn single_grade(letter: &str) -> Option<f64> {
    GRADE_POINTS
        .iter()
        .find(|(grade, _)| *grade == letter)
        .map(|(_, points)| *points)
}

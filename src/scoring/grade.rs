/// Letter-grade cutoffs on the 0-100 ceiling score, highest first.
///
/// Evaluated top to bottom with an inclusive lower bound: the first cutoff
/// the score reaches wins. Anything below the last cutoff is an F.
pub static GRADE_THRESHOLDS: &[(f64, &str)] = &[
    (90.0, "A"),
    (80.0, "B"),
    (70.0, "C"),
    (60.0, "D"),
];

/// Converts a 0-100 ceiling score into a letter grade.
///
/// | Range   | Grade |
/// |---------|-------|
/// | >= 90   | A     |
/// | >= 80   | B     |
/// | >= 70   | C     |
/// | >= 60   | D     |
/// | < 60    | F     |
pub fn letter_grade(ceiling_score: f64) -> String {
    for (bound, letter) in GRADE_THRESHOLDS {
        if ceiling_score >= *bound {
            return (*letter).into();
        }
    }
    "F".into()
}

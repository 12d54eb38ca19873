//! Score derivation and letter grading.
//!
//! This module turns raw points into normalized ratios, picks the more
//! favorable of the total/average aggregation policies for homework and
//! quizzes, composes the weighted final score, and assigns letter grades.

pub mod calculate;
pub mod grade;
pub mod types;
pub mod utility;

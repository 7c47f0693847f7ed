pub mod evaluation;
pub mod training;

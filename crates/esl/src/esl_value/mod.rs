mod esl_function;
mod esl_table;
mod esl_value;

pub use esl_function::EslFunction;
pub use esl_table::{EslTable, EslTableKey};
pub use esl_value::{EslValue, TableRef};

pub mod code;
pub mod row;

pub use code::{extract_group, is_group_code, is_manufactured, CodeFormat, NULO};
pub use row::{PartRow, Process, RowStatus};

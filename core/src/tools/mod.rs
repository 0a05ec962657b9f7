pub mod current_age;

pub use current_age::{CURRENT_AGE_TOOL, CurrentAgeTool};

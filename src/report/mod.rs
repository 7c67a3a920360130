pub mod console;
pub mod json;
pub mod junit;
pub mod report_model;
pub mod text;

pub mod capture;
pub mod diff;
pub mod probe;
pub mod signature_model;

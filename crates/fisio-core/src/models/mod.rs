pub mod appointment;
pub mod assessment;
pub mod evolution;
pub mod patient;
pub mod user;

pub mod email;
pub mod followup;
pub mod kpi;
pub mod warranty;

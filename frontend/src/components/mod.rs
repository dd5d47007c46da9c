pub mod customer_table;
pub mod dashboard;
pub mod date_range_picker;
pub mod email_modal;
pub mod kpi_cards;
pub mod login;
pub mod status_update;

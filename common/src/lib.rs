//! Domain model and client-side logic shared by the warranty dashboard.
//!
//! Everything here is plain Rust with no browser or server dependencies so the
//! frontend (Yew) and the backend (Actix) can both link it, and so it can be
//! tested natively:
//!
//! - `model` / `requests`: canonical records and wire payloads.
//! - `normalize`: the single parsing boundary for untyped backend rows.
//! - `dates`, `table`, `kpi`: date presets, the filter/sort/paginate pipeline
//!   and the dashboard metrics computed over it.
//! - `workflow`: the three-stage follow-up state machine and its history log.
//! - `gateway`: transport-agnostic client for the spreadsheet action protocol.
//! - `email`, `auth`, `columns`, `config`, `storage`: the remaining services.

pub mod auth;
pub mod columns;
pub mod config;
pub mod dates;
pub mod email;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod kpi;
pub mod model;
pub mod normalize;
pub mod requests;
pub mod storage;
pub mod table;
pub mod workflow;

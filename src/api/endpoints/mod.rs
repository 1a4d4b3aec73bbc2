//! Endpoint handlers.
//!
//! JSON handlers live under `/api`; `pages` serves the HTML form and
//! print views.

pub mod catalog;
pub mod form;
pub mod health;
pub mod pages;
pub mod patient_id;
pub mod reports;

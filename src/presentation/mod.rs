//! Server-rendered page views.

pub mod views;

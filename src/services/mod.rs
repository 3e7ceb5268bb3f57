// src/services/mod.rs

pub mod certificate;
pub mod submission;

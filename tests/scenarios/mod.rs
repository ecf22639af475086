//! Scenario-based tests for desk-installer

mod admin_setup;

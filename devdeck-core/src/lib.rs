pub mod catalog;
pub mod config;

// Widget-free view state
pub mod logbuf;
pub mod view;

// Dashboard state machine
pub mod dashboard;

// Action execution boundary
pub mod runner;

//! Integration tests for poly-collector

mod collector_test;
mod config_test;

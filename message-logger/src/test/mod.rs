//! Unit test module
//!
//! MessageLogger and config tests live here, separate from source files.

mod message_logger_test;

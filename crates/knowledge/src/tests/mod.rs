//! Pipeline scenario tests.

mod support;

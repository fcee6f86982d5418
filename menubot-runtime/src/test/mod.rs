//! Unit tests for the runtime middleware, kept apart from the source files.

mod middleware_test;

//! Library-level tests that drive the public API the way a caller would.

mod pipeline_tests;

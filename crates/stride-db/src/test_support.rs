//! Shared test utilities for stride-db unit tests.

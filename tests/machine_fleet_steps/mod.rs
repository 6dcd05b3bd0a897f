//! Step definitions for machine fleet scenarios.

//! HTML rendering for the composition front-end.
//!
//! All rendering uses [maud](https://maud.lambda.xyz/) for compile-time HTML
//! generation; every dynamic value is escaped on interpolation.

pub mod components;
pub mod compose;

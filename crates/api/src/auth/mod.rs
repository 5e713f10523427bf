//! Authentication primitives for the admin API.
//!
//! - [`jwt`] -- JWT access-token generation and validation.
//!
//! Learners never hold a JWT; they present their onboarding session token in
//! the URL path instead.

pub mod jwt;

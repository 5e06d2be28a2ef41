//! ⚠️ Low-level "hazmat" RSA functions.
//!
//! # ☢️️ WARNING: HAZARDOUS API ☢️
//!
//! This module holds functions that apply the raw RSA public and private
//! operations to a [`BigNum`](crate::BigNum) without adding or removing the
//! signature payload padding. Signatures should be made and opened with
//! [`encode_with_clock`](crate::encode_with_clock) and
//! [`decode`](crate::decode); these are for building and checking the
//! formats themselves.

pub use crate::algorithms::rsa::{rsa_private, rsa_public};

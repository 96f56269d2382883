//! Credential types shared between the auth service and the services that
//! consume its tokens.
//!
//! The auth service is the only writer: it mints and refreshes credentials.
//! Everything else (gateway, account service) only ever validates them, so
//! the signing side of this crate is locked behind the
//! `USE_ONLY_IN_AUTH_SERVICE` feature.

pub mod identity;
pub mod token;

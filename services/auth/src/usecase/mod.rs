pub mod otp;
pub mod revocation;
pub mod session;
pub mod token;

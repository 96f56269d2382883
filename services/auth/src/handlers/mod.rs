pub mod health;
pub mod otp;
pub mod revocation;
pub mod sessions;
pub mod token;

//! Marketplace workflow cores: buyer trust scoring and supplier KYB verification.

pub mod kyb;
pub mod trust;

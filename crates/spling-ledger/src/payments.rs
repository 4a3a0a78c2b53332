//! Payment extension point.
//!
//! Profiles carry a payout identity for tips, but no tokens move through
//! the ledger. A rail can be installed to approve profile creation; the
//! only shipped rail approves everything.

use async_trait::async_trait;
use spling_core::{Address, Identity};
use thiserror::Error;

/// Interface version the ledger speaks.
pub const PAYMENT_INTERFACE_VERSION: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("payment rail rejected the operation: {0}")]
    Rejected(String),
}

/// Hooks a payment integration can implement.
#[async_trait]
pub trait PaymentRail: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Must equal [`PAYMENT_INTERFACE_VERSION`] to be installed.
    fn interface_version(&self) -> u32;

    /// Called before a profile is committed, once its preconditions pass and
    /// its address is known to be free. Other writers are held off until the
    /// profile commits, so an approved profile is only lost to a storage
    /// failure. An error aborts the profile creation.
    async fn before_profile_created(
        &self,
        profile: &Address,
        payout: &Identity,
    ) -> Result<(), PaymentError>;
}

/// The default rail: accepts everything, moves nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledPayments;

#[async_trait]
impl PaymentRail for DisabledPayments {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn interface_version(&self) -> u32 {
        PAYMENT_INTERFACE_VERSION
    }

    async fn before_profile_created(
        &self,
        _profile: &Address,
        _payout: &Identity,
    ) -> Result<(), PaymentError> {
        Ok(())
    }
}

//! Fee estimation, margins, and the fallback ceiling
//!
//! Every mutating call is priced the same way: estimate the resource
//! cost (falling back to a conservative configured ceiling when the
//! estimation transport fails — estimation failure is not proof the call
//! would fail), apply the resource margin, and price against a fresh fee
//! quote with the rate margin applied. Fee quotes are never reused
//! across mutating calls; the market may have moved.

use crate::classify::{self, ledger_to_vault};
use tracing::{debug, warn};
use vault_core::config::FeeConfig;
use vault_core::error::{Result, VaultError};
use vault_core::types::Address;
use vault_ledger::{Call, LedgerClient, LedgerError};

/// A priced submission: resource ceiling and rate, margins applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeePlan {
    /// Resource ceiling for the call
    pub fee_limit: u64,
    /// Price per resource unit
    pub fee_rate: u64,
}

/// Price a call for submission.
///
/// A revert surfaced during estimation is a real rejection (the ledger
/// simulated the call and refused it) and is classified and returned as
/// such; only transport-level estimation failures engage the fallback
/// ceiling.
pub async fn plan_submission<C>(
    client: &C,
    config: &FeeConfig,
    call: &Call,
    from: Address,
) -> Result<FeePlan>
where
    C: LedgerClient + ?Sized,
{
    let estimate = match client.estimate_cost(call, from).await {
        Ok(estimate) => estimate,
        Err(LedgerError::Reverted { reason }) => {
            return Err(VaultError::rejected(
                classify::classify_reason(&reason),
                reason,
            ));
        }
        Err(err) => {
            warn!(
                error = %err,
                fallback = config.fallback_resource_limit,
                "cost estimation failed, using fallback ceiling"
            );
            config.fallback_resource_limit
        }
    };

    // Fresh quote per mutating call; a cached rate could underprice
    // against a fee market that has moved.
    let rate = client.current_fee_rate().await.map_err(ledger_to_vault)?;

    let plan = FeePlan {
        fee_limit: config.margined_limit(estimate),
        fee_rate: config.margined_rate(rate),
    };
    debug!(
        estimate,
        fee_limit = plan.fee_limit,
        fee_rate = plan.fee_rate,
        "submission priced"
    );
    Ok(plan)
}

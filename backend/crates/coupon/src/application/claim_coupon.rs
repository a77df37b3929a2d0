//! Claim Coupon Use Case

use crate::application::client_token::{issue_client_token, verify_client_token};
use crate::application::config::CouponConfig;
use crate::domain::entities::Coupon;
use crate::domain::repository::CouponRepository;
use crate::domain::value_objects::{ClientToken, IdentitySignal, Reservation};
use crate::error::{CouponError, CouponResult};
use crate::infra::cooldown::CooldownTracker;
use platform::clock::Clock;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

/// Input DTO for claim coupon
#[derive(Debug, Clone)]
pub struct ClaimCouponInput {
    /// Originating client address, already resolved from proxy headers
    pub client_ip: IpAddr,
    /// Raw token cookie, if the client sent one
    pub client_token: Option<String>,
}

/// Output DTO for claim coupon
#[derive(Debug, Clone)]
pub struct ClaimCouponOutput {
    pub coupon: Coupon,
    /// Token to hand back to the client (reissued even when unchanged, so
    /// its cookie expiry follows the new cooldown)
    pub client_token: ClientToken,
    /// Whether `client_token` was minted by this claim
    pub token_issued: bool,
}

/// Claim Coupon Use Case
///
/// Gates on the network signal, then on the client token signal, reserves
/// the next coupon, and only then records the cooldown for both signals.
pub struct ClaimCouponUseCase<R>
where
    R: CouponRepository,
{
    coupon_repo: Arc<R>,
    cooldowns: Arc<CooldownTracker>,
    clock: Arc<dyn Clock>,
    config: Arc<CouponConfig>,
}

impl<R> ClaimCouponUseCase<R>
where
    R: CouponRepository,
{
    pub fn new(
        coupon_repo: Arc<R>,
        cooldowns: Arc<CooldownTracker>,
        clock: Arc<dyn Clock>,
        config: Arc<CouponConfig>,
    ) -> Self {
        Self {
            coupon_repo,
            cooldowns,
            clock,
            config,
        }
    }

    pub async fn execute(&self, input: ClaimCouponInput) -> CouponResult<ClaimCouponOutput> {
        let window = self.config.cooldown_window;

        let network = IdentitySignal::network(input.client_ip);
        let presented = input
            .client_token
            .as_deref()
            .and_then(|raw| verify_client_token(raw, &self.config.token_secret));

        if input.client_token.is_some() && presented.is_none() {
            tracing::debug!(signal = %network, "Ignoring unverifiable client token");
        }

        let token_signal = presented.as_ref().map(IdentitySignal::client_token);

        // Claims for one signal run one after another; permits are held to
        // the end so the check below and the record after the reservation
        // cannot interleave with another claim for the same signal. The
        // network gate is always taken before the token gate.
        let _network_permit = self.cooldowns.acquire(&network).await;
        let _token_permit = match &token_signal {
            Some(signal) => Some(self.cooldowns.acquire(signal).await),
            None => None,
        };

        let now_ms = self.clock.now_ms();
        if let Some(remaining) = self.cooldowns.status(&network, now_ms, window).remaining() {
            return Err(self.network_rejection(token_signal.as_ref(), remaining, now_ms));
        }
        if let Some(signal) = &token_signal {
            if let Some(remaining) = self.cooldowns.status(signal, now_ms, window).remaining() {
                return Err(CouponError::ClientCooldown { remaining });
            }
        }

        let claimant = input.client_ip.to_string();
        let reservation = tokio::time::timeout(
            self.config.store_timeout,
            self.coupon_repo.reserve_next(&claimant),
        )
        .await
        .map_err(|_| CouponError::StoreTimeout)??;

        let coupon = match reservation {
            Reservation::Claimed(coupon) => coupon,
            Reservation::Exhausted => return Err(CouponError::PoolExhausted),
        };

        let (client_token, token_issued) = match presented {
            Some(token) => (token, false),
            None => (issue_client_token(&self.config.token_secret), true),
        };

        let claimed_at_ms = self.clock.now_ms();
        self.cooldowns.record(&network, claimed_at_ms);
        self.cooldowns
            .record(&IdentitySignal::client_token(&client_token), claimed_at_ms);

        tracing::info!(
            coupon_id = %coupon.id,
            code = %coupon.code,
            signal = %network,
            token_issued,
            "Coupon claimed"
        );

        Ok(ClaimCouponOutput {
            coupon,
            client_token,
            token_issued,
        })
    }

    /// A blocked address whose token is cooling down too is reported as a
    /// repeat client: the token pins the same browser, the address may be
    /// shared.
    fn network_rejection(
        &self,
        token_signal: Option<&IdentitySignal>,
        network_remaining: Duration,
        now_ms: i64,
    ) -> CouponError {
        let token_status = token_signal
            .map(|signal| self.cooldowns.status(signal, now_ms, self.config.cooldown_window));

        match token_status.and_then(|status| status.remaining()) {
            Some(remaining) => CouponError::ClientCooldown { remaining },
            None => CouponError::NetworkCooldown {
                remaining: network_remaining,
            },
        }
    }
}

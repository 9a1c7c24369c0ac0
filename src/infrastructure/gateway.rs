use crate::domain::checkout::{CheckoutSession, GatewayError, GatewayReceipt};
use crate::domain::ports::PaymentGateway;
use crate::domain::transaction::generate_reference;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::debug;

/// Latency and failure policy of the [`SimulatedGateway`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatewayConfig {
    /// Probability in `[0, 1]` that a valid charge succeeds.
    pub success_rate: f64,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            success_rate: 0.8,
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(3),
        }
    }
}

impl GatewayConfig {
    /// Always succeeds, never sleeps.
    pub fn instant() -> Self {
        Self {
            success_rate: 1.0,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }
}

/// Stand-in for a remote `POST /checkout` endpoint.
///
/// Sleeps for a random delay, validates the amount and the wallet balance, then
/// succeeds with the configured probability. Failures are split evenly between
/// network and server errors.
#[derive(Debug, Clone, Default)]
pub struct SimulatedGateway {
    config: GatewayConfig,
}

impl SimulatedGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    fn delay(&self) -> Duration {
        let (min, max) = (self.config.min_delay, self.config.max_delay);
        if max <= min {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(&self, session: &CheckoutSession) -> Result<GatewayReceipt, GatewayError> {
        let delay = self.delay();
        debug!(?delay, total = %session.total_amount, "simulating gateway latency");
        tokio::time::sleep(delay).await;

        if session.total_amount <= rust_decimal::Decimal::ZERO {
            return Err(GatewayError::InvalidAmount);
        }
        if !session.wallet_balance_at_start.covers(session.total_amount) {
            return Err(GatewayError::InsufficientFunds);
        }

        let (succeeded, network_failure) = {
            let mut rng = rand::thread_rng();
            let rate = self.config.success_rate.clamp(0.0, 1.0);
            (rng.gen_bool(rate), rng.gen_bool(0.5))
        };
        if !succeeded {
            return Err(if network_failure {
                GatewayError::NetworkError
            } else {
                GatewayError::ServerError
            });
        }

        Ok(GatewayReceipt {
            success: true,
            transaction_id: generate_reference(),
            message: "Payment successful!".to_string(),
            remaining_balance: session.wallet_balance_at_start.value() - session.total_amount,
        })
    }
}

//! Reconnection with exponential backoff
//!
//! Used only when `[reconnect] enabled = true`. Every new session delivers
//! a fresh `Connected` event to the same speed control node.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectStrategy {
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
    /// 0 = infinite
    pub max_retries: usize,
}

impl Default for ReconnectStrategy {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
            max_retries: 0,
        }
    }
}

impl ReconnectStrategy {
    /// Delay before the given attempt; attempt 0 does not wait
    pub fn backoff_delay(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = (attempt - 1).min(i32::MAX as usize) as i32;
        let delay_ms = self.initial_backoff.as_millis() as f64 * self.multiplier.powi(exponent);
        let max_ms = self.max_backoff.as_millis() as f64;

        // min() also keeps an overflowing power finite
        Duration::from_millis(delay_ms.min(max_ms) as u64)
    }

    /// Check if we should retry after this many attempts
    pub fn should_retry(&self, attempt: usize) -> bool {
        self.max_retries == 0 || attempt < self.max_retries
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionHealth {
    Connected,
    Reconnecting { attempt: usize },
    Failed { attempts: usize },
}

/// Tracks attempts between sessions
#[derive(Debug)]
pub struct ReconnectContext {
    pub strategy: ReconnectStrategy,
    pub attempt: usize,
    pub health: ConnectionHealth,
}

impl ReconnectContext {
    pub fn new(strategy: ReconnectStrategy) -> Self {
        Self {
            strategy,
            attempt: 0,
            health: ConnectionHealth::Connected,
        }
    }

    pub fn begin_reconnect(&mut self) {
        self.attempt += 1;
        self.health = ConnectionHealth::Reconnecting {
            attempt: self.attempt,
        };
    }

    /// Resets the attempt counter
    pub fn mark_connected(&mut self) {
        self.attempt = 0;
        self.health = ConnectionHealth::Connected;
    }

    pub fn mark_failed(&mut self) {
        self.health = ConnectionHealth::Failed {
            attempts: self.attempt,
        };
    }

    pub fn backoff_delay(&self) -> Duration {
        self.strategy.backoff_delay(self.attempt)
    }

    pub fn should_retry(&self) -> bool {
        self.strategy.should_retry(self.attempt)
    }

    /// Sleep for the current backoff without blocking the runtime
    pub async fn wait_backoff(&self) {
        let delay = self.backoff_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

// Path: crates/forge/src/testing/poll.rs

use gateway_client::{FailureReason, GatewayClient, GatewayTransport};
use gateway_types::app::{AllowanceSnapshot, ApproveRequest, TokenSymbolSet};
use gateway_types::config::PollConfig;
use gateway_types::error::ScenarioError;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// How often and for how long a condition is re-checked.
///
/// At least one of `max_attempts` and `timeout` should be set; with neither,
/// polling only ends when the condition holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
    pub timeout: Option<Duration>,
}

impl PollPolicy {
    /// A fixed interval with an attempt cap.
    pub fn fixed(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: Some(max_attempts),
            timeout: None,
        }
    }

    fn exhausted(&self, attempts: u32, elapsed: Duration) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
            || self.timeout.is_some_and(|timeout| elapsed >= timeout)
    }

    /// The next pause: one interval, cut short so it never runs past `timeout`.
    fn pause(&self, elapsed: Duration) -> Duration {
        match self.timeout {
            Some(timeout) => self.interval.min(timeout.saturating_sub(elapsed)),
            None => self.interval,
        }
    }
}

impl From<&PollConfig> for PollPolicy {
    fn from(config: &PollConfig) -> Self {
        Self {
            interval: config.interval(),
            max_attempts: config.max_attempts,
            timeout: config.timeout(),
        }
    }
}

/// Result of [`wait_for`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Ready { value: T, attempts: u32 },
    TimedOut { attempts: u32, elapsed: Duration },
}

/// Polls an async condition until it yields a value or the policy runs out.
///
/// Sleeps one interval before every check, so callers make their own
/// immediate check first. The last sleep is shortened to end on the
/// wall-clock limit, where one final check is made. A failed check counts as
/// an attempt and is logged; it does not end polling.
pub async fn wait_for<F, Fut, T>(description: &str, policy: &PollPolicy, mut condition: F) -> PollOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, FailureReason>>,
{
    let start = Instant::now();
    let mut attempts = 0u32;
    loop {
        let elapsed = start.elapsed();
        if policy.exhausted(attempts, elapsed) {
            return PollOutcome::TimedOut { attempts, elapsed };
        }
        sleep(policy.pause(elapsed)).await;
        attempts += 1;
        match condition().await {
            Ok(Some(value)) => return PollOutcome::Ready { value, attempts },
            Ok(None) => {
                tracing::trace!(target: "poll", attempt = attempts, "'{}' not yet satisfied", description);
            }
            Err(e) => {
                // Transient failures are retried until the policy runs out.
                tracing::debug!(target: "poll", attempt = attempts, "Polling for '{}' received transient error: {}", description, e);
            }
        }
    }
}

/// An approval that was submitted and then observed in the allowance state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub token: String,
    pub amount: String,
    pub nonce: u64,
    /// Allowance re-queries needed; zero if the snapshot already matched.
    pub attempts: u32,
    pub waited: Duration,
}

/// Submits approvals and waits for them to show up in the allowance state.
#[derive(Debug)]
pub struct ConfirmationPoller<'a, T> {
    client: &'a GatewayClient<T>,
    policy: PollPolicy,
}

impl<'a, T: GatewayTransport> ConfirmationPoller<'a, T> {
    pub fn new(client: &'a GatewayClient<T>, policy: PollPolicy) -> Self {
        Self { client, policy }
    }

    /// Resets the allowance of the first two tokens to `amount` and confirms each in turn.
    ///
    /// `snapshot` is the allowance state last read from the gateway; an
    /// approval it already shows needs no re-query.
    pub async fn confirm_approvals(
        &self,
        tokens: &TokenSymbolSet,
        spender: &str,
        amount: &str,
        mut snapshot: AllowanceSnapshot,
    ) -> Result<Vec<Confirmation>, ScenarioError> {
        let mut confirmations = Vec::with_capacity(2);
        for token in tokens.under_test() {
            let confirmation = self
                .confirm_one(tokens, token, spender, amount, &mut snapshot)
                .await?;
            confirmations.push(confirmation);
        }
        Ok(confirmations)
    }

    /// Submits one approval and polls until `snapshot[token]` equals the approved amount.
    ///
    /// `snapshot` is the last allowance state seen; it is replaced by the
    /// state that confirmed the approval.
    pub async fn confirm_one(
        &self,
        tokens: &TokenSymbolSet,
        token: &str,
        spender: &str,
        amount: &str,
        snapshot: &mut AllowanceSnapshot,
    ) -> Result<Confirmation, ScenarioError> {
        tracing::info!(target: "poll", token, amount, "Resetting allowance");
        let approval_failed = |reason: FailureReason| ScenarioError::ApprovalFailed {
            token: token.to_string(),
            reason: reason.to_string(),
        };

        let nonce = self
            .client
            .nonce()
            .await
            .into_result()
            .map_err(approval_failed)?
            .nonce;
        tracing::info!(target: "poll", token, nonce, "Nonce fetched");

        let request = ApproveRequest::new(token)
            .spender(spender)
            .amount(amount)
            .nonce(nonce);
        let outcome = self
            .client
            .approve(&request)
            .await
            .into_result()
            .map_err(approval_failed)?;
        tracing::info!(target: "poll", token, amount = %outcome.amount, nonce = outcome.nonce, "Approval submitted");

        if snapshot.matches(token, &outcome.amount) {
            return Ok(Confirmation {
                token: token.to_string(),
                amount: outcome.amount,
                nonce: outcome.nonce,
                attempts: 0,
                waited: Duration::ZERO,
            });
        }

        let started = Instant::now();
        let client = self.client;
        let symbols = tokens.as_slice();
        let expected = outcome.amount.as_str();
        let polled = wait_for(
            &format!("allowance of {} for {} to be {}", token, spender, expected),
            &self.policy,
            || async move {
                tracing::info!(target: "poll", token, "Waited for the approval to be mined, rechecking allowances");
                client.dispatcher().metrics().inc_poll_attempts(token);
                let latest = client.allowances(symbols, spender).await.into_result()?;
                tracing::debug!(target: "poll", token, allowances = ?latest.approvals, "Allowances rechecked");
                let matched = latest.approvals.matches(token, expected);
                Ok::<_, FailureReason>(matched.then_some(latest.approvals))
            },
        )
        .await;

        match polled {
            PollOutcome::Ready { value, attempts } => {
                *snapshot = value;
                Ok(Confirmation {
                    token: token.to_string(),
                    amount: outcome.amount.clone(),
                    nonce: outcome.nonce,
                    attempts,
                    waited: started.elapsed(),
                })
            }
            PollOutcome::TimedOut { attempts, elapsed } => {
                tracing::warn!(target: "poll", token, attempts, ?elapsed, "Approval not confirmed");
                Err(ScenarioError::ApprovalTimedOut {
                    token: token.to_string(),
                    amount: outcome.amount.clone(),
                    attempts,
                    elapsed,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test(start_paused = true)]
    async fn ready_after_the_condition_holds() {
        let calls = Cell::new(0u32);
        let policy = PollPolicy::fixed(Duration::from_secs(13), 10);
        let started = Instant::now();

        let outcome = wait_for("third call", &policy, || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move { Ok((n == 3).then_some(n)) }
        })
        .await;

        assert_eq!(outcome, PollOutcome::Ready { value: 3, attempts: 3 });
        assert_eq!(started.elapsed(), Duration::from_secs(39));
    }

    #[tokio::test(start_paused = true)]
    async fn attempt_cap_yields_timed_out() {
        let policy = PollPolicy::fixed(Duration::from_secs(13), 4);
        let outcome: PollOutcome<()> = wait_for("never", &policy, || async { Ok(None) }).await;

        assert_eq!(
            outcome,
            PollOutcome::TimedOut {
                attempts: 4,
                elapsed: Duration::from_secs(52)
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn wall_clock_cap_yields_timed_out() {
        let policy = PollPolicy {
            interval: Duration::from_secs(13),
            max_attempts: None,
            timeout: Some(Duration::from_secs(60)),
        };
        let outcome: PollOutcome<()> = wait_for("never", &policy, || async { Ok(None) }).await;

        // Four full intervals, then a shortened 8s sleep and a last check at 60s.
        assert_eq!(
            outcome,
            PollOutcome::TimedOut {
                attempts: 5,
                elapsed: Duration::from_secs(60)
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_shorter_than_the_interval_is_not_overshot() {
        let policy = PollPolicy {
            interval: Duration::from_secs(13),
            max_attempts: None,
            timeout: Some(Duration::from_secs(5)),
        };
        let outcome: PollOutcome<()> = wait_for("never", &policy, || async { Ok(None) }).await;

        assert_eq!(
            outcome,
            PollOutcome::TimedOut {
                attempts: 1,
                elapsed: Duration::from_secs(5)
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn condition_met_at_the_deadline_is_ready() {
        let calls = Cell::new(0u32);
        let policy = PollPolicy {
            interval: Duration::from_secs(13),
            max_attempts: None,
            timeout: Some(Duration::from_secs(20)),
        };
        let started = Instant::now();

        let outcome = wait_for("second call", &policy, || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move { Ok((n == 2).then_some(n)) }
        })
        .await;

        assert_eq!(outcome, PollOutcome::Ready { value: 2, attempts: 2 });
        assert_eq!(started.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_keep_polling() {
        let calls = Cell::new(0u32);
        let policy = PollPolicy::fixed(Duration::from_secs(1), 5);

        let outcome = wait_for("recovers", &policy, || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 3 {
                    Err(FailureReason::Transport("connection reset".into()))
                } else {
                    Ok(Some(n))
                }
            }
        })
        .await;

        assert_eq!(outcome, PollOutcome::Ready { value: 3, attempts: 3 });
    }

    #[test]
    fn policy_follows_config() {
        let config = PollConfig {
            interval_secs: 2,
            max_attempts: Some(7),
            timeout_secs: Some(30),
        };
        let policy = PollPolicy::from(&config);
        assert_eq!(policy.interval, Duration::from_secs(2));
        assert_eq!(policy.max_attempts, Some(7));
        assert_eq!(policy.timeout, Some(Duration::from_secs(30)));
    }
}

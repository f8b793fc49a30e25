use log::{error, info, warn};

use crate::{Credentials, RemoteApi, Result, RetryPolicy, Session};

/// Logs in, retrying transient failures up to `policy.max_attempts` times.
///
/// Invalid credentials and unexpected answers end the attempt immediately.
pub async fn authenticate_with_retry(
    api: &dyn RemoteApi,
    credentials: &Credentials,
    policy: RetryPolicy,
) -> Result<Session> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        info!(
            "Logging in as {} (attempt {}/{})",
            credentials.username, attempt, max_attempts
        );

        match api.authenticate(credentials).await {
            Ok(session) => {
                info!("Logged in as {}", session.username());
                return Ok(session);
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let delay = policy.delay_after(attempt);
                warn!(
                    "Login attempt {} failed: {}; retrying in {:?}",
                    attempt, e, delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                error!("Login failed after {} attempt(s): {:?}", attempt, e);
                return Err(e.into());
            }
        }
    }
}

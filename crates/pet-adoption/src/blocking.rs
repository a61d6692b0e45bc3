//! Handlers run synchronous service calls (password hashing, snapshot fsync
//! under the store lock) on tokio's blocking pool.

use tokio::task;

use crate::error::ApiError;

/// Run `work` on the blocking pool and fold its error into an [`ApiError`].
pub async fn offload<T, E, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    task::spawn_blocking(work)
        .await
        .map_err(|err| ApiError::Internal(format!("blocking task failed: {err}")))?
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthError;

    #[tokio::test]
    async fn returns_the_value_of_the_work() {
        let value = offload(|| Ok::<_, AuthError>(7)).await.expect("work succeeds");
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn maps_service_errors() {
        let err = offload(|| Err::<(), _>(AuthError::Forbidden))
            .await
            .expect_err("work fails");
        assert_eq!(err, ApiError::Forbidden(AuthError::Forbidden.to_string()));
    }

    #[tokio::test]
    async fn panicking_work_is_an_internal_error() {
        let err = offload(|| -> Result<(), AuthError> { panic!("boom") })
            .await
            .expect_err("task panicked");
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[tokio::test]
    async fn runs_off_the_async_worker() {
        let caller = std::thread::current().id();
        let worker = offload(|| Ok::<_, AuthError>(std::thread::current().id()))
            .await
            .expect("work succeeds");
        assert_ne!(caller, worker);
    }
}

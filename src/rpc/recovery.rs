use crate::application_port::AuthError;
use crate::logger::*;
use futures_util::{FutureExt, Stream, StreamExt};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

/// Turns a panic raised while serving one call into an `Internal` reply for
/// that call only. The panic is logged with the method name; the server
/// keeps serving.
#[derive(Clone)]
pub struct Recovery {
    logger: Logger,
}

impl Recovery {
    pub fn new(logger: Logger) -> Self {
        Recovery { logger }
    }

    pub async fn unary<T, F>(&self, method: &str, call: F) -> Result<T, AuthError>
    where
        F: Future<Output = Result<T, AuthError>>,
    {
        let guarded = AssertUnwindSafe(call).catch_unwind();
        match self.logger.scope(guarded).await {
            Ok(outcome) => outcome,
            Err(panic) => {
                self.report(method, panic.as_ref());
                Err(AuthError::internal())
            }
        }
    }

    /// Streaming form: items pass through until the stream panics, at which
    /// point one `Internal` error is yielded and the stream ends.
    pub fn stream<S, T>(
        &self,
        method: &str,
        stream: S,
    ) -> impl Stream<Item = Result<T, AuthError>> + use<S, T>
    where
        S: Stream<Item = Result<T, AuthError>>,
    {
        let recovery = self.clone();
        let method = method.to_owned();
        AssertUnwindSafe(stream)
            .catch_unwind()
            .map(move |item| match item {
                Ok(item) => item,
                Err(panic) => {
                    recovery.report(&method, panic.as_ref());
                    Err(AuthError::internal())
                }
            })
    }

    fn report(&self, method: &str, panic: &(dyn Any + Send)) {
        let detail = panic_detail(panic);
        self.logger
            .in_scope(|| error!(%method, "recovered from panic: {}", detail));
    }
}

fn panic_detail(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn recovery() -> Recovery {
        Recovery::new(Logger::new("off").unwrap())
    }

    async fn exploding_call() -> Result<u32, AuthError> {
        panic!("boom");
    }

    async fn formatted_panic() -> Result<u32, AuthError> {
        panic!("boom #{}", 7);
    }

    #[tokio::test]
    async fn panic_becomes_internal_error() {
        let recovery = recovery();
        let outcome = recovery.unary("/auth.Auth/Login", exploding_call()).await;
        assert_eq!(outcome, Err(AuthError::internal()));

        let outcome = recovery.unary("/auth.Auth/Login", formatted_panic()).await;
        assert_eq!(outcome, Err(AuthError::internal()));
    }

    #[tokio::test]
    async fn results_pass_through_untouched() {
        let recovery = recovery();
        assert_eq!(recovery.unary("m", async { Ok(3) }).await, Ok(3));

        let conflict: Result<(), AuthError> = Err(AuthError::already_exists());
        let outcome = recovery.unary("m", async { conflict }).await;
        assert_eq!(outcome, Err(AuthError::already_exists()));
    }

    #[tokio::test]
    async fn calls_after_a_panic_are_served() {
        let recovery = recovery();
        let _ = recovery.unary("m", exploding_call()).await;
        assert_eq!(recovery.unary("m", async { Ok(1) }).await, Ok(1));
    }

    #[tokio::test]
    async fn panicking_stream_ends_with_internal_error() {
        let items = stream::iter(1..=5).map(|n| {
            if n == 3 {
                panic!("stream broke at {n}");
            }
            Ok::<_, AuthError>(n)
        });

        let collected: Vec<_> = recovery().stream("/auth.Auth/Watch", items).collect().await;
        assert_eq!(collected, vec![Ok(1), Ok(2), Err(AuthError::internal())]);
    }

    #[tokio::test]
    async fn healthy_stream_is_unchanged() {
        let items = stream::iter(vec![Ok(1), Err(AuthError::invalid_credentials()), Ok(2)]);
        let collected: Vec<_> = recovery().stream("m", items).collect().await;
        assert_eq!(
            collected,
            vec![Ok(1), Err(AuthError::invalid_credentials()), Ok(2)]
        );
    }

    #[test]
    fn panic_detail_reads_string_payloads() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_detail(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_detail(payload.as_ref()), "static");
        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_detail(payload.as_ref()), "non-string panic payload");
    }
}

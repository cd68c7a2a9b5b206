use std::time::Instant;

use tracing::info;

use super::{Middleware, Next};
use crate::handler::BoxFuture;
use crate::request::Request;

/// Access logging.
///
/// Emits `method` and `path` before calling the rest of the chain, then
/// `status` and `elapsed_ms` after. The response passes through untouched.
/// Emission goes through `tracing`, which cannot fail, so a missing or broken
/// subscriber never affects the request.
#[derive(Clone, Copy, Debug, Default)]
pub struct Logger;

impl Middleware for Logger {
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        let method = req.method().to_owned();
        let path = req.path().to_owned();

        Box::pin(async move {
            info!(%method, %path, "request");
            let start = Instant::now();

            let res = next.run(req).await;

            info!(
                %method,
                %path,
                status = res.code(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "response"
            );
            res
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::{self, Write as _};
    use std::sync::{Arc, Mutex};

    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    use super::*;
    use crate::middleware::compose;
    use crate::Response;

    type Lines = Arc<Mutex<Vec<String>>>;

    /// Flattens every event into `name=value` pairs, in emission order.
    struct Capture(Lines);

    struct Fields(String);

    impl Visit for Fields {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            let _ = write!(self.0, "{}={:?} ", field.name(), value);
        }
    }

    impl<S: Subscriber> Layer<S> for Capture {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = Fields(String::new());
            event.record(&mut fields);
            self.0.lock().unwrap().push(fields.0);
        }
    }

    #[tokio::test]
    async fn passes_response_through() {
        let layers: [Arc<dyn Middleware>; 1] = [Arc::new(Logger)];
        let chain = compose(&layers, |_req: Request| async {
            Response::builder().status(201).header("x-id", "7").text("made")
        });

        let res = chain.call(Request::new("POST", "/things")).await;
        assert_eq!(res.code(), 201);
        assert_eq!(res.header("x-id"), Some("7"));
        assert_eq!(res.body(), b"made");
    }

    #[tokio::test]
    async fn logs_request_before_handler_and_status_after() {
        let lines = Lines::default();
        let subscriber = tracing_subscriber::registry().with(Capture(Arc::clone(&lines)));
        let _guard = tracing::subscriber::set_default(subscriber);

        let handler_lines = Arc::clone(&lines);
        let layers: [Arc<dyn Middleware>; 1] = [Arc::new(Logger)];
        let chain = compose(&layers, move |_req: Request| {
            let lines = Arc::clone(&handler_lines);
            async move {
                lines.lock().unwrap().push("handler".to_owned());
                Response::status(204)
            }
        });

        chain.call(Request::new("DELETE", "/things/7")).await;

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 3, "{lines:?}");

        assert!(lines[0].contains("message=request"), "{lines:?}");
        assert!(lines[0].contains("method=DELETE"), "{lines:?}");
        assert!(lines[0].contains("path=/things/7"), "{lines:?}");
        assert!(!lines[0].contains("status="), "{lines:?}");

        assert_eq!(lines[1], "handler");

        assert!(lines[2].contains("message=response"), "{lines:?}");
        assert!(lines[2].contains("status=204"), "{lines:?}");
        assert!(lines[2].contains("elapsed_ms="), "{lines:?}");
    }
}

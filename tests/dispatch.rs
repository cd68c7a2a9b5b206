//! End-to-end dispatch through `Service`, no sockets.

use std::sync::{Arc, Mutex};

use switchyard::middleware::{Logger, Next, Recover};
use switchyard::{HttpError, Method, Request, Response, Router};

async fn user(_req: Request) -> Response {
    Response::text("User information")
}

async fn bad_input(_req: Request) -> Result<Response, HttpError> {
    Err(HttpError::new(400, "bad input"))
}

async fn explode(_req: Request) -> Response {
    panic!("database password is hunter2");
}

fn app() -> Router {
    Router::new()
        .layer(Logger)
        .layer(Recover)
        .get("/user", user)
        .get("/err", bad_input)
        .get("/panic", explode)
}

#[tokio::test]
async fn registered_route_returns_handler_response() {
    let service = app().into_service();

    let res = service.dispatch(Request::new("GET", "/user")).await;
    assert_eq!(res.code(), 200);
    assert_eq!(res.body(), b"User information");
}

#[tokio::test]
async fn no_routes_means_405() {
    let service = Router::new().into_service();

    let res = service.dispatch(Request::new("POST", "/x")).await;
    assert_eq!(res.code(), 405);
    assert!(!res.body().is_empty());
}

#[tokio::test]
async fn known_method_unknown_path_means_404() {
    let service = Router::new().get("/a", user).into_service();

    let res = service.dispatch(Request::new("GET", "/b")).await;
    assert_eq!(res.code(), 404);
    assert_eq!(res.body(), b"Not Found");

    let res = service.dispatch(Request::new("DELETE", "/a")).await;
    assert_eq!(res.code(), 405);
    assert_eq!(res.body(), b"Method Not Allowed");
}

#[tokio::test]
async fn handler_error_sets_status_and_body() {
    let service = app().into_service();

    let res = service.dispatch(Request::new("GET", "/err")).await;
    assert_eq!(res.code(), 400);
    assert!(String::from_utf8_lossy(res.body()).contains("bad input"));
}

#[tokio::test]
async fn panic_becomes_500_and_service_keeps_working() {
    let service = app().into_service();

    let res = service.dispatch(Request::new("GET", "/panic")).await;
    assert_eq!(res.code(), 500);
    assert!(!String::from_utf8_lossy(res.body()).contains("hunter2"));

    let res = service.dispatch(Request::new("GET", "/user")).await;
    assert_eq!(res.code(), 200);
}

#[tokio::test]
async fn reregistration_overwrites() {
    let service = Router::new()
        .on(Method::Get, "/v", |_req: Request| async { "old" })
        .on("GET", "/v", |_req: Request| async { "new" })
        .into_service();

    let res = service.dispatch(Request::new("GET", "/v")).await;
    assert_eq!(res.body(), b"new");
}

#[tokio::test]
async fn middleware_sees_routing_errors_as_responses() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let record = {
        let seen = Arc::clone(&seen);
        move |req: Request, next: Next| {
            let seen = Arc::clone(&seen);
            async move {
                let res = next.run(req).await;
                seen.lock().unwrap().push(res.code());
                res
            }
        }
    };

    let service = Router::new().layer(record).get("/a", user).into_service();
    service.dispatch(Request::new("GET", "/a")).await;
    service.dispatch(Request::new("GET", "/missing")).await;
    service.dispatch(Request::new("PUT", "/a")).await;

    assert_eq!(*seen.lock().unwrap(), [200, 404, 405]);
}

#[tokio::test]
async fn middleware_wraps_in_registration_order() {
    let trail = Arc::new(Mutex::new(Vec::<&'static str>::new()));
    let layer = |name_in: &'static str, name_out: &'static str| {
        let trail = Arc::clone(&trail);
        move |req: Request, next: Next| {
            let trail = Arc::clone(&trail);
            async move {
                trail.lock().unwrap().push(name_in);
                let res = next.run(req).await;
                trail.lock().unwrap().push(name_out);
                res
            }
        }
    };

    let handler_trail = Arc::clone(&trail);
    let service = Router::new()
        .layer(layer("A>", "<A"))
        .layer(layer("B>", "<B"))
        .get("/", move |_req: Request| {
            let trail = Arc::clone(&handler_trail);
            async move {
                trail.lock().unwrap().push("H");
                "ok"
            }
        })
        .into_service();

    service.dispatch(Request::new("GET", "/")).await;
    assert_eq!(*trail.lock().unwrap(), ["A>", "B>", "H", "<B", "<A"]);
}

#[tokio::test]
async fn concurrent_dispatch_shares_one_service() {
    let service = Arc::new(
        Router::new()
            .get("/slow", |_req: Request| async {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                "slow"
            })
            .get("/user", user)
            .into_service(),
    );

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let service = Arc::clone(&service);
            let path = if i % 2 == 0 { "/slow" } else { "/user" };
            tokio::spawn(async move { service.dispatch(Request::new("GET", path)).await.code() })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap(), 200);
    }
}

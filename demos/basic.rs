//! Minimal switchyard demo.
//!
//! Run with:
//!   RUST_LOG=info PORT=3000 cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/user          → 200 User information
//!   curl -i -X POST http://localhost:3000/user  → 400 bad input
//!   curl -i http://localhost:3000/users         → 404
//!   curl -i -X PUT http://localhost:3000/user   → 405
//!   curl -i http://localhost:3000/panic         → 500, server keeps running

use switchyard::middleware::{Logger, Recover};
use switchyard::{Config, HttpError, Request, Response, Router, Server};

#[tokio::main]
async fn main() -> Result<(), switchyard::Error> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    let mut app = Router::new();
    if config.access_log {
        app = app.layer(Logger);
    }
    let app = app
        .layer(Recover)
        .get("/user", get_user)
        .post("/user", create_user)
        .get("/panic", panic_handler);

    Server::from_config(&config).await?.serve(app).await
}

// GET /user
async fn get_user(_req: Request) -> Response {
    Response::text("User information")
}

// POST /user: an empty body is a client error.
async fn create_user(req: Request) -> Result<Response, HttpError> {
    if req.body().is_empty() {
        return Err(HttpError::new(400, "bad input"));
    }
    Ok(Response::builder()
        .status(201)
        .header("location", "/user")
        .json(req.body().to_vec()))
}

async fn panic_handler(_req: Request) -> Response {
    panic!("something went badly wrong");
}

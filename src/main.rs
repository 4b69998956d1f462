//! Job Board Backend - binary entry point
//! Delegates to the library for all app logic.

#[tokio::main]
async fn main() {
    jobboard_backend::run().await;
}

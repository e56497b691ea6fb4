use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes HTTP requests; lets callers swap the transport used to fetch input exports.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

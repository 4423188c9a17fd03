use crate::routes::{health, messages};
use utoipa::openapi::server::Server;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "missive-server",
    description = "Message board CRUD API",
    version = "0.1.0"
))]
pub struct ApiDoc;

/// Merged OpenAPI document. Paths are relative to `prefix`, which is
/// advertised as the server URL.
pub fn get_docs(prefix: &str) -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(messages::MessagesApi::openapi());
    if !prefix.is_empty() {
        root.servers = Some(vec![Server::new(prefix)]);
    }
    root
}

use utoipa::OpenApi;

use crate::routes::{chat, health, todos};

#[derive(OpenApi)]
#[openapi(info(
    title = "taskchat-server",
    description = "In-memory to-do list with a natural-language chat endpoint",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(todos::TodosApi::openapi());
    root.merge(chat::ChatApi::openapi());
    root
}

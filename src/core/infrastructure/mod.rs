pub mod api_client;
pub mod resource_cache;

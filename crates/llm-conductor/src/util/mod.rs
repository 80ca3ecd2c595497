pub mod partial_json;
pub(crate) mod stream_lifecycle;

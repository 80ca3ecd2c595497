// api/mod.rs — High-level API module (Layer 4).

pub mod generate;
pub mod generate_object;
pub mod generate_types;
pub mod stream;
pub mod stream_object;
pub mod tool_loop;
pub mod types;

pub use types::*;

pub use generate::generate_text;
pub use generate_object::generate_object;
pub use generate_types::{GenerateObjectResult, GenerateTextResult, GenerationStep};
pub use stream::{estimate_tokens, stream_text, StreamResult, TextDeltaStream};
pub use stream_object::{stream_object, ObjectStream};
pub use tool_loop::execute_tool_calls;

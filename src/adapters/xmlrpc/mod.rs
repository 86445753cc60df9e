pub mod client;
pub mod decode;
pub mod value;

pub use client::XmlRpcClient;
pub use decode::decode_response;
pub use value::{encode_call, Value};

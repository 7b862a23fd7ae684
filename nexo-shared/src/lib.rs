pub mod ids;
pub mod rpc;

pub use ids::ProductId;
pub use rpc::{ChannelError, RequestChannel, RpcReply, RpcRequest};

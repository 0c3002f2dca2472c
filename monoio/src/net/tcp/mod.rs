#![allow(unreachable_pub)]

mod listener;
mod split;
mod stream;

pub use listener::TcpListener;
pub use split::{
    OwnedReadHalf as TcpOwnedReadHalf, OwnedWriteHalf as TcpOwnedWriteHalf,
    ReadHalf as TcpReadHalf, WriteHalf as TcpWriteHalf,
};
pub use stream::TcpStream;

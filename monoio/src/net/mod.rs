//! Network related

mod listener_config;
mod tcp;
pub mod unix;

pub use listener_config::ListenerConfig;
pub use tcp::{
    TcpListener, TcpOwnedReadHalf, TcpOwnedWriteHalf, TcpReadHalf, TcpStream, TcpWriteHalf,
};
pub use unix::{UnixListener, UnixStream};

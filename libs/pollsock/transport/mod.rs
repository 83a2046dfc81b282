//! Socket stacks for the native transport

pub mod tungstenite;

pub use self::tungstenite::{TungsteniteConnector, TungsteniteReader, TungsteniteWriter};

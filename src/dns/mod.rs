//! DNS-related modules.

pub mod record;
pub mod resolver;
pub mod transport;

pub use record::RecordKind;
pub use resolver::{Resolution, Resolver};
pub use transport::{Exchange, UdpTcpExchange};

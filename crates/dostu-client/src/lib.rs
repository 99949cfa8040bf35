pub mod config;
pub mod error;
pub mod http;
pub mod traits;

pub use config::EndpointConfig;
pub use error::ExchangeError;
pub use http::HttpExchangeClient;
pub use traits::{ExchangeClient, ExchangeReply, ExchangeRequest, HistoryTurn};

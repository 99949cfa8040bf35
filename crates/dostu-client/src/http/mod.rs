mod client;

pub use client::HttpExchangeClient;

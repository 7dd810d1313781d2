pub mod alpha_vantage;
pub mod http;
pub mod news_api;

pub use alpha_vantage::AlphaVantageProvider;
pub use news_api::NewsApiProvider;

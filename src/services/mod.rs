pub mod indicators;
pub mod market_config;
pub mod market_session;
pub mod quote_service;
pub mod rate_limiter;
pub mod search_service;
pub mod series_cache;
pub mod time_series_processor;
pub mod validation;

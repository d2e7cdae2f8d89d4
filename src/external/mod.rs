pub mod alphavantage;
pub mod provider;

pub mod daily;
pub mod health;
pub mod markets;
pub mod search;

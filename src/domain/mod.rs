pub mod account;
pub mod entry;
pub mod ids;
pub mod money;
pub mod ports;
pub mod reversal;
pub mod settings;
pub mod state;
pub mod transaction;
pub mod wallet;

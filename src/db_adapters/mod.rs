pub mod account_adapter;

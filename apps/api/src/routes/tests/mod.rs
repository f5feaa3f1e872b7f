mod account;
mod agencies;
mod auth;
mod common;
mod linkedin;

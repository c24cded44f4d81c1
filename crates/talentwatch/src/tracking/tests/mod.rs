mod common;
mod signals;
mod store;

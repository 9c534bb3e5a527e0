mod common;

mod consent;
mod http;

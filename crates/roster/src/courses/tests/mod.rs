mod candidates;
mod common;
mod service;

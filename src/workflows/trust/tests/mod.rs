mod common;
mod flags;
mod routing;
mod service;

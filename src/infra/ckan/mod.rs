mod client;

pub use client::CkanClient;

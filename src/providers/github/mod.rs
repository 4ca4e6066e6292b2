mod client;
mod flatten;
mod pagination;
mod provider;
pub mod types;


pub use provider::GitHubProvider;

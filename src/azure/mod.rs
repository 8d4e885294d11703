/// Azure Resource Manager client implementation
pub mod client;
pub mod clusters;
pub mod models;

pub use client::AzureArmClient;
pub use clusters::ClusterManager;

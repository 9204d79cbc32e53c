pub mod clients;
pub mod config;
pub mod content;
pub mod descriptor;
pub mod dispatcher;
pub mod error;
pub mod id;
pub mod pipeline;
pub mod publisher;
pub mod registrar;
pub mod selector;
pub mod tx;
pub mod wallet;

// Re-export the main types for convenience
pub use clients::{
    BundlingRelay, ContractDeployEndpoint, ContractState, ContractStateProvider,
    HttpBundlingRelay, HttpDeployEndpoint, HttpLedgerEndpoint, HttpStateProvider, LedgerEndpoint,
};
pub use config::Config;
pub use content::{Content, ContentSource, HttpContentSource};
pub use descriptor::{AssetDescriptor, DescriptorBuilder, InitState, PathManifest};
pub use error::{AssetError, AtomicAssetCreationError, PipelineStage};
pub use id::TransactionId;
pub use pipeline::{AssetPipeline, CreatedAsset};
pub use selector::select_holder;
pub use tx::{Tag, Transaction};
pub use wallet::Wallet;

mod object_store_probe;
mod presigned_url_issuer;
mod simulated_probe;
mod static_url_issuer;
mod storage_factory;

pub use object_store_probe::ObjectStoreProbe;
pub use presigned_url_issuer::PresignedUrlIssuer;
pub use simulated_probe::SimulatedProbe;
pub use static_url_issuer::StaticUrlIssuer;
pub use storage_factory::{StorageConfigError, StorageFactory};

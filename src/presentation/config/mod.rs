mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    LoggingSettings, QueueBackendSetting, QueueSettings, ServerSettings, Settings,
    StorageProviderSetting, StorageSettings, StoreBackendSetting, StoreSettings,
    SubmissionSettings, WorkerSettings,
};

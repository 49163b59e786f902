pub mod proxy_applier;

pub use proxy_applier::ProcessProxyApplier;

mod proxy_config_dto;

pub use proxy_config_dto::{ProxyConfigDto, UpdateProxyConfigInput};

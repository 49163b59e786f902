pub mod file_store;
pub mod properties;

mod path_lock;
mod result_ext;

pub use file_store::FileProxyConfigRepository;
pub use properties::{Properties, PropertiesError};
pub use result_ext::ResultExt;

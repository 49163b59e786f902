pub mod encryption;
pub mod legacy;
pub mod protector;

pub use encryption::{EncryptionError, EncryptionService};
pub use legacy::LegacyCipher;
pub use protector::{CipherScheme, PasswordProtector, KEY_CONSTANT};

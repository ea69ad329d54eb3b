use std::fmt;
use std::fs;
use std::path::Path;

use jsonwebtoken::{DecodingKey, EncodingKey};
use tracing::{debug, error};

use super::TokenError;

/// RSA key pair: the private half signs tokens, the public half verifies them.
#[derive(Clone)]
pub struct KeyPair {
    pub(crate) encoding: EncodingKey,
    pub(crate) decoding: DecodingKey,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair").finish_non_exhaustive()
    }
}

impl KeyPair {
    /// Read both PEM files and parse them as RSA keys.
    ///
    /// There is no fallback key: any unreadable or unparsable file is a
    /// [`TokenError::KeyLoad`] naming the offending path.
    pub fn load(
        private_path: impl AsRef<Path>,
        public_path: impl AsRef<Path>,
    ) -> Result<Self, TokenError> {
        let private_path = private_path.as_ref();
        let public_path = public_path.as_ref();

        let private_pem = read_pem(private_path)?;
        let public_pem = read_pem(public_path)?;

        let encoding = EncodingKey::from_rsa_pem(&private_pem)
            .map_err(|e| key_error(private_path, e.to_string()))?;
        let decoding = DecodingKey::from_rsa_pem(&public_pem)
            .map_err(|e| key_error(public_path, e.to_string()))?;

        debug!(
            "Loaded RSA key pair (private: {}, public: {})",
            private_path.display(),
            public_path.display()
        );

        Ok(Self { encoding, decoding })
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, TokenError> {
    fs::read(path).map_err(|e| key_error(path, e.to_string()))
}

fn key_error(path: &Path, reason: String) -> TokenError {
    error!("Failed to load key {}: {}", path.display(), reason);
    TokenError::KeyLoad {
        path: path.display().to_string(),
        reason,
    }
}

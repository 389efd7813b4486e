//! Creating and opening protected packages.

use crate::binding::{BindingStore, DeviceBinding};
use crate::error::{PackageError, PackageResult};
use crate::format;
use crate::metadata::{ContentInfo, PackageMetadata, FORMAT_VERSION};
use chrono::Utc;
use readguard_crypto::{decrypt, derive_key, encrypt, CryptoError, KdfParams, Salt};
use readguard_device::FingerprintSource;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of opening a package.
#[derive(Debug, Clone)]
pub struct OpenedPackage {
    pub metadata: PackageMetadata,
    pub plaintext: Vec<u8>,
    /// Whether the local binding store knew this content on this device.
    pub bound_locally: bool,
}

/// Builds and opens packages bound to the current device.
///
/// Cheap to clone; clones share the fingerprint source and binding store.
#[derive(Clone)]
pub struct Packager {
    fingerprints: Arc<dyn FingerprintSource>,
    bindings: Arc<dyn BindingStore>,
    kdf: KdfParams,
}

impl Packager {
    pub fn new(fingerprints: Arc<dyn FingerprintSource>, bindings: Arc<dyn BindingStore>) -> Self {
        Self {
            fingerprints,
            bindings,
            kdf: KdfParams::default(),
        }
    }

    /// Uses `kdf` for packages created from now on. Opening always follows
    /// the parameters recorded in the package.
    pub fn with_kdf(mut self, kdf: KdfParams) -> PackageResult<Self> {
        kdf.validate()?;
        self.kdf = kdf;
        Ok(self)
    }

    pub fn kdf(&self) -> &KdfParams {
        &self.kdf
    }

    /// Encrypts `plaintext` into a package locked to this device.
    pub fn create(
        &self,
        plaintext: &[u8],
        password: &str,
        content: &ContentInfo,
    ) -> PackageResult<Vec<u8>> {
        if password.is_empty() {
            return Err(PackageError::EmptyPassword);
        }

        let fingerprint = self.fingerprints.current_fingerprint();
        let salt = Salt::random();
        let key = derive_key(password, fingerprint.id(), &salt, &self.kdf)?;
        let (ciphertext, iv) = encrypt(plaintext, &key)?;

        let metadata = PackageMetadata {
            version: FORMAT_VERSION.to_string(),
            content_id: content.content_id.clone(),
            content_title: content.title.clone(),
            user_id: content.user_id.clone(),
            device_fingerprint: fingerprint.id().to_string(),
            created_at: Utc::now(),
            iv: iv.as_bytes().to_vec(),
            encrypted_size: ciphertext.len(),
            salt: Some(salt.as_bytes().to_vec()),
            kdf: Some(self.kdf),
        };
        let bytes = format::assemble(&metadata, &ciphertext)?;

        self.bindings
            .put(DeviceBinding::new(&content.content_id, fingerprint.id()))?;

        info!(
            content_id = %content.content_id,
            size = bytes.len(),
            "Created protected package"
        );
        Ok(bytes)
    }

    /// Opens a package on this device.
    ///
    /// The device check runs before any key derivation, so a foreign
    /// package fails fast with [`PackageError::DeviceMismatch`] whatever the
    /// password.
    pub fn open(&self, bytes: &[u8], password: &str) -> PackageResult<OpenedPackage> {
        let (metadata, ciphertext) = format::parse(bytes)?;

        let fingerprint = self.fingerprints.current_fingerprint();
        if metadata.device_fingerprint != fingerprint.id() {
            warn!(
                content_id = %metadata.content_id,
                "Package is bound to a different device"
            );
            return Err(PackageError::DeviceMismatch);
        }

        if password.is_empty() {
            return Err(PackageError::BadPassword);
        }

        let iv = metadata.iv()?;
        let (salt, kdf) = metadata.key_params()?;
        let key = derive_key(password, fingerprint.id(), &salt, &kdf)?;
        let plaintext = decrypt(ciphertext, &iv, &key).map_err(|e| match e {
            CryptoError::Decryption => PackageError::BadPassword,
            other => PackageError::Crypto(other),
        })?;

        let bound_locally = match self.bindings.get(&metadata.content_id) {
            Ok(Some(binding)) => binding.device_fingerprint == fingerprint.id(),
            Ok(None) => false,
            Err(e) => {
                warn!("Could not read device binding: {e}");
                false
            }
        };
        if !bound_locally {
            debug!(content_id = %metadata.content_id, "No local binding for package");
        }

        info!(content_id = %metadata.content_id, "Opened protected package");
        Ok(OpenedPackage {
            metadata,
            plaintext,
            bound_locally,
        })
    }

    /// [`create`](Self::create) on the blocking pool.
    pub async fn create_package(
        &self,
        plaintext: Vec<u8>,
        password: String,
        content: ContentInfo,
    ) -> PackageResult<Vec<u8>> {
        let packager = self.clone();
        tokio::task::spawn_blocking(move || packager.create(&plaintext, &password, &content))
            .await
            .map_err(|e| PackageError::Task(e.to_string()))?
    }

    /// [`open`](Self::open) on the blocking pool.
    pub async fn open_package(
        &self,
        bytes: Vec<u8>,
        password: String,
    ) -> PackageResult<OpenedPackage> {
        let packager = self.clone();
        tokio::task::spawn_blocking(move || packager.open(&bytes, &password))
            .await
            .map_err(|e| PackageError::Task(e.to_string()))?
    }
}

//! Protected package format for readguard "secure downloads".
//!
//! A package is a single file holding encrypted content plus the metadata
//! needed to open it again:
//!
//! ```text
//! [4 bytes: big-endian u32 length of metadata JSON]
//! [metadata JSON, UTF-8]
//! [AES-256-GCM ciphertext + tag]
//! ```
//!
//! Opening is a two-stage check. The current device fingerprint must equal
//! the one recorded in the metadata before any key is derived; only then is
//! the password tried. A correct password on the wrong device therefore
//! reports [`PackageError::DeviceMismatch`] rather than a generic failure.
//!
//! There is no revocation: a package lives until its holder deletes it.

mod binding;
mod error;
mod format;
mod metadata;
mod packager;

pub use binding::{BindingStore, DeviceBinding, FileBindingStore, MemoryBindingStore};
pub use error::{PackageError, PackageResult};
pub use format::{
    assemble, parse, read_metadata, LENGTH_PREFIX_SIZE, MAX_METADATA_LEN, PACKAGE_EXTENSION,
    PACKAGE_MIME_TYPE,
};
pub use metadata::{ContentInfo, PackageMetadata, FORMAT_VERSION, LEGACY_FORMAT_VERSION};
pub use packager::{OpenedPackage, Packager};

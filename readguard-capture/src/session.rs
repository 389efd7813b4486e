//! Live reading sessions.

use crate::controller::AttemptCounter;
use crate::error::{CaptureError, CaptureResult};
use chrono::{DateTime, Duration, Utc};
use readguard_crypto::{decrypt, derive_session_key, encrypt, EncryptionKey, Iv, SessionToken};
use readguard_device::{DeviceFingerprint, DEFAULT_SIMILARITY_THRESHOLD};
use tracing::{info, warn};

/// A timed reading session bound to the device it started on.
///
/// Content sent during the session is sealed under a key derived from the
/// session token and the device fingerprint.
pub struct ReadingSession {
    token: SessionToken,
    fingerprint: DeviceFingerprint,
    started_at: DateTime<Utc>,
    duration: Duration,
    threshold: f64,
    key: EncryptionKey,
    attempts: AttemptCounter,
}

impl ReadingSession {
    /// Starts a session with a fresh token. Runs the KDF once.
    pub fn start(fingerprint: DeviceFingerprint, duration: Duration) -> CaptureResult<Self> {
        Self::start_at(fingerprint, duration, Utc::now())
    }

    pub fn start_at(
        fingerprint: DeviceFingerprint,
        duration: Duration,
        started_at: DateTime<Utc>,
    ) -> CaptureResult<Self> {
        let token = SessionToken::generate();
        let key = derive_session_key(&token, fingerprint.id())?;
        info!(session = token.short(), "Reading session started");
        Ok(Self {
            token,
            fingerprint,
            started_at,
            duration,
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
            key,
            attempts: AttemptCounter::new(),
        })
    }

    /// Minimum similarity for [`validate_device`](Self::validate_device).
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    pub fn fingerprint(&self) -> &DeviceFingerprint {
        &self.fingerprint
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Attempt counter for this session; starts at zero.
    pub fn attempts(&self) -> &AttemptCounter {
        &self.attempts
    }

    pub fn remaining(&self) -> Duration {
        self.remaining_at(Utc::now())
    }

    /// When the session ends; `None` if the duration runs past the
    /// representable calendar, which never expires.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.started_at.checked_add_signed(self.duration)
    }

    /// Time left at `now`, never negative. Saturates at [`Duration::MAX`]
    /// for sessions without a representable end.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        match self.expires_at() {
            Some(end) => end.signed_duration_since(now).max(Duration::zero()),
            None => Duration::MAX,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.remaining_at(now).is_zero()
    }

    /// Checks that `current` still looks like the starting device.
    pub fn validate_device(&self, current: &DeviceFingerprint) -> CaptureResult<()> {
        let similarity = self.fingerprint.similarity(current);
        if similarity >= self.threshold {
            Ok(())
        } else {
            warn!(session = self.token.short(), "Device changed mid-session ({similarity:.2})");
            Err(CaptureError::DeviceChanged { similarity })
        }
    }

    /// Encrypts content for display in this session.
    pub fn seal(&self, plaintext: &[u8]) -> CaptureResult<(Vec<u8>, Iv)> {
        self.ensure_live()?;
        Ok(encrypt(plaintext, &self.key)?)
    }

    /// Decrypts content sealed in this session.
    pub fn open(&self, ciphertext: &[u8], iv: &Iv) -> CaptureResult<Vec<u8>> {
        self.ensure_live()?;
        Ok(decrypt(ciphertext, iv, &self.key)?)
    }

    fn ensure_live(&self) -> CaptureResult<()> {
        if self.is_expired() {
            return Err(CaptureError::SessionExpired);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprint(parts: &[&str]) -> DeviceFingerprint {
        DeviceFingerprint::from_components(parts.iter().map(|s| s.to_string()).collect(), 32)
    }

    #[test]
    fn countdown() {
        let start = Utc::now();
        let session =
            ReadingSession::start_at(fingerprint(&["a"]), Duration::minutes(30), start).unwrap();

        assert_eq!(session.remaining_at(start), Duration::minutes(30));
        assert_eq!(
            session.remaining_at(start + Duration::minutes(10)),
            Duration::minutes(20)
        );
        assert!(!session.is_expired_at(start + Duration::minutes(29)));
        assert!(session.is_expired_at(start + Duration::minutes(30)));
        assert_eq!(
            session.remaining_at(start + Duration::hours(2)),
            Duration::zero()
        );
    }

    #[test]
    fn unbounded_duration_never_expires() {
        let session = ReadingSession::start(fingerprint(&["a"]), Duration::MAX).unwrap();
        assert_eq!(session.expires_at(), None);
        assert_eq!(session.remaining(), Duration::MAX);
        assert!(!session.is_expired());

        let (ciphertext, iv) = session.seal(b"forever").unwrap();
        assert_eq!(session.open(&ciphertext, &iv).unwrap(), b"forever");
    }

    #[test]
    fn expired_session_refuses_to_seal() {
        let start = Utc::now() - Duration::hours(1);
        let session =
            ReadingSession::start_at(fingerprint(&["a"]), Duration::minutes(5), start).unwrap();
        assert!(matches!(session.seal(b"x"), Err(CaptureError::SessionExpired)));
    }

    #[test]
    fn device_revalidation_uses_threshold() {
        let original = fingerprint(&["a", "b", "c", "d"]);
        let session = ReadingSession::start(original.clone(), Duration::minutes(5)).unwrap();

        assert!(session.validate_device(&original).is_ok());
        // 3 of 4 components still match.
        assert!(session.validate_device(&fingerprint(&["a", "b", "c", "x"])).is_ok());
        assert!(matches!(
            session.validate_device(&fingerprint(&["a", "x", "y", "z"])),
            Err(CaptureError::DeviceChanged { .. })
        ));

        let strict = ReadingSession::start(original, Duration::minutes(5))
            .unwrap()
            .with_threshold(1.0);
        assert!(strict.validate_device(&fingerprint(&["a", "b", "c", "x"])).is_err());
    }

    #[test]
    fn seal_open_roundtrip() {
        let session = ReadingSession::start(fingerprint(&["a"]), Duration::minutes(5)).unwrap();
        let (ciphertext, iv) = session.seal(b"page 3").unwrap();
        assert_eq!(session.open(&ciphertext, &iv).unwrap(), b"page 3");

        let other = ReadingSession::start(fingerprint(&["a"]), Duration::minutes(5)).unwrap();
        assert!(other.open(&ciphertext, &iv).is_err());
    }
}

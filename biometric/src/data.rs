//! Biometric capture and hash types.

use serde::{Deserialize, Serialize};
use std::fmt;
use tenure_types::{GeoPoint, Timestamp};

/// A biometric modality supported by the protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modality {
    Fingerprint,
    Face,
    Voice,
}

impl Modality {
    /// Domain-separation tag mixed into the hash preimage, so the same raw
    /// bytes hash differently across modalities.
    pub fn tag(&self) -> &'static [u8] {
        match self {
            Self::Fingerprint => b"fingerprint",
            Self::Face => b"face",
            Self::Voice => b"voice",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Fingerprint => "fingerprint",
            Self::Face => "face",
            Self::Voice => "voice",
        };
        write!(f, "{s}")
    }
}

/// A fingerprint capture: raw template bytes plus the scanner's quality score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FingerprintSample {
    pub template: Vec<u8>,
    /// Scanner-reported quality, 0..=100.
    pub quality: f64,
}

/// A face capture: raw image bytes plus the detector's confidence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceSample {
    pub image: Vec<u8>,
    /// Detector-reported confidence, 0..=100.
    pub confidence: f64,
}

/// A voice capture: raw audio plus duration and optional transcript.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoiceSample {
    pub audio: Vec<u8>,
    pub duration_secs: f64,
    /// Transcript of the spoken liveness phrase, when speech-to-text ran.
    pub transcript: Option<String>,
}

/// One biometric capture session. Raw samples are caller-supplied and only
/// live as long as this value. Hashes are persisted, captures never are.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiometricData {
    pub fingerprint: Option<FingerprintSample>,
    pub face: Option<FaceSample>,
    pub voice: Option<VoiceSample>,
    /// Where the capture happened, if the device reported it.
    pub capture_location: Option<GeoPoint>,
    pub captured_at: Timestamp,
}

impl BiometricData {
    /// Modalities present in this capture.
    pub fn modalities(&self) -> Vec<Modality> {
        let mut present = Vec::new();
        if self.fingerprint.is_some() {
            present.push(Modality::Fingerprint);
        }
        if self.face.is_some() {
            present.push(Modality::Face);
        }
        if self.voice.is_some() {
            present.push(Modality::Voice);
        }
        present
    }

    pub fn has_any_modality(&self) -> bool {
        self.fingerprint.is_some() || self.face.is_some() || self.voice.is_some()
    }
}

/// The retained, privacy-preserving form of one biometric sample.
///
/// One-way by construction: there is no operation anywhere in the protocol
/// that recovers a sample from its hash.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiometricHash {
    pub modality: Modality,
    /// SHA3-512 digest, hex.
    pub hash: String,
    /// Per-sample random salt, hex.
    pub salt: String,
    /// Hash algorithm identifier, for forward migration.
    pub algorithm: String,
    /// Quality/confidence score the capture device reported.
    pub quality: f64,
}

/// Result of matching a candidate capture against stored hashes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiometricMatch {
    pub is_match: bool,
    /// Policy-derived confidence, 0..=100. Not a biometric similarity metric.
    pub confidence: f64,
    /// The modality that produced the best match, when one matched.
    pub modality: Option<Modality>,
}

impl BiometricMatch {
    pub fn no_match() -> Self {
        Self {
            is_match: false,
            confidence: 0.0,
            modality: None,
        }
    }
}

/// Outcome of quality gating over a capture.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    pub is_valid: bool,
    pub issues: Vec<String>,
}

/// Outcome of the anti-spoofing liveness heuristic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LivenessResult {
    pub is_live: bool,
    /// Average heuristic score across present modalities, 0..=100.
    pub confidence: f64,
}

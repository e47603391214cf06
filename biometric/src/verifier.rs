//! Biometric hashing, matching, and quality gating.

use crate::data::{
    BiometricData, BiometricHash, BiometricMatch, Modality, QualityReport,
};
use crate::error::BiometricError;
use rand::rngs::OsRng;
use rand::RngCore;
use sha3::{Digest, Sha3_512};
use tenure_types::PartyId;

/// Hash algorithm identifier recorded on every stored hash.
const HASH_ALGORITHM: &str = "sha3-512";

/// Bytes of random salt drawn per sample.
const SALT_LEN: usize = 16;

/// Minimum scanner quality for a fingerprint capture.
const MIN_FINGERPRINT_QUALITY: f64 = 60.0;
/// Minimum detector confidence for a face capture.
const MIN_FACE_CONFIDENCE: f64 = 70.0;
/// Minimum duration for a voice capture, seconds.
const MIN_VOICE_DURATION_SECS: f64 = 3.0;
/// Maximum acceptable GPS accuracy radius, meters.
const MAX_LOCATION_ACCURACY_M: f64 = 100.0;

/// Confidence cap for fingerprint matches.
const FINGERPRINT_CONFIDENCE_CAP: f64 = 95.0;
/// Confidence scale and cap for face matches.
const FACE_CONFIDENCE_SCALE: f64 = 0.9;
const FACE_CONFIDENCE_CAP: f64 = 90.0;
/// Fixed confidence for voice matches.
const VOICE_CONFIDENCE: f64 = 85.0;

/// Hashes captures into their retained form and matches candidates against
/// stored hashes.
///
/// Matching is salted-hash equality: it binds a capture to a subject and
/// prevents cross-subject replay, but cannot tolerate sensor noise. A fuzzy
/// or commitment-based matching scheme is expected to replace the equality
/// comparison behind this same interface.
#[derive(Default)]
pub struct BiometricVerifier;

impl BiometricVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Reduce a capture to its retained salted hashes, one per present
    /// modality. Every sample gets a fresh random salt.
    pub fn process_biometric_data(
        &self,
        data: &BiometricData,
        subject_id: &PartyId,
    ) -> Result<Vec<BiometricHash>, BiometricError> {
        if !data.has_any_modality() {
            return Err(BiometricError::NoModalities);
        }

        let mut hashes = Vec::new();

        if let Some(fp) = &data.fingerprint {
            hashes.push(self.hash_sample(
                subject_id,
                Modality::Fingerprint,
                &fp.template,
                fp.quality,
            ));
        }
        if let Some(face) = &data.face {
            hashes.push(self.hash_sample(subject_id, Modality::Face, &face.image, face.confidence));
        }
        if let Some(voice) = &data.voice {
            hashes.push(self.hash_sample(
                subject_id,
                Modality::Voice,
                &voice.audio,
                voice.duration_secs,
            ));
        }

        Ok(hashes)
    }

    /// Match a candidate capture against stored hashes for the same subject.
    ///
    /// Recomputes each candidate modality under every stored salt and takes
    /// the highest-confidence exact match. Confidence is derived from the
    /// candidate's reported quality scores, not from biometric similarity.
    pub fn verify_biometric(
        &self,
        candidate: &BiometricData,
        stored: &[BiometricHash],
        subject_id: &PartyId,
    ) -> BiometricMatch {
        let mut best = BiometricMatch::no_match();

        for entry in stored {
            let (raw, confidence) = match entry.modality {
                Modality::Fingerprint => match &candidate.fingerprint {
                    Some(fp) => (
                        fp.template.as_slice(),
                        fp.quality.min(FINGERPRINT_CONFIDENCE_CAP),
                    ),
                    None => continue,
                },
                Modality::Face => match &candidate.face {
                    Some(face) => (
                        face.image.as_slice(),
                        (face.confidence * FACE_CONFIDENCE_SCALE).min(FACE_CONFIDENCE_CAP),
                    ),
                    None => continue,
                },
                Modality::Voice => match &candidate.voice {
                    Some(voice) => (voice.audio.as_slice(), VOICE_CONFIDENCE),
                    None => continue,
                },
            };

            let Ok(salt) = hex::decode(&entry.salt) else {
                continue;
            };
            let recomputed = digest_hex(subject_id, entry.modality, raw, &salt);

            if recomputed == entry.hash && confidence > best.confidence {
                best = BiometricMatch {
                    is_match: true,
                    confidence,
                    modality: Some(entry.modality),
                };
            }
        }

        best
    }

    /// Gate a capture on fixed quality thresholds.
    pub fn validate_biometric_quality(&self, data: &BiometricData) -> QualityReport {
        let mut issues = Vec::new();

        if !data.has_any_modality() {
            issues.push("no biometric modality present".to_string());
        }

        if let Some(fp) = &data.fingerprint {
            if fp.quality < MIN_FINGERPRINT_QUALITY {
                issues.push(format!(
                    "fingerprint quality {:.1} below minimum {MIN_FINGERPRINT_QUALITY}",
                    fp.quality
                ));
            }
        }
        if let Some(face) = &data.face {
            if face.confidence < MIN_FACE_CONFIDENCE {
                issues.push(format!(
                    "face confidence {:.1} below minimum {MIN_FACE_CONFIDENCE}",
                    face.confidence
                ));
            }
        }
        if let Some(voice) = &data.voice {
            if voice.duration_secs < MIN_VOICE_DURATION_SECS {
                issues.push(format!(
                    "voice duration {:.1}s below minimum {MIN_VOICE_DURATION_SECS}s",
                    voice.duration_secs
                ));
            }
        }
        if let Some(location) = &data.capture_location {
            if let Some(accuracy) = location.accuracy_m {
                if accuracy > MAX_LOCATION_ACCURACY_M {
                    issues.push(format!(
                        "capture location accuracy {accuracy:.0}m exceeds {MAX_LOCATION_ACCURACY_M}m"
                    ));
                }
            }
        }

        QualityReport {
            is_valid: issues.is_empty(),
            issues,
        }
    }

    fn hash_sample(
        &self,
        subject_id: &PartyId,
        modality: Modality,
        raw: &[u8],
        quality: f64,
    ) -> BiometricHash {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        BiometricHash {
            modality,
            hash: digest_hex(subject_id, modality, raw, &salt),
            salt: hex::encode(salt),
            algorithm: HASH_ALGORITHM.to_string(),
            quality,
        }
    }
}

/// `SHA3-512(subject_id || modality-tag || raw || salt)`, hex-encoded.
///
/// The subject id in the preimage binds the hash to one person: replaying
/// another subject's capture never matches.
fn digest_hex(subject_id: &PartyId, modality: Modality, raw: &[u8], salt: &[u8]) -> String {
    let mut hasher = Sha3_512::new();
    hasher.update(subject_id.as_str().as_bytes());
    hasher.update(modality.tag());
    hasher.update(raw);
    hasher.update(salt);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FaceSample, FingerprintSample, VoiceSample};
    use tenure_types::{GeoPoint, Timestamp};

    fn subject() -> PartyId {
        PartyId::new("party-owner-1")
    }

    fn full_capture() -> BiometricData {
        BiometricData {
            fingerprint: Some(FingerprintSample {
                template: vec![1, 2, 3, 4, 5],
                quality: 88.0,
            }),
            face: Some(FaceSample {
                image: vec![9, 9, 9],
                confidence: 92.0,
            }),
            voice: Some(VoiceSample {
                audio: vec![7; 64],
                duration_secs: 4.5,
                transcript: Some("I consent to this transfer".into()),
            }),
            capture_location: Some(GeoPoint::with_accuracy(5.6037, -0.1870, 12.0)),
            captured_at: Timestamp::new(1_756_250_000),
        }
    }

    #[test]
    fn processing_produces_one_hash_per_modality() {
        let verifier = BiometricVerifier::new();
        let hashes = verifier
            .process_biometric_data(&full_capture(), &subject())
            .unwrap();
        assert_eq!(hashes.len(), 3);
        assert!(hashes.iter().all(|h| h.algorithm == "sha3-512"));
        // 512-bit digest, hex.
        assert!(hashes.iter().all(|h| h.hash.len() == 128));
    }

    #[test]
    fn empty_capture_rejected() {
        let verifier = BiometricVerifier::new();
        let empty = BiometricData {
            fingerprint: None,
            face: None,
            voice: None,
            capture_location: None,
            captured_at: Timestamp::new(0),
        };
        assert!(matches!(
            verifier.process_biometric_data(&empty, &subject()),
            Err(BiometricError::NoModalities)
        ));
    }

    #[test]
    fn salts_are_fresh_per_sample_and_run() {
        let verifier = BiometricVerifier::new();
        let capture = full_capture();
        let first = verifier
            .process_biometric_data(&capture, &subject())
            .unwrap();
        let second = verifier
            .process_biometric_data(&capture, &subject())
            .unwrap();
        assert_ne!(first[0].salt, second[0].salt);
        assert_ne!(first[0].hash, second[0].hash);
    }

    #[test]
    fn same_capture_matches_stored_hashes() {
        let verifier = BiometricVerifier::new();
        let capture = full_capture();
        let stored = verifier
            .process_biometric_data(&capture, &subject())
            .unwrap();

        let result = verifier.verify_biometric(&capture, &stored, &subject());
        assert!(result.is_match);
        // Fingerprint 88.0 beats face 92*0.9=82.8 and voice 85.0.
        assert_eq!(result.modality, Some(Modality::Fingerprint));
        assert!((result.confidence - 88.0).abs() < 1e-9);
    }

    #[test]
    fn confidence_caps_apply() {
        let verifier = BiometricVerifier::new();
        let mut capture = full_capture();
        capture.fingerprint.as_mut().unwrap().quality = 99.0;
        capture.face = None;
        capture.voice = None;

        let stored = verifier
            .process_biometric_data(&capture, &subject())
            .unwrap();
        let result = verifier.verify_biometric(&capture, &stored, &subject());
        assert!(result.is_match);
        assert!((result.confidence - 95.0).abs() < 1e-9);
    }

    #[test]
    fn different_subject_never_matches() {
        let verifier = BiometricVerifier::new();
        let capture = full_capture();
        let stored = verifier
            .process_biometric_data(&capture, &subject())
            .unwrap();

        let imposter = PartyId::new("party-imposter");
        let result = verifier.verify_biometric(&capture, &stored, &imposter);
        assert!(!result.is_match);
        assert_eq!(result.modality, None);
    }

    #[test]
    fn altered_sample_never_matches() {
        let verifier = BiometricVerifier::new();
        let capture = full_capture();
        let stored = verifier
            .process_biometric_data(&capture, &subject())
            .unwrap();

        let mut altered = capture.clone();
        altered.fingerprint.as_mut().unwrap().template[0] ^= 0xFF;
        altered.face.as_mut().unwrap().image[0] ^= 0xFF;
        altered.voice.as_mut().unwrap().audio[0] ^= 0xFF;

        let result = verifier.verify_biometric(&altered, &stored, &subject());
        assert!(!result.is_match);
    }

    #[test]
    fn quality_gate_passes_good_capture() {
        let verifier = BiometricVerifier::new();
        let report = verifier.validate_biometric_quality(&full_capture());
        assert!(report.is_valid, "issues: {:?}", report.issues);
    }

    #[test]
    fn quality_gate_flags_each_threshold() {
        let verifier = BiometricVerifier::new();
        let mut capture = full_capture();
        capture.fingerprint.as_mut().unwrap().quality = 30.0;
        capture.face.as_mut().unwrap().confidence = 50.0;
        capture.voice.as_mut().unwrap().duration_secs = 1.0;
        capture.capture_location = Some(GeoPoint::with_accuracy(5.6, -0.18, 500.0));

        let report = verifier.validate_biometric_quality(&capture);
        assert!(!report.is_valid);
        assert_eq!(report.issues.len(), 4);
    }

    #[test]
    fn quality_gate_requires_some_modality() {
        let verifier = BiometricVerifier::new();
        let empty = BiometricData {
            fingerprint: None,
            face: None,
            voice: None,
            capture_location: None,
            captured_at: Timestamp::new(0),
        };
        let report = verifier.validate_biometric_quality(&empty);
        assert!(!report.is_valid);
        assert_eq!(report.issues.len(), 1);
    }
}

//! Anti-spoofing liveness heuristics.

use crate::data::{BiometricData, LivenessResult};

/// Score threshold above which a capture is considered live.
const LIVENESS_THRESHOLD: f64 = 70.0;

/// Points awarded when fingerprint quality clears the liveness bar.
const FINGERPRINT_LIVE_POINTS: f64 = 85.0;
/// Fingerprint quality above this suggests a real finger on the scanner.
const FINGERPRINT_LIVE_QUALITY: f64 = 80.0;

/// Points awarded when face confidence clears the liveness bar.
const FACE_LIVE_POINTS: f64 = 80.0;
const FACE_LIVE_CONFIDENCE: f64 = 85.0;

/// Points awarded when the voice sample carries a transcript
/// (the subject spoke the challenge phrase).
const VOICE_LIVE_POINTS: f64 = 90.0;

/// Flat bonus when the capture device reported a location.
const LOCATION_BONUS: f64 = 10.0;

/// Scores how likely a capture came from a live subject rather than a
/// replayed or fabricated sample.
///
/// Purely heuristic over capture metadata, no signal processing.
#[derive(Default)]
pub struct AntiSpoofingChecker;

impl AntiSpoofingChecker {
    pub fn new() -> Self {
        Self
    }

    /// Average the per-modality heuristic scores over the modalities present,
    /// add a flat location bonus, and compare against the liveness threshold.
    pub fn check_liveness(&self, data: &BiometricData) -> LivenessResult {
        let mut scores = Vec::new();

        if let Some(fp) = &data.fingerprint {
            let points = if fp.quality > FINGERPRINT_LIVE_QUALITY {
                FINGERPRINT_LIVE_POINTS
            } else {
                0.0
            };
            scores.push(points);
        }
        if let Some(face) = &data.face {
            let points = if face.confidence > FACE_LIVE_CONFIDENCE {
                FACE_LIVE_POINTS
            } else {
                0.0
            };
            scores.push(points);
        }
        if let Some(voice) = &data.voice {
            let points = if voice.transcript.is_some() {
                VOICE_LIVE_POINTS
            } else {
                0.0
            };
            scores.push(points);
        }

        if scores.is_empty() {
            return LivenessResult {
                is_live: false,
                confidence: 0.0,
            };
        }

        let mut confidence = scores.iter().sum::<f64>() / scores.len() as f64;
        if data.capture_location.is_some() {
            confidence += LOCATION_BONUS;
        }

        LivenessResult {
            is_live: confidence > LIVENESS_THRESHOLD,
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FaceSample, FingerprintSample, VoiceSample};
    use tenure_types::{GeoPoint, Timestamp};

    fn capture(
        fingerprint: Option<FingerprintSample>,
        face: Option<FaceSample>,
        voice: Option<VoiceSample>,
        located: bool,
    ) -> BiometricData {
        BiometricData {
            fingerprint,
            face,
            voice,
            capture_location: located.then(|| GeoPoint::new(5.6, -0.18)),
            captured_at: Timestamp::new(0),
        }
    }

    #[test]
    fn strong_multimodal_capture_is_live() {
        let data = capture(
            Some(FingerprintSample {
                template: vec![1],
                quality: 90.0,
            }),
            Some(FaceSample {
                image: vec![2],
                confidence: 95.0,
            }),
            Some(VoiceSample {
                audio: vec![3],
                duration_secs: 5.0,
                transcript: Some("challenge phrase".into()),
            }),
            true,
        );
        let result = AntiSpoofingChecker::new().check_liveness(&data);
        // (85 + 80 + 90) / 3 + 10 = 95
        assert!(result.is_live);
        assert!((result.confidence - 95.0).abs() < 1e-9);
    }

    #[test]
    fn weak_single_modality_is_not_live() {
        let data = capture(
            Some(FingerprintSample {
                template: vec![1],
                quality: 60.0,
            }),
            None,
            None,
            false,
        );
        let result = AntiSpoofingChecker::new().check_liveness(&data);
        assert!(!result.is_live);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn location_bonus_can_tip_the_threshold() {
        // Voice without transcript scores 0; fingerprint at 90 scores 85.
        // Average (85 + 0) / 2 = 42.5; location makes it 52.5, still not live.
        let data = capture(
            Some(FingerprintSample {
                template: vec![1],
                quality: 90.0,
            }),
            None,
            Some(VoiceSample {
                audio: vec![3],
                duration_secs: 5.0,
                transcript: None,
            }),
            true,
        );
        let result = AntiSpoofingChecker::new().check_liveness(&data);
        assert!(!result.is_live);

        // Single good fingerprint alone averages 85; 85 > 70 → live even
        // without the bonus, and 95 with it.
        let data = capture(
            Some(FingerprintSample {
                template: vec![1],
                quality: 90.0,
            }),
            None,
            None,
            true,
        );
        let result = AntiSpoofingChecker::new().check_liveness(&data);
        assert!(result.is_live);
        assert!((result.confidence - 95.0).abs() < 1e-9);
    }

    #[test]
    fn empty_capture_scores_zero() {
        let data = capture(None, None, None, true);
        let result = AntiSpoofingChecker::new().check_liveness(&data);
        assert!(!result.is_live);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn borderline_scores_are_not_live() {
        // Face at exactly the liveness bar contributes 0.
        let data = capture(
            None,
            Some(FaceSample {
                image: vec![2],
                confidence: 85.0,
            }),
            None,
            false,
        );
        let result = AntiSpoofingChecker::new().check_liveness(&data);
        assert!(!result.is_live);
    }
}

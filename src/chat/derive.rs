//! Text -> toot parameters. Depends only on the character count and on
//! whether any vowel is present.

use crate::toot::TootParams;

/// Derive base parameters for the toot that answers `text`.
///
/// - wetness: `len / 24`, plus 0.1 when the text has a vowel, capped at 1
/// - pitch: `55 + len mod 30` Hz
/// - duration: `0.9 + (len mod 5) * 0.1` s
/// - vibrato depth: `5 + 10 * wetness` Hz
pub fn derive_params(text: &str) -> TootParams {
    let len = text.chars().count();
    let vowel_bonus = if has_vowel(text) { 0.1 } else { 0.0 };
    let wet = (len as f64 / 24.0 + vowel_bonus).min(1.0);

    TootParams::new()
        .with_wet(wet)
        .with_pitch(55.0 + (len % 30) as f64)
        .with_duration(0.9 + (len % 5) as f64 * 0.1)
        .with_vibrato_depth(5.0 + wet * 10.0)
}

fn has_vowel(text: &str) -> bool {
    text.chars()
        .any(|c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-12)
    }

    #[test]
    fn launch() {
        let p = derive_params("launch");
        assert!(close(p.wet, 6.0 / 24.0 + 0.1));
        assert!(close(p.pitch, 61.0));
        assert!(close(p.duration, 1.0));
        assert!(close(p.vibrato_depth, 5.0 + (6.0 / 24.0 + 0.1) * 10.0));
        assert_eq!(p.volume, None);
        assert_eq!(p.vibrato, None);
    }

    #[test]
    fn no_vowel_no_bonus() {
        let p = derive_params("shh");
        assert!(close(p.wet, 3.0 / 24.0));
    }

    #[test]
    fn vowels_case_insensitive() {
        assert_eq!(derive_params("PFFT"), derive_params("pfft"));
        assert!(close(derive_params("BOOM").wet, 4.0 / 24.0 + 0.1));
    }

    #[test]
    fn wetness_caps_at_one() {
        let long = "a".repeat(40);
        assert!(close(derive_params(&long).wet, 1.0));
    }

    #[test]
    fn pitch_and_duration_wrap() {
        let p = derive_params(&"x".repeat(30));
        assert!(close(p.pitch, 55.0));
        assert!(close(p.duration, 0.9));
    }

    #[test]
    fn same_length_and_vowels_same_params() {
        assert_eq!(derive_params("hello"), derive_params("world"));
        assert_ne!(derive_params("hello"), derive_params("hmmmm"));
    }
}

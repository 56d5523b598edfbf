//! Macro nutrition calculator
//!
//! Splits a daily calorie budget into grams of protein, fat and carbohydrate:
//!
//! - protein: 1 g per unit of body weight
//! - fat: 25% of total calories, at 9 kcal/g
//! - carbs: whatever calories remain, at 4 kcal/g
//!
//! For 2420 kcal and a body weight of 135 this gives 135 g protein,
//! 67.2 g fat and 318.75 g carbs, spoken as
//! "135 grams of protein, 318 grams of carbs, and 67 grams of fat".
//! Spoken values are truncated toward zero, not rounded.

use crate::protocol::{build_speechlet_response, Intent, SpeechletResponse};

pub const TOTAL_CALORIES_SLOT: &str = "totalCalories";
pub const BODY_WEIGHT_SLOT: &str = "bodyWeight";

/// Share of calories that come from fat
pub const FAT_FRACTION: f64 = 0.25;
pub const CALORIES_PER_GRAM_FAT: f64 = 9.0;
pub const CALORIES_PER_GRAM_PROTEIN: f64 = 4.0;
pub const CALORIES_PER_GRAM_CARBS: f64 = 4.0;

// Double space before "are" is part of the shipped prompt.
pub const FALLBACK_SPEECH: &str =
    "I'm not sure what your body weight and total calories  are. Please try again.";

pub const FALLBACK_REPROMPT: &str = "I'm not sure what your body weight and total calories  are. \
    You can tell me your body weight and total calories by saying, \
    get macros for 140 calories and 2500 calories.";

/// Daily macronutrient targets in grams
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacroBreakdown {
    pub protein_grams: f64,
    pub carbs_grams: f64,
    pub fat_grams: f64,
}

impl MacroBreakdown {
    /// Apply the fixed split to a calorie budget and body weight
    pub fn calculate(total_calories: f64, body_weight: f64) -> Self {
        let protein_grams = body_weight;
        let fat_grams = total_calories * FAT_FRACTION / CALORIES_PER_GRAM_FAT;
        let carbs_grams = (total_calories
            - protein_grams * CALORIES_PER_GRAM_PROTEIN
            - fat_grams * CALORIES_PER_GRAM_FAT)
            / CALORIES_PER_GRAM_CARBS;

        Self {
            protein_grams,
            carbs_grams,
            fat_grams,
        }
    }

    /// Spoken sentence with every amount truncated toward zero
    pub fn render(&self) -> String {
        format!(
            "{} grams of protein, {} grams of carbs, and {} grams of fat",
            truncate_grams(self.protein_grams),
            truncate_grams(self.carbs_grams),
            truncate_grams(self.fat_grams)
        )
    }
}

/// Whole grams, dropping the fraction (67.9 becomes "67", -3.5 becomes "-3")
///
/// Formatted from the float so amounts beyond `i64` keep every digit.
fn truncate_grams(grams: f64) -> String {
    // Adding 0.0 turns -0 into 0
    format!("{:.0}", grams.trunc() + 0.0)
}

/// Parse a numeric slot; absent, unfilled, unparseable or non-finite values yield `None`
fn numeric_slot(intent: &Intent, name: &str) -> Option<f64> {
    intent
        .slot_value(name)
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

/// Breakdown for an intent, or `None` when either input slot is unusable
pub fn breakdown_for(intent: &Intent) -> Option<MacroBreakdown> {
    let total_calories = numeric_slot(intent, TOTAL_CALORIES_SLOT)?;
    let body_weight = numeric_slot(intent, BODY_WEIGHT_SLOT)?;
    Some(MacroBreakdown::calculate(total_calories, body_weight))
}

/// Speechlet for a computed breakdown, or the reprompt when there is none
///
/// The session stays open either way and the card is titled with the intent name.
pub fn macro_response(intent_name: &str, breakdown: Option<&MacroBreakdown>) -> SpeechletResponse {
    match breakdown {
        Some(breakdown) => build_speechlet_response(intent_name, &breakdown.render(), "", false),
        None => build_speechlet_response(intent_name, FALLBACK_SPEECH, FALLBACK_REPROMPT, false),
    }
}

/// Answer a macro nutrition intent; never fails
pub fn get_macros(intent: &Intent) -> SpeechletResponse {
    macro_response(&intent.name, breakdown_for(intent).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const INTENT_NAME: &str = "getMacroNutritionIntent";

    fn macro_intent(total_calories: &str, body_weight: &str) -> Intent {
        Intent::new(INTENT_NAME)
            .with_slot(TOTAL_CALORIES_SLOT, total_calories)
            .with_slot(BODY_WEIGHT_SLOT, body_weight)
    }

    #[test]
    fn test_reference_example() {
        let breakdown = MacroBreakdown::calculate(2420.0, 135.0);

        assert_eq!(breakdown.protein_grams, 135.0);
        assert!((breakdown.fat_grams - 67.2222).abs() < 1e-3);
        assert!((breakdown.carbs_grams - 318.75).abs() < 1e-3);
        assert_eq!(
            breakdown.render(),
            "135 grams of protein, 318 grams of carbs, and 67 grams of fat"
        );
    }

    #[test]
    fn test_get_macros_success() {
        let response = get_macros(&macro_intent("2420", "135"));

        assert_eq!(
            response.output_speech_text,
            "135 grams of protein, 318 grams of carbs, and 67 grams of fat"
        );
        assert_eq!(response.card_title, INTENT_NAME);
        assert_eq!(response.reprompt_text, "");
        assert!(!response.should_end_session);
    }

    #[test]
    fn test_truncation_not_rounding() {
        // 2444.4 kcal gives 67.9 g fat
        let breakdown = MacroBreakdown::calculate(2444.4, 100.0);
        assert!(breakdown.fat_grams > 67.8 && breakdown.fat_grams < 68.0);
        assert!(breakdown.render().ends_with("and 67 grams of fat"));
    }

    #[test]
    fn test_negative_carbs_truncate_toward_zero() {
        // 400 kcal of protein alone exceeds the budget
        let breakdown = MacroBreakdown::calculate(300.0, 100.0);
        assert!(breakdown.carbs_grams < 0.0);
        assert_eq!(truncate_grams(-3.5), "-3");
        assert_eq!(truncate_grams(-0.5), "0");
        // (300 - 400 - 75) / 4 = -43.75
        assert_eq!(
            breakdown.render(),
            "100 grams of protein, -43 grams of carbs, and 8 grams of fat"
        );
    }

    #[test]
    fn test_amounts_beyond_i64_keep_all_digits() {
        let response = get_macros(&macro_intent("100000000000000000000", "1e19"));
        assert!(
            response
                .output_speech_text
                .starts_with("10000000000000000000 grams of protein,"),
            "{}",
            response.output_speech_text
        );
        assert!(!response.output_speech_text.contains("9223372036854775807"));
    }

    #[test]
    fn test_fractional_slot_values() {
        let response = get_macros(&macro_intent("2000.5", "150.9"));
        assert!(response
            .output_speech_text
            .starts_with("150 grams of protein"));
    }

    #[test]
    fn test_whitespace_around_slot_value() {
        let response = get_macros(&macro_intent(" 2420 ", "135\n"));
        assert_eq!(
            response.output_speech_text,
            "135 grams of protein, 318 grams of carbs, and 67 grams of fat"
        );
    }

    #[test]
    fn test_missing_slot_falls_back() {
        let only_weight = Intent::new(INTENT_NAME).with_slot(BODY_WEIGHT_SLOT, "135");
        let only_calories = Intent::new(INTENT_NAME).with_slot(TOTAL_CALORIES_SLOT, "2420");
        let neither = Intent::new(INTENT_NAME);

        for intent in [only_weight, only_calories, neither] {
            let response = get_macros(&intent);
            assert_eq!(response.output_speech_text, FALLBACK_SPEECH);
            assert_eq!(response.reprompt_text, FALLBACK_REPROMPT);
            assert_eq!(response.card_title, INTENT_NAME);
            assert!(!response.should_end_session);
        }
    }

    #[test]
    fn test_unfilled_slot_falls_back() {
        let mut intent = macro_intent("2420", "135");
        intent.slots.get_mut(BODY_WEIGHT_SLOT).unwrap().value = None;

        assert!(breakdown_for(&intent).is_none());
        assert_eq!(get_macros(&intent).output_speech_text, FALLBACK_SPEECH);
    }

    #[test]
    fn test_malformed_slot_falls_back() {
        for (calories, weight) in [
            ("two thousand", "135"),
            ("2420", "?"),
            ("", "135"),
            ("NaN", "135"),
            ("2420", "inf"),
        ] {
            let response = get_macros(&macro_intent(calories, weight));
            assert_eq!(
                response.output_speech_text, FALLBACK_SPEECH,
                "calories={calories:?} weight={weight:?}"
            );
        }
    }

    #[test]
    fn test_fallback_texts() {
        assert_eq!(
            FALLBACK_REPROMPT,
            "I'm not sure what your body weight and total calories  are. You can tell me \
             your body weight and total calories by saying, get macros for 140 calories \
             and 2500 calories."
        );
    }

    #[test]
    fn test_get_macros_is_idempotent() {
        let intent = macro_intent("1800", "160");
        assert_eq!(get_macros(&intent), get_macros(&intent));
    }

    proptest! {
        #[test]
        fn prop_protein_equals_body_weight(
            total in 0u64..10_000,
            weight in prop_oneof![0u64..1_000, 1_000_000_000_000u64..(1u64 << 53)],
        ) {
            let intent = macro_intent(&total.to_string(), &weight.to_string());
            let breakdown = breakdown_for(&intent).unwrap();
            prop_assert_eq!(breakdown.protein_grams, weight as f64);

            let response = get_macros(&intent);
            let expected_prefix = format!("{weight} grams of protein,");
            prop_assert!(response.output_speech_text.starts_with(&expected_prefix));
        }

        #[test]
        fn prop_calories_are_conserved(
            total in 0.0f64..10_000.0,
            weight in 0.0f64..1_000.0,
        ) {
            let b = MacroBreakdown::calculate(total, weight);
            let recombined = b.protein_grams * CALORIES_PER_GRAM_PROTEIN
                + b.carbs_grams * CALORIES_PER_GRAM_CARBS
                + b.fat_grams * CALORIES_PER_GRAM_FAT;
            prop_assert!((recombined - total).abs() < 1e-6);
        }

        #[test]
        fn prop_session_stays_open(calories in ".*", weight in ".*") {
            let response = get_macros(&macro_intent(&calories, &weight));
            prop_assert!(!response.should_end_session);
            prop_assert_eq!(response.card_title, INTENT_NAME);
        }
    }
}

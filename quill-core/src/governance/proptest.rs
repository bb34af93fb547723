//! Property-based tests for the governance classifiers and claim scoring.
//!
//! - Redaction reaches a fixed point (sanitize is idempotent)
//! - Card-shaped tokens are always flagged as high-severity personal info
//! - Balance score stays in [0, 1] and hits its documented anchor values
//! - Verdicts are monotonic in confidence

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::governance::{BiasClassifier, SafetyCategory, SafetyClassifier, Severity};
    use crate::search::SearchResult;
    use crate::skills::{extract_claims, FactCheckResult, Verdict, MAX_CLAIMS};

    // Text biased towards the characters the redaction patterns care about.
    fn pii_like_text() -> impl Strategy<Value = String> {
        proptest::collection::vec(
            prop_oneof![
                "[0-9]{1,16}",
                "[a-z]{1,6}",
                Just("@".to_string()),
                Just(".".to_string()),
                Just("-".to_string()),
                Just(" ".to_string()),
                Just("com".to_string()),
            ],
            0..24,
        )
        .prop_map(|parts| parts.concat())
    }

    fn words() -> impl Strategy<Value = String> {
        proptest::collection::vec("[a-z]{1,8}", 0..12).prop_map(|w| w.join(" "))
    }

    fn verdict_rank(v: Verdict) -> u8 {
        match v {
            Verdict::Unverified => 0,
            Verdict::Disputed => 1,
            Verdict::PartiallyVerified => 2,
            Verdict::Verified => 3,
        }
    }

    // =========================================================================
    // Safety
    // =========================================================================

    proptest! {
        #[test]
        fn sanitize_is_idempotent(text in pii_like_text()) {
            let classifier = SafetyClassifier::new();
            let once = classifier.sanitize(&text);
            let twice = classifier.sanitize(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn card_token_is_high_personal_info(
            prefix in words(),
            card in "[0-9]{16}",
            suffix in words(),
        ) {
            let text = format!("{} {} {}", prefix, card, suffix);
            let assessment = SafetyClassifier::new().classify(&text);

            prop_assert!(!assessment.is_safe);
            let flagged = assessment.violations.iter().any(|v| {
                v.category == SafetyCategory::PersonalInfo
                    && v.severity == Severity::High
                    && v.flagged_span == card
            });
            prop_assert!(flagged, "card token not flagged as high personal_info");
        }

        #[test]
        fn is_safe_iff_no_blocking_violation(text in words()) {
            let assessment = SafetyClassifier::new().classify(&text);
            let blocking = assessment.violations.iter().any(|v| v.severity.is_blocking());
            prop_assert_eq!(assessment.is_safe, !blocking);
        }
    }

    // =========================================================================
    // Representation
    // =========================================================================

    proptest! {
        #[test]
        fn balance_score_in_unit_interval(
            male in 0usize..20,
            female in 0usize..20,
            neutral in 0usize..20,
        ) {
            let text = [
                vec!["he"; male],
                vec!["she"; female],
                vec!["they"; neutral],
            ]
            .concat()
            .join(" ");
            let metrics = BiasClassifier::new().representation(&text);

            prop_assert_eq!(metrics.male_pronouns, male);
            prop_assert_eq!(metrics.female_pronouns, female);
            prop_assert_eq!(metrics.neutral_pronouns, neutral);
            prop_assert!((0.0..=1.0).contains(&metrics.balance_score));

            let total = male + female + neutral;
            if total == 0 {
                prop_assert_eq!(metrics.balance_score, 0.0);
            } else if neutral == total {
                prop_assert_eq!(metrics.balance_score, 1.0);
            } else {
                prop_assert!(metrics.balance_score < 1.0);
            }
        }

        #[test]
        fn even_gender_split_scores_parity_weight(n in 1usize..30) {
            let text = [vec!["his"; n], vec!["her"; n]].concat().join(" ");
            let metrics = BiasClassifier::new().representation(&text);
            prop_assert!((metrics.balance_score - 0.3).abs() < 1e-9);
        }
    }

    // =========================================================================
    // Claim verification
    // =========================================================================

    proptest! {
        #[test]
        fn verdict_is_monotonic_in_confidence(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                verdict_rank(Verdict::from_confidence(lo)) <= verdict_rank(Verdict::from_confidence(hi))
            );
        }

        #[test]
        fn confidence_tracks_matching_fraction(total in 1usize..8, matching in 0usize..8) {
            let matching = matching.min(total);
            let results: Vec<SearchResult> = (0..total)
                .map(|i| {
                    let snippet = if i < matching { "tides rise" } else { "nothing here" };
                    SearchResult::new("t", format!("https://{}.example", i), snippet)
                })
                .collect();

            let r = FactCheckResult::from_results("tides are caused by gravity", &results);
            prop_assert!((r.confidence - matching as f64 / total as f64).abs() < 1e-12);
            if r.confidence == 0.0 {
                prop_assert_ne!(r.verdict, Verdict::Verified);
            }
            prop_assert_eq!(r.supporting_sources.len(), total);
        }

        #[test]
        fn extracted_claims_are_bounded(text in "[a-z .]{0,400}") {
            let claims = extract_claims(&text);
            prop_assert!(claims.len() <= MAX_CLAIMS);
            for claim in claims {
                prop_assert!(claim.split_whitespace().count() > 5);
            }
        }
    }
}

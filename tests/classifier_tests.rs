//! Classifier tests using rstest parameterized tests
//!
//! Test categories:
//! - One case per rule, in priority order
//! - Precedence between rules that match the same notation
//! - Notations that yield no canonical ID

use ferro_varload::clinvar::{classify_notation, ClassifyError, MutationKind, RULES};
use rstest::rstest;

// =============================================================================
// Rule table
// =============================================================================

#[test]
fn test_rule_table_order() {
    let kinds: Vec<_> = RULES.iter().map(|rule| rule.kind).collect();
    assert_eq!(
        kinds,
        vec![
            MutationKind::Substitution,
            MutationKind::Insertion,
            MutationKind::Deletion,
            MutationKind::Indel,
            MutationKind::Duplication,
            MutationKind::Inversion,
            MutationKind::Replacement,
        ]
    );
}

// =============================================================================
// Classifiable notations
// =============================================================================

#[rstest]
// Substitutions, including ambiguity codes
#[case("NM_000000.1:c.123A>G", "single nucleotide variant", "1", "1000", "1000", MutationKind::Substitution, "chr1:g.1000A>G")]
#[case("NM_007294.3:c.5266C>T", "single nucleotide variant", "17", "41209079", "41209079", MutationKind::Substitution, "chr17:g.41209079C>T")]
#[case("NM_000000.1:c.10R>Y", "single nucleotide variant", "X", "77", "77", MutationKind::Substitution, "chrX:g.77R>Y")]
#[case("NM_000000.1:c.10_11delinsAT>GC", "indel", "2", "5", "6", MutationKind::Substitution, "chr2:g.5AT>GC")]
// Insertions by sequence and by length
#[case("NM_000000.1:c.100_101insAT", "insertion", "7", "200", "201", MutationKind::Insertion, "chr7:g.200_201insAT")]
#[case("NM_000000.1:c.100_101ins12", "insertion", "7", "200", "201", MutationKind::Insertion, "chr7:g.200_201ins12")]
#[case("NM_000000.1:c.100_102delinsTT", "indel", "4", "50", "52", MutationKind::Insertion, "chr4:g.50_52insTT")]
// Deletions depend on the type column
#[case("NM_000000.1:c.10_20del", "deletion", "2", "500", "510", MutationKind::Deletion, "chr2:g.500_510del")]
#[case("NM_000000.1:c.10_20delGATTACA", "deletion", "2", "500", "510", MutationKind::Deletion, "chr2:g.500_510del")]
// Duplications take the trailing base or digit run
#[case("NM_000000.1:c.100_101dupAT", "duplication", "3", "200", "210", MutationKind::Duplication, "chr3:g.200_210dupAT")]
#[case("NM_000000.1:c.100_101dup", "duplication", "3", "200", "210", MutationKind::Duplication, "chr3:g.200_210dup101")]
// Inversions keep the token
#[case("NM_000000.1:c.100_110inv", "inversion", "5", "10", "20", MutationKind::Inversion, "chr5:g.10_20inv")]
#[case("NM_000000.1:c.100_110inv11", "inversion", "5", "10", "20", MutationKind::Inversion, "chr5:g.10_20inv11")]
// Fallback replacement
#[case("NM_000000.1:c.100_102=", "single nucleotide variant", "6", "10", "12", MutationKind::Replacement, "chr6:g.10_12=")]
#[case("NM_000000.1:c.(100_102)CAG[14]", "microsatellite", "6", "10", "12", MutationKind::Replacement, "chr6:g.10_12CAG")]
fn test_classify(
    #[case] coding: &str,
    #[case] variant_type: &str,
    #[case] chrom: &str,
    #[case] start: &str,
    #[case] end: &str,
    #[case] kind: MutationKind,
    #[case] expected_id: &str,
) {
    let variant = classify_notation(coding, variant_type, chrom, start, end)
        .unwrap_or_else(|e| panic!("{} should classify: {}", coding, e));
    assert_eq!(variant.kind, kind, "kind for {}", coding);
    assert_eq!(variant.canonical_id().as_str(), expected_id);
}

// =============================================================================
// Unclassifiable notations
// =============================================================================

#[rstest]
#[case("c.123A>G", "single nucleotide variant")]
#[case("NM_000000.1:c.10_12del", "indel")]
#[case("NM_000000.1:c.100_102del", "copy number loss")]
#[case("NM_000000.1:c.-5_-3del", "deletion ")]
fn test_unclassifiable(#[case] coding: &str, #[case] variant_type: &str) {
    assert!(
        classify_notation(coding, variant_type, "1", "1", "3").is_err(),
        "{} should not classify",
        coding
    );
}

#[test]
fn test_indel_without_insertion_reports_reason() {
    let err = classify_notation("NM_000000.1:c.10_12del", "indel", "1", "1", "3").unwrap_err();
    assert_eq!(
        err,
        ClassifyError::IndelWithoutInsertion {
            notation: "c.10_12del".to_string()
        }
    );
}

#[test]
fn test_classification_is_deterministic() {
    let first = classify_notation("NM_000000.1:c.100_101dupAT", "duplication", "3", "200", "210");
    let second = classify_notation("NM_000000.1:c.100_101dupAT", "duplication", "3", "200", "210");
    assert_eq!(first, second);
}

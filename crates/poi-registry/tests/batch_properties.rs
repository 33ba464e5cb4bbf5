//! # Batch Atomicity and Index Consistency Properties
//!
//! Property tests over arbitrary batches and grant sequences.

use std::collections::HashSet;

use poi_core::{ApplicationId, ErrorKind, PrincipalId};
use poi_registry::{ProofOfIntegrity, RegistryConfig};
use proptest::prelude::*;

fn principal(byte: u8) -> PrincipalId {
    PrincipalId::from_bytes([byte; 20])
}

const GOV: u8 = 0xff;

fn make_registry() -> ProofOfIntegrity {
    ProofOfIntegrity::new(RegistryConfig {
        governor: principal(GOV),
    })
}

fn register_certifiers(registry: &ProofOfIntegrity, bytes: &[u8]) -> Result<usize, poi_core::RegistryError> {
    let principals: Vec<PrincipalId> = bytes.iter().copied().map(principal).collect();
    let names: Vec<String> = bytes.iter().map(|b| format!("N{b}")).collect();
    let ids: Vec<u64> = bytes.iter().map(|&b| u64::from(b)).collect();
    registry.add_certifiers(principal(GOV), &names, &names, &ids, &principals)
}

proptest! {
    /// A batch either commits every row or leaves the table untouched.
    #[test]
    fn batch_is_all_or_nothing(
        existing in proptest::collection::hash_set(0u8..32, 0..6),
        batch in proptest::collection::vec(0u8..32, 0..12),
    ) {
        let registry = make_registry();
        let existing: Vec<u8> = existing.into_iter().collect();
        register_certifiers(&registry, &existing).unwrap();
        let before = registry.get_certifiers_accounts();

        let mut seen: HashSet<u8> = existing.iter().copied().collect();
        let expect_ok = batch.iter().all(|b| seen.insert(*b));

        match register_certifiers(&registry, &batch) {
            Ok(count) => {
                prop_assert!(expect_ok);
                prop_assert_eq!(count, batch.len());
                let mut expected = before.clone();
                expected.extend(batch.iter().copied().map(principal));
                prop_assert_eq!(registry.get_certifiers_accounts(), expected);
            }
            Err(err) => {
                prop_assert!(!expect_ok);
                prop_assert_eq!(err.kind(), ErrorKind::DuplicatePrincipal);
                prop_assert!(err.batch_row().is_some());
                prop_assert_eq!(registry.get_certifiers_accounts(), before);
            }
        }
    }

    /// Derived indices always agree with the grant table.
    #[test]
    fn indices_match_grant_table(
        grants in proptest::collection::vec((0u8..4, 0u8..5, 0u64..24), 0..40),
    ) {
        let registry = make_registry();
        let gov = principal(GOV);
        // Certifiers 0..3 and applicants 0..4 exist; index 3 / 4 are unknown.
        register_certifiers(&registry, &[0x10, 0x11, 0x12]).unwrap();
        registry
            .add_approved_applicants(
                gov,
                &["a", "b", "c", "d"],
                &["a", "b", "c", "d"],
                &[1, 2, 3, 4],
                &[principal(0x20), principal(0x21), principal(0x22), principal(0x23)],
            )
            .unwrap();

        for (c, a, id) in &grants {
            let _ = registry.add_granted_application(
                gov,
                principal(0x10 + c),
                principal(0x20 + a),
                ApplicationId::new(*id),
            );
        }

        let all = registry.get_granted_application_ids();
        let unique: HashSet<ApplicationId> = all.iter().copied().collect();
        prop_assert_eq!(unique.len(), all.len());
        prop_assert_eq!(all.len(), registry.application_count());

        let mut indexed = 0;
        for c in 0x10..0x14u8 {
            let expected: Vec<ApplicationId> = all
                .iter()
                .copied()
                .filter(|id| registry.get_granted_application(*id).unwrap().certifier() == principal(c))
                .collect();
            let actual = registry.get_certifier_application_ids(principal(c));
            indexed += actual.len();
            prop_assert_eq!(actual, expected);
        }
        prop_assert_eq!(indexed, all.len());

        let mut indexed = 0;
        for a in 0x20..0x25u8 {
            let expected: Vec<ApplicationId> = all
                .iter()
                .copied()
                .filter(|id| registry.get_granted_application(*id).unwrap().applicant() == principal(a))
                .collect();
            let actual = registry.get_approved_applicant_application_ids(principal(a));
            indexed += actual.len();
            prop_assert_eq!(actual, expected);
        }
        prop_assert_eq!(indexed, all.len());
    }

    /// Any non-governor caller is refused without a state change.
    #[test]
    fn non_governor_refused(caller in 0u8..0xff, bytes in proptest::collection::vec(0u8..8, 1..4)) {
        let registry = make_registry();
        let principals: Vec<PrincipalId> = bytes.iter().copied().map(principal).collect();
        let ids: Vec<u64> = bytes.iter().map(|&b| u64::from(b)).collect();
        let names = vec!["x"; bytes.len()];
        let err = registry
            .add_approved_applicants(principal(caller), &names, &names, &ids, &principals)
            .unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Unauthorized);
        prop_assert_eq!(registry.applicant_count(), 0);
    }
}

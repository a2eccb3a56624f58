use crate::semantic::SemanticEq;

use k8s_openapi::api::core::v1::Toleration;

/// Operator assumed by the API server when a toleration leaves it unset.
pub const DEFAULT_TOLERATION_OPERATOR: &str = "Equal";

#[inline]
pub(crate) fn toleration_operator(toleration: &Toleration) -> &str {
    toleration
        .operator
        .as_deref()
        .filter(|op| !op.is_empty())
        .unwrap_or(DEFAULT_TOLERATION_OPERATOR)
}

/// Two tolerations occupy the same rule slot when they share key and operator,
/// whatever their value and effect.
pub fn matches_toleration(a: &Toleration, b: &Toleration) -> bool {
    a.key.as_deref().unwrap_or_default() == b.key.as_deref().unwrap_or_default()
        && toleration_operator(a) == toleration_operator(b)
}

/// Merge `desired` into `tolerations`, returning the new list and whether it changed.
///
/// If a matching toleration is already semantically equal to `desired`, the list is
/// returned untouched. Otherwise the first matching toleration is replaced in place, or
/// `desired` is appended when none matches. Every other entry keeps its position.
pub fn merge_toleration(
    tolerations: &[Toleration],
    desired: &Toleration,
) -> (Vec<Toleration>, bool) {
    if tolerations
        .iter()
        .any(|t| matches_toleration(t, desired) && t.semantic_eq(desired))
    {
        return (tolerations.to_vec(), false);
    }

    let mut merged = tolerations.to_vec();
    let position = merged.iter().position(|t| matches_toleration(t, desired));
    match position {
        Some(index) => merged[index] = desired.clone(),
        None => merged.push(desired.clone()),
    }
    (merged, true)
}

#[cfg(test)]
mod test {
    use super::{Toleration, matches_toleration, merge_toleration};

    use std::ops::Not;

    fn toleration(key: &str, operator: &str, value: &str, effect: &str) -> Toleration {
        Toleration {
            key: Some(key.to_string()),
            operator: Some(operator.to_string()),
            value: Some(value.to_string()),
            effect: Some(effect.to_string()),
            ..Toleration::default()
        }
    }

    fn desired() -> Toleration {
        toleration("dedicated", "Equal", "critical", "NoSchedule")
    }

    #[test]
    fn test_matches_on_key_and_operator() {
        assert!(matches_toleration(
            &desired(),
            &toleration("dedicated", "Equal", "other", "NoExecute")
        ));
        assert!(matches_toleration(&desired(), &toleration("dedicated", "Exists", "", "")).not());
        assert!(
            matches_toleration(
                &desired(),
                &toleration("gpu", "Equal", "critical", "NoSchedule")
            )
            .not()
        );
    }

    #[test]
    fn test_unset_operator_is_equal() {
        let implicit = Toleration {
            operator: None,
            ..desired()
        };
        assert!(matches_toleration(&desired(), &implicit));
    }

    #[test]
    fn test_merge_keeps_unset_operator_toleration() {
        let implicit = Toleration {
            operator: None,
            ..desired()
        };
        let (merged, changed) = merge_toleration(std::slice::from_ref(&implicit), &desired());
        assert!(changed.not());
        assert_eq!(merged, vec![implicit]);
    }

    #[test]
    fn test_merge_appends_to_empty_list() {
        let (merged, changed) = merge_toleration(&[], &desired());
        assert!(changed);
        assert_eq!(merged, vec![desired()]);
    }

    #[test]
    fn test_merge_appends_after_unrelated_tolerations() {
        let existing = vec![
            toleration("gpu", "Exists", "", "NoSchedule"),
            toleration("zone", "Equal", "a", "PreferNoSchedule"),
        ];
        let (merged, changed) = merge_toleration(&existing, &desired());
        assert!(changed);
        assert_eq!(merged.len(), existing.len() + 1);
        assert_eq!(merged[..2], existing[..]);
        assert_eq!(merged[2], desired());
    }

    #[test]
    fn test_merge_is_idempotent() {
        let existing = vec![toleration("gpu", "Exists", "", "NoSchedule"), desired()];
        let (merged, changed) = merge_toleration(&existing, &desired());
        assert!(changed.not());
        assert_eq!(merged, existing);

        let (again, changed) = merge_toleration(&merged, &desired());
        assert!(changed.not());
        assert_eq!(again, existing);
    }

    #[test]
    fn test_merge_replaces_in_place() {
        let existing = vec![
            toleration("gpu", "Exists", "", "NoSchedule"),
            toleration("dedicated", "Equal", "batch", "NoExecute"),
            toleration("zone", "Equal", "a", "PreferNoSchedule"),
        ];
        let (merged, changed) = merge_toleration(&existing, &desired());
        assert!(changed);
        assert_eq!(merged.len(), existing.len());
        assert_eq!(merged[0], existing[0]);
        assert_eq!(merged[1], desired());
        assert_eq!(merged[2], existing[2]);
    }

    #[test]
    fn test_merge_replaces_only_first_match() {
        let stale = toleration("dedicated", "Equal", "batch", "NoExecute");
        let existing = vec![stale.clone(), stale.clone()];
        let (merged, changed) = merge_toleration(&existing, &desired());
        assert!(changed);
        assert_eq!(merged, vec![desired(), stale]);
    }

    #[test]
    fn test_merge_drops_toleration_seconds_on_replace() {
        let existing = vec![Toleration {
            toleration_seconds: Some(300),
            ..desired()
        }];
        let (merged, changed) = merge_toleration(&existing, &desired());
        assert!(changed);
        assert_eq!(merged, vec![desired()]);
    }
}

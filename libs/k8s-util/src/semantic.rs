use crate::quantity::parse_quantity;
use crate::tolerations::toleration_operator;

use k8s_openapi::api::core::v1::Toleration;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, MicroTime, Time};

/// Equality over meaning rather than representation.
///
/// Decoding and re-encoding an object may change how some fields are written
/// without changing what they mean: quantities get a different suffix, timestamps
/// another offset, selectors another ordering. Comparing those fields with `==`
/// would report a change that never happened.
pub trait SemanticEq {
    fn semantic_eq(&self, other: &Self) -> bool;
}

macro_rules! impl_semantic_eq_by_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl SemanticEq for $t {
                #[inline]
                fn semantic_eq(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

impl_semantic_eq_by_value!(String, str, bool, i32, i64);

impl<T: SemanticEq + ?Sized> SemanticEq for &T {
    fn semantic_eq(&self, other: &Self) -> bool {
        (**self).semantic_eq(*other)
    }
}

impl<T: SemanticEq> SemanticEq for Option<T> {
    fn semantic_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.semantic_eq(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: SemanticEq> SemanticEq for [T] {
    fn semantic_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.semantic_eq(b))
    }
}

impl<T: SemanticEq> SemanticEq for Vec<T> {
    fn semantic_eq(&self, other: &Self) -> bool {
        self.as_slice().semantic_eq(other.as_slice())
    }
}

impl SemanticEq for Quantity {
    /// Only the numeric value matters; uninitialized quantities equal zero.
    fn semantic_eq(&self, other: &Self) -> bool {
        match (parse_quantity(&self.0), parse_quantity(&other.0)) {
            (Ok(a), Ok(b)) => a == b,
            _ => self.0 == other.0,
        }
    }
}

impl SemanticEq for Time {
    fn semantic_eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl SemanticEq for MicroTime {
    fn semantic_eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl SemanticEq for LabelSelector {
    fn semantic_eq(&self, other: &Self) -> bool {
        selector_string(self) == selector_string(other)
    }
}

impl SemanticEq for Toleration {
    fn semantic_eq(&self, other: &Self) -> bool {
        self.key.semantic_eq(&other.key)
            && toleration_operator(self) == toleration_operator(other)
            && self.value.semantic_eq(&other.value)
            && self.effect.semantic_eq(&other.effect)
            && self
                .toleration_seconds
                .semantic_eq(&other.toleration_seconds)
    }
}

/// Canonical string form of a label selector, e.g. `app=web,tier in (a,b),!legacy`.
///
/// Requirements are sorted so that selectors listing the same terms in another
/// order render identically.
pub fn selector_string(selector: &LabelSelector) -> String {
    let labels = selector
        .match_labels
        .iter()
        .flatten()
        .map(|(k, v)| format!("{k}={v}"));

    let expressions = selector.match_expressions.iter().flatten().map(|req| {
        let mut values = req.values.clone().unwrap_or_default();
        values.sort();
        let values = values.join(",");
        match req.operator.as_str() {
            "In" => format!("{} in ({values})", req.key),
            "NotIn" => format!("{} notin ({values})", req.key),
            "Exists" => req.key.clone(),
            "DoesNotExist" => format!("!{}", req.key),
            op => format!("{} {op} ({values})", req.key),
        }
    });

    let mut requirements: Vec<String> = labels.chain(expressions).collect();
    requirements.sort();
    requirements.join(",")
}

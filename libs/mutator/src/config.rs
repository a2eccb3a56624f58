use crate::error::{Error, Result};
use crate::labels::LabelMatcher;

use dtw_k8s_util::tolerations::DEFAULT_TOLERATION_OPERATOR;

use clap::{Args, ValueEnum};
use k8s_openapi::api::core::v1::Toleration;

const TOLERATION_OPERATORS: [&str; 2] = ["Equal", "Exists"];
const TAINT_EFFECTS: [&str; 3] = ["NoSchedule", "PreferNoSchedule", "NoExecute"];

/// What to answer when a request cannot be processed.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Admit the object unmodified and report the error in the response status.
    #[default]
    Open,
    /// Deny the object.
    Closed,
}

/// Command line settings of the mutation, each one also readable from the environment.
#[derive(Args, Debug, Clone)]
pub struct MutatorArgs {
    /// Label key that triggers the mutation (case-insensitive)
    #[arg(long, env = "MATCH_LABEL_KEY", default_value = "")]
    pub match_label_key: String,

    /// Label value that triggers the mutation (case-insensitive)
    #[arg(long, env = "MATCH_LABEL_VALUE", default_value = "")]
    pub match_label_value: String,

    /// Key of the injected toleration
    #[arg(long, env = "TOLERATION_KEY", default_value = "")]
    pub toleration_key: String,

    /// Operator of the injected toleration: `Equal` or `Exists`
    #[arg(long, env = "TOLERATION_OPERATOR", default_value = DEFAULT_TOLERATION_OPERATOR)]
    pub toleration_operator: String,

    /// Value of the injected toleration
    #[arg(long, env = "TOLERATION_VALUE", default_value = "")]
    pub toleration_value: String,

    /// Effect of the injected toleration: `NoSchedule`, `PreferNoSchedule`, `NoExecute`
    /// or empty to match all effects
    #[arg(long, env = "TOLERATION_EFFECT", default_value = "")]
    pub toleration_effect: String,

    /// Answer to give when a request cannot be processed
    #[arg(long, value_enum, env = "FAILURE_POLICY", default_value_t = FailurePolicy::Open)]
    pub failure_policy: FailurePolicy,
}

/// Immutable mutation settings, built and validated once at startup.
#[derive(Debug, Clone)]
pub struct MutatorConfig {
    pub matcher: LabelMatcher,
    pub toleration: Toleration,
    pub failure_policy: FailurePolicy,
}

impl TryFrom<MutatorArgs> for MutatorConfig {
    type Error = Error;

    fn try_from(args: MutatorArgs) -> Result<Self> {
        validate(&args)?;
        Ok(Self {
            matcher: LabelMatcher::new(&args.match_label_key, &args.match_label_value),
            toleration: Toleration {
                key: non_empty(args.toleration_key),
                operator: non_empty(args.toleration_operator),
                value: non_empty(args.toleration_value),
                effect: non_empty(args.toleration_effect),
                toleration_seconds: None,
            },
            failure_policy: args.failure_policy,
        })
    }
}

#[inline]
fn non_empty(s: String) -> Option<String> {
    Some(s).filter(|s| !s.is_empty())
}

/// Refuse configurations that would match unintended objects or inject a toleration
/// the API server rejects.
fn validate(args: &MutatorArgs) -> Result<()> {
    if args.match_label_key.is_empty() || args.match_label_value.is_empty() {
        return Err(Error::InvalidConfig(
            "match label key and value must both be set".to_string(),
        ));
    }

    let operator = args.toleration_operator.as_str();
    if !TOLERATION_OPERATORS.contains(&operator) {
        return Err(Error::InvalidConfig(format!(
            "unsupported toleration operator {operator:?}, expected one of {TOLERATION_OPERATORS:?}"
        )));
    }
    if operator == "Exists" && !args.toleration_value.is_empty() {
        return Err(Error::InvalidConfig(
            "toleration value must be empty when operator is Exists".to_string(),
        ));
    }
    if operator == "Equal" && args.toleration_key.is_empty() {
        return Err(Error::InvalidConfig(
            "toleration key must be set when operator is Equal".to_string(),
        ));
    }

    let effect = args.toleration_effect.as_str();
    if !effect.is_empty() && !TAINT_EFFECTS.contains(&effect) {
        return Err(Error::InvalidConfig(format!(
            "unsupported toleration effect {effect:?}, expected one of {TAINT_EFFECTS:?}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{FailurePolicy, MutatorArgs, MutatorConfig};
    use crate::error::Error;

    use clap::Parser;

    #[derive(Parser)]
    #[command(args_override_self = true)]
    struct TestCli {
        #[command(flatten)]
        mutator: MutatorArgs,
    }

    fn args(extra: &[&str]) -> MutatorArgs {
        let base = [
            "test",
            "--match-label-key",
            "tier",
            "--match-label-value",
            "critical",
            "--toleration-key",
            "dedicated",
            "--toleration-value",
            "critical",
            "--toleration-effect",
            "NoSchedule",
        ];
        TestCli::parse_from(base.iter().chain(extra)).mutator
    }

    #[test]
    fn test_valid_config() {
        let config = MutatorConfig::try_from(args(&[])).unwrap();
        assert!(config.matcher.matches("TIER", "critical"));
        assert_eq!(config.toleration.key.as_deref(), Some("dedicated"));
        assert_eq!(config.toleration.operator.as_deref(), Some("Equal"));
        assert_eq!(config.toleration.value.as_deref(), Some("critical"));
        assert_eq!(config.toleration.effect.as_deref(), Some("NoSchedule"));
        assert_eq!(config.toleration.toleration_seconds, None);
        assert_eq!(config.failure_policy, FailurePolicy::Open);
    }

    #[test]
    fn test_empty_effect_is_omitted() {
        let config = MutatorConfig::try_from(args(&["--toleration-effect", ""])).unwrap();
        assert_eq!(config.toleration.effect, None);
    }

    #[test]
    fn test_failure_policy_closed() {
        let config = MutatorConfig::try_from(args(&["--failure-policy", "closed"])).unwrap();
        assert_eq!(config.failure_policy, FailurePolicy::Closed);
    }

    #[test]
    fn test_rejects_empty_match_label() {
        for flag in ["--match-label-key", "--match-label-value"] {
            let result = MutatorConfig::try_from(args(&[flag, ""]));
            assert!(matches!(result, Err(Error::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_rejects_unknown_operator() {
        let result = MutatorConfig::try_from(args(&["--toleration-operator", "In"]));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_value_with_exists() {
        let result = MutatorConfig::try_from(args(&["--toleration-operator", "Exists"]));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));

        let config = MutatorConfig::try_from(args(&[
            "--toleration-operator",
            "Exists",
            "--toleration-value",
            "",
        ]))
        .unwrap();
        assert_eq!(config.toleration.value, None);
    }

    #[test]
    fn test_rejects_equal_without_key() {
        let result = MutatorConfig::try_from(args(&["--toleration-key", ""]));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_unknown_effect() {
        let result = MutatorConfig::try_from(args(&["--toleration-effect", "NoRun"]));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}

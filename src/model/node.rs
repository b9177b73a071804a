//! Node configurations produced from description lines.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use super::coefficients::Coefficients;
use crate::error::{Result, ScmError};
use crate::resolve::FunctionHandle;

/// Supported output distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistributionKind {
    Bernoulli,
    Gaussian,
    Uniform,
    LogNormal,
    Poisson,
    Exponential,
}

impl DistributionKind {
    pub const ALL: [DistributionKind; 6] = [
        Self::Bernoulli,
        Self::Gaussian,
        Self::Uniform,
        Self::LogNormal,
        Self::Poisson,
        Self::Exponential,
    ];

    /// Parse a distribution from its description keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.keyword() == keyword)
    }

    /// Keyword used in description lines.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Bernoulli => "bernoulli",
            Self::Gaussian => "gaussian",
            Self::Uniform => "uniform",
            Self::LogNormal => "lognormal",
            Self::Poisson => "poisson",
            Self::Exponential => "exponential",
        }
    }

    /// Required parameter names, in declaration order.
    pub fn param_names(&self) -> &'static [&'static str] {
        match self {
            Self::Bernoulli => &["p_"],
            Self::Gaussian | Self::LogNormal => &["mu_", "sigma_"],
            Self::Uniform => &["mu_", "diff_"],
            Self::Poisson | Self::Exponential => &["lambda_"],
        }
    }

    /// Keys accepted inside a `correction[...]` block.
    pub fn correction_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Bernoulli => &["target_mean"],
            _ => &["lower", "upper"],
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A distribution with one coefficient structure per parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Distribution {
    Bernoulli { p: Coefficients },
    Gaussian { mu: Coefficients, sigma: Coefficients },
    Uniform { mu: Coefficients, diff: Coefficients },
    LogNormal { mu: Coefficients, sigma: Coefficients },
    Poisson { lambda: Coefficients },
    Exponential { lambda: Coefficients },
}

impl Distribution {
    /// Assemble a distribution from coefficients keyed by parameter name.
    ///
    /// The key set must equal [`DistributionKind::param_names`] exactly.
    pub fn from_params(
        kind: DistributionKind,
        mut params: HashMap<String, Coefficients>,
    ) -> Result<Self> {
        let expected = kind.param_names();
        let matches = params.len() == expected.len()
            && expected.iter().all(|name| params.contains_key(*name));
        if !matches {
            let mut found: Vec<&str> = params.keys().map(String::as_str).collect();
            found.sort_unstable();
            return Err(ScmError::ParameterMismatch {
                distribution: kind.keyword().to_string(),
                expected: expected.join(", "),
                found: found.join(", "),
            });
        }

        let mut take = |name: &str| params.remove(name).unwrap_or_else(|| Coefficients::zeros(0));
        Ok(match kind {
            DistributionKind::Bernoulli => Self::Bernoulli { p: take("p_") },
            DistributionKind::Gaussian => Self::Gaussian {
                mu: take("mu_"),
                sigma: take("sigma_"),
            },
            DistributionKind::Uniform => Self::Uniform {
                mu: take("mu_"),
                diff: take("diff_"),
            },
            DistributionKind::LogNormal => Self::LogNormal {
                mu: take("mu_"),
                sigma: take("sigma_"),
            },
            DistributionKind::Poisson => Self::Poisson {
                lambda: take("lambda_"),
            },
            DistributionKind::Exponential => Self::Exponential {
                lambda: take("lambda_"),
            },
        })
    }

    pub fn kind(&self) -> DistributionKind {
        match self {
            Self::Bernoulli { .. } => DistributionKind::Bernoulli,
            Self::Gaussian { .. } => DistributionKind::Gaussian,
            Self::Uniform { .. } => DistributionKind::Uniform,
            Self::LogNormal { .. } => DistributionKind::LogNormal,
            Self::Poisson { .. } => DistributionKind::Poisson,
            Self::Exponential { .. } => DistributionKind::Exponential,
        }
    }

    /// Parameters with their coefficients, in declaration order.
    pub fn params(&self) -> Vec<(&'static str, &Coefficients)> {
        match self {
            Self::Bernoulli { p } => vec![("p_", p)],
            Self::Gaussian { mu, sigma } | Self::LogNormal { mu, sigma } => {
                vec![("mu_", mu), ("sigma_", sigma)]
            }
            Self::Uniform { mu, diff } => vec![("mu_", mu), ("diff_", diff)],
            Self::Poisson { lambda } | Self::Exponential { lambda } => vec![("lambda_", lambda)],
        }
    }

    /// Coefficients of the parameter called `name`.
    pub fn param(&self, name: &str) -> Option<&Coefficients> {
        self.params()
            .into_iter()
            .find(|(param, _)| *param == name)
            .map(|(_, coefs)| coefs)
    }
}

/// Settings of a `correction[...]` block. Unset keys are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrectionConfig {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub target_mean: Option<f64>,
}

impl CorrectionConfig {
    pub fn is_empty(&self) -> bool {
        self.lower.is_none() && self.upper.is_none() && self.target_mean.is_none()
    }
}

impl fmt::Display for CorrectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = [
            ("lower", self.lower),
            ("upper", self.upper),
            ("target_mean", self.target_mean),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| format!("{}={}", key, v)))
        .collect();
        write!(f, "[{}]", entries.join(", "))
    }
}

/// A node sampled from a distribution whose parameters depend on its parents.
#[derive(Debug, Clone, PartialEq)]
pub struct StochasticNode {
    pub distribution: Distribution,
    pub do_correction: bool,
    pub correction: CorrectionConfig,
}

/// Parsed configuration of one node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeConfig {
    /// Fixed value
    Constant { value: f64 },
    /// Distribution with structural-equation parameters
    Stochastic(StochasticNode),
    /// Externally defined function of the parents
    Deterministic { function: FunctionHandle },
    /// Values read from a data file
    Data { source: PathBuf },
    /// Placeholder whose distribution is chosen later
    Random { do_correction: bool },
}

impl NodeConfig {
    /// Keyword naming the node kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Constant { .. } => "constant",
            Self::Stochastic(_) => "stochastic",
            Self::Deterministic { .. } => "deterministic",
            Self::Data { .. } => "data",
            Self::Random { .. } => "random",
        }
    }

    /// Output distribution. `None` for the random placeholder and
    /// non-stochastic nodes.
    pub fn output_distribution(&self) -> Option<DistributionKind> {
        match self {
            Self::Stochastic(node) => Some(node.distribution.kind()),
            _ => None,
        }
    }

    pub fn do_correction(&self) -> bool {
        match self {
            Self::Stochastic(node) => node.do_correction,
            Self::Random { do_correction } => *do_correction,
            _ => false,
        }
    }
}

impl fmt::Display for NodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant { value } => write!(f, "constant value={}", value),
            Self::Stochastic(node) => {
                writeln!(f, "stochastic distribution={}", node.distribution.kind())?;
                for (name, coefs) in node.distribution.params() {
                    writeln!(
                        f,
                        "  {} bias={} linear={:?} interactions={:?}",
                        name, coefs.bias, coefs.linear, coefs.interactions
                    )?;
                }
                write!(f, "  do_correction={}", node.do_correction)?;
                if node.do_correction {
                    write!(f, " correction={}", node.correction)?;
                }
                Ok(())
            }
            Self::Deterministic { function } => write!(
                f,
                "deterministic function={} script={}",
                function.name,
                function.script.display()
            ),
            Self::Data { source } => write!(f, "data source={}", source.display()),
            Self::Random { do_correction } => {
                write!(f, "random distribution=? do_correction={}", do_correction)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_keywords() {
        for kind in DistributionKind::ALL {
            assert_eq!(DistributionKind::from_keyword(kind.keyword()), Some(kind));
        }
        assert_eq!(DistributionKind::from_keyword("fakedist"), None);
        assert_eq!(DistributionKind::from_keyword("Gaussian"), None);
    }

    #[test]
    fn test_from_params_exact_set() {
        let mut params = HashMap::new();
        params.insert("mu_".to_string(), Coefficients::zeros(1));
        params.insert("sigma_".to_string(), Coefficients::zeros(1));
        let dist = Distribution::from_params(DistributionKind::LogNormal, params).unwrap();
        assert_eq!(dist.kind(), DistributionKind::LogNormal);
        assert_eq!(dist.params().len(), 2);
        assert!(dist.param("sigma_").is_some());
        assert!(dist.param("p_").is_none());
    }

    #[test]
    fn test_from_params_mismatch() {
        let mut params = HashMap::new();
        params.insert("mu_".to_string(), Coefficients::zeros(0));
        let err = Distribution::from_params(DistributionKind::Bernoulli, params).unwrap_err();
        assert!(matches!(err, ScmError::ParameterMismatch { .. }));
        assert!(err.is_description_error());

        let mut params = HashMap::new();
        params.insert("mu_".to_string(), Coefficients::zeros(0));
        let err = Distribution::from_params(DistributionKind::Gaussian, params).unwrap_err();
        assert!(err.to_string().contains("mu_, sigma_"));
    }

    #[test]
    fn test_random_has_no_distribution() {
        let node = NodeConfig::Random {
            do_correction: true,
        };
        assert_eq!(node.output_distribution(), None);
        assert!(node.do_correction());
        assert_eq!(node.to_string(), "random distribution=? do_correction=true");
    }

    #[test]
    fn test_correction_display() {
        let config = CorrectionConfig {
            lower: Some(0.0),
            upper: Some(1.5),
            target_mean: None,
        };
        assert_eq!(config.to_string(), "[lower=0, upper=1.5]");
        assert!(CorrectionConfig::default().is_empty());
    }
}

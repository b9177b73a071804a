//! Parser for node definition lines.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::equation::parse_equation;
use super::lexer::parse_number;
use crate::error::{Result, ScmError};
use crate::model::{
    Coefficients, CorrectionConfig, Distribution, DistributionKind, NodeConfig, StochasticNode,
    Vocabulary,
};
use crate::resolve::FunctionResolver;

/// Keyword that opens a node line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKeyword {
    Constant,
    Distribution(DistributionKind),
    Deterministic,
    Data,
    Random,
}

impl NodeKeyword {
    /// Parse the leading keyword of a node line.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "constant" => Some(Self::Constant),
            "deterministic" => Some(Self::Deterministic),
            "data" => Some(Self::Data),
            "random" => Some(Self::Random),
            _ => DistributionKind::from_keyword(keyword).map(Self::Distribution),
        }
    }
}

/// Parser for node lines.
///
/// Holds the resolver used for `deterministic(...)` nodes; everything else is
/// pure text processing.
pub struct NodeParser<'r> {
    resolver: &'r dyn FunctionResolver,
}

impl<'r> NodeParser<'r> {
    /// Create a new parser with the given resolver.
    pub fn new(resolver: &'r dyn FunctionResolver) -> Self {
        Self { resolver }
    }

    /// Parse one node line against the node's ordered parents.
    pub fn parse(&self, line: &str, parents: &Vocabulary) -> Result<NodeConfig> {
        let line = line.trim();
        let config = self.parse_line(line, parents)?;
        tracing::debug!(
            node = line,
            kind = config.kind_name(),
            distribution = ?config.output_distribution(),
            parents = parents.len(),
            "parsed node"
        );
        Ok(config)
    }

    fn parse_line(&self, line: &str, parents: &Vocabulary) -> Result<NodeConfig> {
        if line == "random" {
            return Ok(NodeConfig::Random {
                do_correction: true,
            });
        }

        let open = match line.find('(') {
            Some(open) => open,
            None if NodeKeyword::from_keyword(line).is_some() => {
                return Err(ScmError::node(line, "missing argument list"));
            }
            None => {
                return Err(ScmError::UnknownKeyword {
                    keyword: line.to_string(),
                })
            }
        };

        let keyword = line[..open].trim();
        let close = line[open..]
            .find(')')
            .map(|i| open + i)
            .ok_or_else(|| ScmError::node(line, "missing ')'"))?;
        let args = &line[open + 1..close];
        let rest = line[close + 1..].trim();

        let node_keyword = match NodeKeyword::from_keyword(keyword) {
            Some(k) => k,
            // Looks like `name(param=...)`, so report it as a distribution
            None if args.contains('=') => {
                return Err(ScmError::UnknownDistribution {
                    name: keyword.to_string(),
                })
            }
            None => {
                return Err(ScmError::UnknownKeyword {
                    keyword: keyword.to_string(),
                })
            }
        };

        if !rest.is_empty() && !matches!(node_keyword, NodeKeyword::Distribution(_)) {
            return Err(ScmError::node(
                line,
                format!("unexpected text after ')': '{}'", rest),
            ));
        }

        match node_keyword {
            NodeKeyword::Constant => parse_constant(line, args),
            NodeKeyword::Distribution(kind) => parse_stochastic(line, kind, args, rest, parents),
            NodeKeyword::Deterministic => self.parse_deterministic(line, args),
            NodeKeyword::Data => parse_data(line, args, parents),
            NodeKeyword::Random => Err(ScmError::node(line, "random takes no arguments")),
        }
    }

    fn parse_deterministic(&self, line: &str, args: &str) -> Result<NodeConfig> {
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        let (script, name) = match parts.as_slice() {
            [script, name] if !script.is_empty() && !name.is_empty() => (*script, *name),
            _ => {
                return Err(ScmError::node(
                    line,
                    "expected deterministic(script_path, function_name)",
                ))
            }
        };

        if !is_identifier(name) {
            return Err(ScmError::node(
                line,
                format!("'{}' is not a valid function name", name),
            ));
        }

        let function = self.resolver.resolve(Path::new(script), name)?;
        Ok(NodeConfig::Deterministic { function })
    }
}

fn parse_constant(line: &str, args: &str) -> Result<NodeConfig> {
    let text = args.trim();
    let value = parse_number(text).ok_or_else(|| {
        ScmError::node(line, format!("constant value must be a number, got '{}'", text))
    })?;
    Ok(NodeConfig::Constant { value })
}

fn parse_data(line: &str, args: &str, parents: &Vocabulary) -> Result<NodeConfig> {
    if !parents.is_empty() {
        return Err(ScmError::ParentsNotAllowed {
            line: line.to_string(),
            count: parents.len(),
        });
    }
    let source = args.trim();
    if source.is_empty() {
        return Err(ScmError::node(line, "data source path is empty"));
    }
    Ok(NodeConfig::Data {
        source: PathBuf::from(source),
    })
}

fn parse_stochastic(
    line: &str,
    kind: DistributionKind,
    args: &str,
    rest: &str,
    parents: &Vocabulary,
) -> Result<NodeConfig> {
    let compact: String = args.chars().filter(|c| !c.is_whitespace()).collect();

    let mut params: HashMap<String, Coefficients> = HashMap::new();
    for entry in compact.split(',') {
        let (name, equation) = entry
            .split_once('=')
            .filter(|(name, equation)| !name.is_empty() && !equation.is_empty())
            .ok_or_else(|| {
                ScmError::node(line, format!("expected 'param_=equation', got '{}'", entry))
            })?;
        if params.contains_key(name) {
            return Err(ScmError::node(line, format!("duplicate parameter '{}'", name)));
        }
        let terms = parse_equation(equation, parents)?;
        params.insert(name.to_string(), Coefficients::from_terms(&terms, parents.len())?);
    }

    let distribution = Distribution::from_params(kind, params)?;
    let (do_correction, correction) = parse_correction(line, kind, rest)?;

    Ok(NodeConfig::Stochastic(StochasticNode {
        distribution,
        do_correction,
        correction,
    }))
}

/// Parse the optional `, correction[key=value, ...]` suffix.
fn parse_correction(
    line: &str,
    kind: DistributionKind,
    rest: &str,
) -> Result<(bool, CorrectionConfig)> {
    if rest.is_empty() {
        return Ok((false, CorrectionConfig::default()));
    }

    let compact: String = rest.chars().filter(|c| !c.is_whitespace()).collect();
    let body = compact
        .strip_prefix(",correction[")
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| {
            ScmError::node(line, format!("unexpected text after ')': '{}'", rest))
        })?;

    let mut config = CorrectionConfig::default();
    if body.is_empty() {
        return Ok((true, config));
    }

    for entry in body.split(',') {
        let (key, value) = entry.split_once('=').ok_or_else(|| {
            ScmError::correction(kind.keyword(), format!("expected 'key=value', got '{}'", entry))
        })?;
        if !kind.correction_keys().iter().any(|k| *k == key) {
            return Err(ScmError::correction(
                kind.keyword(),
                format!(
                    "unknown key '{}', expected one of [{}]",
                    key,
                    kind.correction_keys().join(", ")
                ),
            ));
        }
        let value = parse_number(value).ok_or_else(|| {
            ScmError::correction(kind.keyword(), format!("'{}' is not a number", value))
        })?;

        let slot = match key {
            "lower" => &mut config.lower,
            "upper" => &mut config.upper,
            _ => &mut config.target_mean,
        };
        if slot.replace(value).is_some() {
            return Err(ScmError::correction(
                kind.keyword(),
                format!("duplicate key '{}'", key),
            ));
        }
    }

    if let (Some(lower), Some(upper)) = (config.lower, config.upper) {
        if lower >= upper {
            return Err(ScmError::correction(
                kind.keyword(),
                format!("lower ({}) must be below upper ({})", lower, upper),
            ));
        }
    }
    if let Some(target) = config.target_mean {
        if target <= 0.0 || target >= 1.0 {
            return Err(ScmError::correction(
                kind.keyword(),
                format!("target_mean ({}) must lie in (0, 1)", target),
            ));
        }
    }

    Ok((true, config))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::StaticResolver;
    use rstest::rstest;

    fn parse(line: &str, parents: &[&str]) -> Result<NodeConfig> {
        let resolver = StaticResolver::new().with_function("customs.py", "custom_function");
        let parents = Vocabulary::new(parents.iter().copied()).unwrap();
        NodeParser::new(&resolver).parse(line, &parents)
    }

    fn coefs(bias: f64, linear: &[f64], interactions: &[f64]) -> Coefficients {
        Coefficients {
            bias,
            linear: linear.to_vec(),
            interactions: interactions.to_vec(),
        }
    }

    fn stochastic(config: NodeConfig) -> StochasticNode {
        match config {
            NodeConfig::Stochastic(node) => node,
            other => panic!("expected a stochastic node, got {other:?}"),
        }
    }

    #[rstest]
    #[case("constant(2)", 2.0)]
    #[case("constant(-0.3)", -0.3)]
    #[case("constant(0)", 0.0)]
    #[case("  constant( 1.5 ) ", 1.5)]
    fn test_parse_constant_node(#[case] line: &str, #[case] value: f64) {
        assert_eq!(parse(line, &["A", "B"]).unwrap(), NodeConfig::Constant { value });
    }

    #[rstest]
    #[case("constant(A)")]
    #[case("constant()")]
    #[case("constant(2A)")]
    #[case("constant(2) extra")]
    #[case("constant")]
    #[case("constant(2")]
    fn test_parse_constant_node_raise_error(#[case] line: &str) {
        assert!(parse(line, &["A", "B"]).unwrap_err().is_description_error());
    }

    #[test]
    fn test_overflowing_literals_raise_error() {
        let huge = "9".repeat(400);
        for line in [
            format!("constant({huge})"),
            format!("bernoulli(p_={huge})"),
            format!("gaussian(mu_={huge}A, sigma_=1)"),
            format!("bernoulli(p_=A), correction[target_mean={huge}]"),
        ] {
            let err = parse(&line, &["A"]).unwrap_err();
            assert!(err.is_description_error(), "{err}");
        }
    }

    #[test]
    fn test_parse_bernoulli() {
        let node = stochastic(parse("bernoulli(p_=2A+B^2)", &["A", "B"]).unwrap());
        assert_eq!(
            node.distribution,
            Distribution::Bernoulli {
                p: coefs(0.0, &[2.0, 0.0], &[0.0, 0.0, 1.0])
            }
        );
        assert!(!node.do_correction);
        assert!(node.correction.is_empty());
    }

    #[test]
    fn test_parse_gaussian() {
        let node = stochastic(parse("gaussian(mu_=1-0.3AB, sigma_=2)", &["A", "B"]).unwrap());
        assert_eq!(
            node.distribution,
            Distribution::Gaussian {
                mu: coefs(1.0, &[0.0, 0.0], &[0.0, -0.3, 0.0]),
                sigma: coefs(2.0, &[0.0, 0.0], &[0.0, 0.0, 0.0]),
            }
        );
    }

    #[test]
    fn test_parse_uniform() {
        let node = stochastic(parse("uniform(mu_=4B, diff_=A^2)", &["A", "B"]).unwrap());
        assert_eq!(
            node.distribution,
            Distribution::Uniform {
                mu: coefs(0.0, &[0.0, 4.0], &[0.0, 0.0, 0.0]),
                diff: coefs(0.0, &[0.0, 0.0], &[1.0, 0.0, 0.0]),
            }
        );
    }

    #[test]
    fn test_parse_lognormal() {
        let node = stochastic(parse("lognormal(mu_=A+B, sigma_=A)", &["A", "B"]).unwrap());
        assert_eq!(
            node.distribution,
            Distribution::LogNormal {
                mu: coefs(0.0, &[1.0, 1.0], &[0.0, 0.0, 0.0]),
                sigma: coefs(0.0, &[1.0, 0.0], &[0.0, 0.0, 0.0]),
            }
        );
    }

    #[test]
    fn test_parse_poisson_and_exponential() {
        let node = stochastic(parse("poisson(lambda_=B^2+1)", &["A", "B"]).unwrap());
        assert_eq!(
            node.distribution,
            Distribution::Poisson {
                lambda: coefs(1.0, &[0.0, 0.0], &[0.0, 0.0, 1.0])
            }
        );

        let node = stochastic(parse("exponential(lambda_=-AB)", &["A", "B"]).unwrap());
        assert_eq!(
            node.distribution,
            Distribution::Exponential {
                lambda: coefs(0.0, &[0.0, 0.0], &[0.0, -1.0, 0.0])
            }
        );
    }

    #[test]
    fn test_parse_interaction_matrix() {
        let node = stochastic(parse("bernoulli(p_=A^2-2AB)", &["A", "B"]).unwrap());
        let p = node.distribution.param("p_").unwrap();
        assert_eq!(p.interactions, vec![1.0, -2.0, 0.0]);
        assert_eq!(p.linear, vec![0.0, 0.0]);
        assert_eq!(p.bias, 0.0);
    }

    #[test]
    fn test_parse_parentless_distribution() {
        let node = stochastic(parse("bernoulli(p_=2)", &[]).unwrap());
        assert_eq!(
            node.distribution,
            Distribution::Bernoulli {
                p: coefs(2.0, &[], &[])
            }
        );
    }

    #[rstest]
    #[case("fakedist(p_=2A+B^2)", &["A", "B"])] // wrong distribution name
    #[case("bernoulli(mu_=2A+B^2)", &["A", "B"])] // wrong parameter name
    #[case("gaussian(mu_=2A+B^2, mu_=2, sigma_=3)", &["A", "B"])] // duplicate params
    #[case("gaussian(mu_=2A)", &["A", "B"])] // missing param
    #[case("poisson(lambda_=A, mu_=1)", &["A", "B"])] // extra param
    #[case("exponential(lambda_=2A+B^2)", &[])] // wrong parents
    #[case("poisson(lambda_=B^2)", &["A"])] // wrong parents
    #[case("bernoulli()", &["A"])] // no params
    #[case("bernoulli(p_)", &["A"])] // no equation
    #[case("bernoulli(p_=)", &["A"])] // empty equation
    #[case("Bernoulli(p_=A)", &["A"])] // keywords are lowercase
    #[case("bernoulli(p_=A) trailing", &["A"])] // junk after ')'
    fn test_parse_stochastic_node_raises_error(#[case] line: &str, #[case] parents: &[&str]) {
        let err = parse(line, parents).unwrap_err();
        assert!(err.is_description_error(), "{line}: {err}");
    }

    #[test]
    fn test_unknown_distribution_error() {
        assert!(matches!(
            parse("fakedist(p_=2A)", &["A"]).unwrap_err(),
            ScmError::UnknownDistribution { .. }
        ));
        assert!(matches!(
            parse("sometype(x)", &["A"]).unwrap_err(),
            ScmError::UnknownKeyword { .. }
        ));
        assert!(matches!(
            parse("gaussian", &["A"]).unwrap_err(),
            ScmError::InvalidNode { .. }
        ));
    }

    #[test]
    fn test_parse_correction() {
        let node = stochastic(
            parse("gaussian(mu_=A, sigma_=1), correction[lower=0, upper=2.5]", &["A"]).unwrap(),
        );
        assert!(node.do_correction);
        assert_eq!(node.correction.lower, Some(0.0));
        assert_eq!(node.correction.upper, Some(2.5));
        assert_eq!(node.correction.target_mean, None);

        let node =
            stochastic(parse("bernoulli(p_=A), correction[target_mean=0.3]", &["A"]).unwrap());
        assert_eq!(node.correction.target_mean, Some(0.3));

        let node = stochastic(parse("poisson(lambda_=A), correction[]", &["A"]).unwrap());
        assert!(node.do_correction);
        assert!(node.correction.is_empty());
    }

    #[rstest]
    #[case("bernoulli(p_=A), correction[lower=0]")] // key not valid for bernoulli
    #[case("gaussian(mu_=A, sigma_=1), correction[target_mean=0.2]")]
    #[case("gaussian(mu_=A, sigma_=1), correction[lower=0, lower=1]")]
    #[case("gaussian(mu_=A, sigma_=1), correction[lower=2, upper=1]")]
    #[case("gaussian(mu_=A, sigma_=1), correction[lower=x]")]
    #[case("bernoulli(p_=A), correction[target_mean=1.5]")]
    #[case("bernoulli(p_=A), correction[target_mean]")]
    #[case("bernoulli(p_=A), correction[")]
    fn test_parse_correction_raises_error(#[case] line: &str) {
        assert!(parse(line, &["A"]).unwrap_err().is_description_error());
    }

    #[test]
    fn test_parse_deterministic_node() {
        let config = parse("deterministic(customs.py, custom_function)", &["A", "B"]).unwrap();
        match config {
            NodeConfig::Deterministic { function } => {
                assert_eq!(function.name, "custom_function");
                assert_eq!(function.script, PathBuf::from("customs.py"));
            }
            other => panic!("expected a deterministic node, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_deterministic_node_raises_error() {
        let err = parse("deterministic(non_existing.py, custom_function)", &["A"]).unwrap_err();
        assert!(err.is_external_error());
        let err = parse("deterministic(customs.py, non_existing_function)", &["A"]).unwrap_err();
        assert!(err.is_external_error());

        // Malformed lines are description errors, checked before resolution
        for line in [
            "deterministic(customs.py)",
            "deterministic(customs.py, )",
            "deterministic(customs.py, a, b)",
            "deterministic(customs.py, 1abc)",
        ] {
            assert!(parse(line, &["A"]).unwrap_err().is_description_error(), "{line}");
        }
    }

    #[test]
    fn test_parse_data_node() {
        assert_eq!(
            parse("data(./some_data.csv)", &[]).unwrap(),
            NodeConfig::Data {
                source: PathBuf::from("./some_data.csv")
            }
        );
    }

    #[test]
    fn test_parse_data_node_raise_error() {
        let err = parse("data(./some_data.csv)", &["A"]).unwrap_err();
        assert!(matches!(err, ScmError::ParentsNotAllowed { count: 1, .. }));
        assert!(parse("data()", &[]).unwrap_err().is_description_error());
    }

    #[test]
    fn test_parse_random_node() {
        let config = parse("random", &["A", "B"]).unwrap();
        assert_eq!(
            config,
            NodeConfig::Random {
                do_correction: true
            }
        );
        assert_eq!(config.output_distribution(), None);
        assert!(parse("random()", &["A"]).unwrap_err().is_description_error());
    }

    #[test]
    fn test_reparse_is_identical() {
        for line in [
            "gaussian(mu_=1-0.3AB, sigma_=2)",
            "constant(4)",
            "random",
            "deterministic(customs.py, custom_function)",
        ] {
            assert_eq!(parse(line, &["A", "B"]).unwrap(), parse(line, &["A", "B"]).unwrap());
        }
    }

    #[test]
    fn test_node_keyword_table() {
        assert_eq!(NodeKeyword::from_keyword("data"), Some(NodeKeyword::Data));
        assert_eq!(
            NodeKeyword::from_keyword("poisson"),
            Some(NodeKeyword::Distribution(DistributionKind::Poisson))
        );
        assert_eq!(NodeKeyword::from_keyword("csv"), None);
    }
}

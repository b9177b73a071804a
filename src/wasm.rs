//! WASM bindings for scm_desc.
//!
//! Lets a browser-based model editor validate node lines as they are typed.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmNodeParser } from 'scm_desc';
//!
//! await init();
//!
//! const parser = new WasmNodeParser(['A', 'B']);
//! parser.register_function('customs.py', 'custom_function');
//!
//! const node = parser.parse('gaussian(mu_=1-0.3AB, sigma_=2)');
//! node.distribution;          // "gaussian"
//! node.interactions('mu_');   // Float64Array [0, -0.3, 0]
//! ```

use wasm_bindgen::prelude::*;

use crate::model::{Coefficients, NodeConfig, Vocabulary};
use crate::resolve::StaticResolver;
use crate::NodeParser;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Node-line parser bound to one parent vocabulary.
///
/// Scripts cannot be read from the browser, so deterministic functions must
/// be registered up front with [`register_function`](Self::register_function).
#[wasm_bindgen]
pub struct WasmNodeParser {
    parents: Vocabulary,
    resolver: StaticResolver,
}

#[wasm_bindgen]
impl WasmNodeParser {
    /// Create a parser for the given ordered parents.
    ///
    /// # Returns
    /// An error string if the parent names are duplicated or invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(parents: Vec<String>) -> Result<WasmNodeParser, JsValue> {
        let parents = Vocabulary::new(parents).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmNodeParser {
            parents,
            resolver: StaticResolver::new(),
        })
    }

    /// Declare that `script` defines a function called `name`.
    #[wasm_bindgen]
    pub fn register_function(&mut self, script: &str, name: &str) {
        self.resolver.register(script, name);
    }

    /// Parse one node line.
    #[wasm_bindgen]
    pub fn parse(&self, line: &str) -> Result<WasmNodeConfig, JsValue> {
        let config = NodeParser::new(&self.resolver)
            .parse(line, &self.parents)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmNodeConfig { config })
    }
}

/// Read-only view of a parsed node.
#[wasm_bindgen]
pub struct WasmNodeConfig {
    config: NodeConfig,
}

impl WasmNodeConfig {
    fn coefficients(&self, param: &str) -> Option<&Coefficients> {
        match &self.config {
            NodeConfig::Stochastic(node) => node.distribution.param(param),
            _ => None,
        }
    }
}

#[wasm_bindgen]
impl WasmNodeConfig {
    /// Node kind: "constant", "stochastic", "deterministic", "data" or "random".
    #[wasm_bindgen(getter)]
    pub fn kind(&self) -> String {
        self.config.kind_name().to_string()
    }

    /// Distribution keyword; "?" for random nodes, `undefined` otherwise.
    #[wasm_bindgen(getter)]
    pub fn distribution(&self) -> Option<String> {
        match &self.config {
            NodeConfig::Random { .. } => Some("?".to_string()),
            config => config.output_distribution().map(|d| d.keyword().to_string()),
        }
    }

    /// Parameter names of a stochastic node.
    #[wasm_bindgen(getter)]
    pub fn param_names(&self) -> Vec<String> {
        match &self.config {
            NodeConfig::Stochastic(node) => node
                .distribution
                .params()
                .into_iter()
                .map(|(name, _)| name.to_string())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Bias of parameter `param`.
    #[wasm_bindgen]
    pub fn bias(&self, param: &str) -> Option<f64> {
        self.coefficients(param).map(|c| c.bias)
    }

    /// Linear coefficients of parameter `param`, in parent order.
    #[wasm_bindgen]
    pub fn linear(&self, param: &str) -> Option<Vec<f64>> {
        self.coefficients(param).map(|c| c.linear.clone())
    }

    /// Interaction coefficients of parameter `param`.
    #[wasm_bindgen]
    pub fn interactions(&self, param: &str) -> Option<Vec<f64>> {
        self.coefficients(param).map(|c| c.interactions.clone())
    }

    /// Value of a constant node.
    #[wasm_bindgen(getter)]
    pub fn value(&self) -> Option<f64> {
        match self.config {
            NodeConfig::Constant { value } => Some(value),
            _ => None,
        }
    }

    /// Source path of a data node.
    #[wasm_bindgen(getter)]
    pub fn source(&self) -> Option<String> {
        match &self.config {
            NodeConfig::Data { source } => Some(source.display().to_string()),
            _ => None,
        }
    }

    /// Function name of a deterministic node.
    #[wasm_bindgen(getter)]
    pub fn function(&self) -> Option<String> {
        match &self.config {
            NodeConfig::Deterministic { function } => Some(function.name.clone()),
            _ => None,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn do_correction(&self) -> bool {
        self.config.do_correction()
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Canonical interaction slot of the parent pair `(i, j)` among `n` parents.
///
/// # Returns
/// An error string if `i` or `j` is not below `n`.
#[wasm_bindgen]
pub fn interaction_index(i: usize, j: usize, n: usize) -> Result<usize, JsValue> {
    crate::model::checked_interaction_index(i, j, n).ok_or_else(|| {
        JsValue::from_str(&format!(
            "pair ({}, {}) out of range for {} parents",
            i, j, n
        ))
    })
}

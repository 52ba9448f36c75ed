// Server-side expression tree
//
// An `Expr` describes a computation that runs inside the imagery service.
// Nothing here is evaluated locally; infrastructure encodes it for the wire.
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(Value),
    Invoke {
        function: String,
        args: BTreeMap<String, Expr>,
    },
    /// Reference to a parameter of an enclosing `Function`
    Argument(String),
    Function {
        params: Vec<String>,
        body: Box<Expr>,
    },
    Array(Vec<Expr>),
    Dictionary(BTreeMap<String, Expr>),
}

impl Expr {
    pub fn call(function: &str) -> Self {
        Expr::Invoke {
            function: function.to_string(),
            args: BTreeMap::new(),
        }
    }

    /// Add a named argument. No-op on anything but `Invoke`.
    pub fn arg(mut self, name: &str, value: impl Into<Expr>) -> Self {
        if let Expr::Invoke { args, .. } = &mut self {
            args.insert(name.to_string(), value.into());
        }
        self
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Expr::Constant(value.into())
    }

    pub fn argument(name: &str) -> Self {
        Expr::Argument(name.to_string())
    }

    pub fn function(params: &[&str], body: Expr) -> Self {
        Expr::Function {
            params: params.iter().map(|p| p.to_string()).collect(),
            body: Box::new(body),
        }
    }

    pub fn dictionary<'a>(entries: impl IntoIterator<Item = (&'a str, Expr)>) -> Self {
        Expr::Dictionary(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    pub fn function_name(&self) -> Option<&str> {
        match self {
            Expr::Invoke { function, .. } => Some(function),
            _ => None,
        }
    }

    pub fn get_arg(&self, name: &str) -> Option<&Expr> {
        match self {
            Expr::Invoke { args, .. } => args.get(name),
            _ => None,
        }
    }

    /// Every function name in the tree, depth first, callers before callees.
    pub fn function_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_function_names(&mut names);
        names
    }

    fn collect_function_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expr::Invoke { function, args } => {
                names.push(function);
                for a in args.values() {
                    a.collect_function_names(names);
                }
            }
            Expr::Function { body, .. } => body.collect_function_names(names),
            Expr::Array(items) => items.iter().for_each(|i| i.collect_function_names(names)),
            Expr::Dictionary(entries) => {
                entries.values().for_each(|e| e.collect_function_names(names))
            }
            Expr::Constant(_) | Expr::Argument(_) => {}
        }
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Expr::Constant(Value::from(s))
    }
}

impl From<f64> for Expr {
    fn from(v: f64) -> Self {
        Expr::Constant(Value::from(v))
    }
}

impl From<bool> for Expr {
    fn from(v: bool) -> Self {
        Expr::Constant(Value::from(v))
    }
}

impl From<Vec<Expr>> for Expr {
    fn from(items: Vec<Expr>) -> Self {
        Expr::Array(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_args() {
        let e = Expr::call("Image.select")
            .arg("input", Expr::argument("img"))
            .arg("bandSelectors", Expr::constant(vec!["VV"]));
        assert_eq!(e.function_name(), Some("Image.select"));
        assert_eq!(e.get_arg("input"), Some(&Expr::Argument("img".into())));
        assert!(e.get_arg("missing").is_none());
    }

    #[test]
    fn test_function_names_walks_nested_trees() {
        let body = Expr::call("Image.select").arg("input", Expr::argument("x"));
        let e = Expr::call("Collection.map")
            .arg("collection", Expr::call("ImageCollection.load").arg("id", "C"))
            .arg("baseAlgorithm", Expr::function(&["x"], body));
        // BTreeMap ordering: baseAlgorithm before collection
        assert_eq!(
            e.function_names(),
            vec!["Collection.map", "Image.select", "ImageCollection.load"]
        );
    }
}

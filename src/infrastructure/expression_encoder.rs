// Encoder from expression trees to the Earth Engine REST expression format
use crate::domain::expression::Expr;
use serde_json::{json, Map, Value};

/// Encode as `{"result": "0", "values": {...}}`. Function bodies are hoisted into
/// the value table and referenced by id; everything else is inlined.
pub fn encode(expr: &Expr) -> Value {
    let mut values = Map::new();
    let root = encode_node(expr, &mut values);
    let root_id = next_id(&values);
    values.insert(root_id.clone(), root);

    json!({ "result": root_id, "values": values })
}

fn next_id(values: &Map<String, Value>) -> String {
    values.len().to_string()
}

fn encode_node(expr: &Expr, values: &mut Map<String, Value>) -> Value {
    match expr {
        Expr::Constant(v) => json!({ "constantValue": v }),
        Expr::Argument(name) => json!({ "argumentReference": name }),
        Expr::Invoke { function, args } => {
            let arguments: Map<String, Value> = args
                .iter()
                .map(|(k, v)| (k.clone(), encode_node(v, values)))
                .collect();
            json!({
                "functionInvocationValue": {
                    "functionName": function,
                    "arguments": arguments,
                }
            })
        }
        Expr::Function { params, body } => {
            let node = encode_node(body, values);
            let body_id = next_id(values);
            values.insert(body_id.clone(), node);
            json!({
                "functionDefinitionValue": {
                    "argumentNames": params,
                    "body": body_id,
                }
            })
        }
        Expr::Array(items) => {
            let items: Vec<Value> = items.iter().map(|i| encode_node(i, values)).collect();
            json!({ "arrayValue": { "values": items } })
        }
        Expr::Dictionary(entries) => {
            let entries: Map<String, Value> = entries
                .iter()
                .map(|(k, v)| (k.clone(), encode_node(v, values)))
                .collect();
            json!({ "dictionaryValue": { "values": entries } })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_invocation() {
        let e = Expr::call("ImageCollection.load").arg("id", "COPERNICUS/S1_GRD");
        let encoded = encode(&e);

        assert_eq!(
            encoded,
            json!({
                "result": "0",
                "values": {
                    "0": {
                        "functionInvocationValue": {
                            "functionName": "ImageCollection.load",
                            "arguments": { "id": { "constantValue": "COPERNICUS/S1_GRD" } }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_function_bodies_are_hoisted() {
        let body = Expr::call("Image.select")
            .arg("input", Expr::argument("img"))
            .arg("bandSelectors", Expr::constant(vec!["VV"]));
        let e = Expr::call("Collection.map")
            .arg("collection", Expr::argument("c"))
            .arg("baseAlgorithm", Expr::function(&["img"], body));
        let encoded = encode(&e);

        assert_eq!(encoded["result"], "1");
        let values = encoded["values"].as_object().unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(
            values["0"]["functionInvocationValue"]["arguments"]["input"],
            json!({ "argumentReference": "img" })
        );
        let def = &values["1"]["functionInvocationValue"]["arguments"]["baseAlgorithm"];
        assert_eq!(def["functionDefinitionValue"]["body"], "0");
        assert_eq!(def["functionDefinitionValue"]["argumentNames"], json!(["img"]));
    }

    #[test]
    fn test_dictionary_and_array() {
        let e = Expr::dictionary([("a", Expr::Array(vec![Expr::from(1.0)]))]);
        let encoded = encode(&e);
        assert_eq!(
            encoded["values"]["0"],
            json!({ "dictionaryValue": { "values": {
                "a": { "arrayValue": { "values": [ { "constantValue": 1.0 } ] } }
            } } })
        );
    }
}

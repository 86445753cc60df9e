use super::value::{Value, XMLRPC_DATETIME_FORMAT};
use crate::utils::error::{GatewayError, Result};
use chrono::NaiveDateTime;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// Minimal element tree; XML-RPC never uses attributes or mixed content.
#[derive(Debug, Default)]
struct Node {
    name: String,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn named(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            ..Default::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    fn require(&self, name: &str) -> Result<&Node> {
        self.child(name).ok_or_else(|| unexpected(format!(
            "<{}> is missing <{}>",
            self.name, name
        )))
    }
}

fn unexpected(message: String) -> GatewayError {
    GatewayError::UnexpectedResponse { message }
}

fn parse_tree(body: &str) -> Result<Node> {
    // text is kept verbatim; whitespace between structural elements lands on
    // nodes with children, whose text is never read
    let mut reader = Reader::from_str(body);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(Node::named(e.name().as_ref())),
            Event::Empty(e) => {
                let node = Node::named(e.name().as_ref());
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| unexpected("unbalanced closing tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| GatewayError::XmlParse {
                    message: e.to_string(),
                })?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(GatewayError::XmlParse {
            message: format!("unclosed element <{}>", stack[stack.len() - 1].name),
        });
    }
    root.ok_or_else(|| GatewayError::XmlParse {
        message: "empty document".to_string(),
    })
}

fn parse_datetime(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, XMLRPC_DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| unexpected(format!("invalid dateTime.iso8601 '{}': {}", raw, e)))
}

fn decode_value(node: &Node) -> Result<Value> {
    // untyped <value> defaults to string
    let Some(typed) = node.children.first() else {
        return Ok(Value::String(node.text.clone()));
    };
    let text = typed.text.trim();

    match typed.name.as_str() {
        "int" | "i4" | "i8" => text
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| unexpected(format!("invalid integer '{}': {}", text, e))),
        "boolean" => match text {
            "1" | "true" => Ok(Value::Bool(true)),
            "0" | "false" => Ok(Value::Bool(false)),
            other => Err(unexpected(format!("invalid boolean '{}'", other))),
        },
        "string" => Ok(Value::String(typed.text.clone())),
        "double" => text
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|e| unexpected(format!("invalid double '{}': {}", text, e))),
        "dateTime.iso8601" => parse_datetime(text).map(Value::DateTime),
        "base64" => Ok(Value::Base64(
            text.chars().filter(|c| !c.is_whitespace()).collect(),
        )),
        "nil" => Ok(Value::Nil),
        "struct" => {
            let mut members = Vec::with_capacity(typed.children.len());
            for member in typed.children.iter().filter(|c| c.name == "member") {
                let name = member.require("name")?.text.clone();
                let value = decode_value(member.require("value")?)?;
                members.push((name, value));
            }
            Ok(Value::Struct(members))
        }
        "array" => {
            let data = typed.require("data")?;
            data.children
                .iter()
                .filter(|c| c.name == "value")
                .map(decode_value)
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        other => Err(unexpected(format!("unknown value type <{}>", other))),
    }
}

/// Decodes a `methodResponse`; a `<fault>` becomes [`GatewayError::RpcFault`].
pub fn decode_response(body: &str) -> Result<Value> {
    let root = parse_tree(body)?;
    if root.name != "methodResponse" {
        return Err(unexpected(format!(
            "expected <methodResponse>, found <{}>",
            root.name
        )));
    }

    if let Some(fault) = root.child("fault") {
        let detail = decode_value(fault.require("value")?)?;
        let code = detail.member("faultCode").and_then(Value::as_i64).unwrap_or(0);
        let message = detail
            .member("faultString")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Err(GatewayError::RpcFault { code, message });
    }

    let value = root.require("params")?.require("param")?.require("value")?;
    decode_value(value)
}

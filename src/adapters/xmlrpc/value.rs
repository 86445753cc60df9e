use chrono::NaiveDateTime;
use quick_xml::escape::escape;

/// Wire format for `dateTime.iso8601` as Odoo emits it.
pub const XMLRPC_DATETIME_FORMAT: &str = "%Y%m%dT%H:%M:%S";
/// Format used when handing datetimes to JSON clients.
pub const JSON_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    String(String),
    Double(f64),
    DateTime(NaiveDateTime),
    /// Kept in its encoded form.
    Base64(String),
    /// Member order is preserved as received.
    Struct(Vec<(String, Value)>),
    Array(Vec<Value>),
    Nil,
}

impl Value {
    pub fn empty_struct() -> Self {
        Value::Struct(Vec::new())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn member(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct(members) => members.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn write_xml(&self, out: &mut String) {
        out.push_str("<value>");
        match self {
            Value::Int(i) => {
                // i4 covers every id Odoo hands out; larger values need the i8 extension
                if i32::try_from(*i).is_ok() {
                    out.push_str(&format!("<int>{}</int>", i));
                } else {
                    out.push_str(&format!("<i8>{}</i8>", i));
                }
            }
            Value::Bool(b) => out.push_str(if *b {
                "<boolean>1</boolean>"
            } else {
                "<boolean>0</boolean>"
            }),
            Value::String(s) => {
                out.push_str("<string>");
                out.push_str(&escape(s.as_str()));
                out.push_str("</string>");
            }
            Value::Double(d) => out.push_str(&format!("<double>{}</double>", d)),
            Value::DateTime(dt) => out.push_str(&format!(
                "<dateTime.iso8601>{}</dateTime.iso8601>",
                dt.format(XMLRPC_DATETIME_FORMAT)
            )),
            Value::Base64(b) => {
                out.push_str("<base64>");
                out.push_str(&escape(b.as_str()));
                out.push_str("</base64>");
            }
            Value::Struct(members) => {
                out.push_str("<struct>");
                for (name, value) in members {
                    out.push_str("<member><name>");
                    out.push_str(&escape(name.as_str()));
                    out.push_str("</name>");
                    value.write_xml(out);
                    out.push_str("</member>");
                }
                out.push_str("</struct>");
            }
            Value::Array(items) => {
                out.push_str("<array><data>");
                for item in items {
                    item.write_xml(out);
                }
                out.push_str("</data></array>");
            }
            Value::Nil => out.push_str("<nil/>"),
        }
        out.push_str("</value>");
    }

    pub fn into_json(self) -> serde_json::Value {
        match self {
            Value::Int(i) => serde_json::Value::from(i),
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::String(s) | Value::Base64(s) => serde_json::Value::String(s),
            Value::Double(d) => serde_json::Number::from_f64(d)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::DateTime(dt) => {
                serde_json::Value::String(dt.format(JSON_DATETIME_FORMAT).to_string())
            }
            Value::Struct(members) => serde_json::Value::Object(
                members
                    .into_iter()
                    .map(|(k, v)| (k, v.into_json()))
                    .collect(),
            ),
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(Value::into_json).collect())
            }
            Value::Nil => serde_json::Value::Null,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// Builds a complete `methodCall` document.
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from(r#"<?xml version="1.0"?><methodCall><methodName>"#);
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        param.write_xml(&mut out);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

use crate::access::Value;
use crate::catalog::MemberType;

/// Decoder for members stored as JSON text
pub trait JsonCodec: Send + Sync {
    fn decode(&self, text: &str, member: MemberType) -> anyhow::Result<Value>;

    fn is_blank(&self, text: &str) -> bool {
        text.trim().is_empty()
    }
}

/// serde_json backed codec, yielding `Value::Json` documents
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeJsonCodec;

impl JsonCodec for SerdeJsonCodec {
    fn decode(&self, text: &str, _member: MemberType) -> anyhow::Result<Value> {
        Ok(Value::Json(serde_json::from_str(text)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_and_blank() {
        let codec = SerdeJsonCodec;
        assert_eq!(
            codec.decode(r#"{"a": 1}"#, MemberType::Custom("A")).unwrap(),
            Value::Json(serde_json::json!({"a": 1}))
        );
        assert!(codec.decode("{", MemberType::Custom("A")).is_err());
        assert!(codec.is_blank("  \t"));
        assert!(!codec.is_blank("[]"));
    }
}

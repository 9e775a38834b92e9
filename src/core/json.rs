use serde::de::{DeserializeOwned, Error as _, Unexpected};
use serde_json::Value;

use crate::core::error::ParseError;

/// Deserialize a JSON document, keeping the path of the first failing field.
///
/// The root must be a JSON object; arrays and scalars are rejected before any
/// field is read.
pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ParseError> {
    let root: Value = serde_json::from_slice(bytes).map_err(root_error)?;

    if !root.is_object() {
        let source = serde_json::Error::invalid_type(unexpected(&root), &"a JSON object");
        return Err(root_error(source));
    }

    Ok(serde_path_to_error::deserialize(root)?)
}

fn root_error(source: serde_json::Error) -> ParseError {
    ParseError::Json {
        path: ".".to_string(),
        source,
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Outer {
        #[allow(dead_code)]
        inner: Inner,
    }

    #[derive(Debug, Deserialize)]
    struct Inner {
        #[allow(dead_code)]
        size: u64,
    }

    #[test]
    fn error_names_failing_path() {
        let err = from_slice::<Outer>(br#"{"inner": {"size": "big"}}"#).unwrap_err();
        match err {
            ParseError::Json { path, .. } => assert_eq!(path, "inner.size"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        assert!(from_slice::<Inner>(br#"{"size": 1} x"#).is_err());
    }

    #[test]
    fn non_object_roots_are_rejected() {
        #[derive(Debug, Deserialize)]
        struct Positional {
            #[allow(dead_code)]
            #[serde(default)]
            id: String,
        }

        let docs: [&[u8]; 5] = [br#"["1.20.4"]"#, b"[]", b"42", b"null", br#""id""#];
        for doc in docs {
            let err = from_slice::<Positional>(doc).unwrap_err();
            match err {
                ParseError::Json { path, .. } => assert_eq!(path, "."),
                other => panic!("unexpected error: {other}"),
            }
        }
        assert!(from_slice::<Positional>(br#"{"id": "1.20.4"}"#).is_ok());
    }
}

use std::any::TypeId;
use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::context::{Erased, EnvironmentValues};
use crate::errors::{EnvError, Result};

/// A typed slot in the environment.
///
/// The implementing type is the key's identity; `NAME` is how the key is
/// addressed from outside the program (overrides, listings).
pub trait EnvironmentKey: 'static {
    type Value: Clone + Send + Sync + 'static;
    const NAME: &'static str;
    fn default_value() -> Self::Value;
}

#[derive(Clone, Copy)]
struct KeyInfo {
    type_id: TypeId,
    default: fn() -> Result<Value>,
    decode: fn(&Value) -> Result<Erased>,
    encode: fn(&EnvironmentValues) -> Result<Value>,
}

/// Keys known by name, for overriding and describing environments as JSON.
#[derive(Clone, Default)]
pub struct KeyRegistry {
    inner: Arc<BTreeMap<&'static str, KeyInfo>>,
}

impl KeyRegistry {
    pub fn new() -> Self { Self::default() }

    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        reg.insert::<builtins::MyDataKey>();
        reg.insert::<builtins::YourDataKey>();
        reg
    }

    /// Register `K`. Defining the same key twice is a no-op and returns
    /// `false`; a different key reusing a taken name is an error.
    pub fn define<K>(&mut self) -> Result<bool>
    where
        K: EnvironmentKey,
        K::Value: Serialize + DeserializeOwned,
    {
        if let Some(info) = self.inner.get(K::NAME) {
            return if info.type_id == TypeId::of::<K>() {
                Ok(false)
            } else {
                Err(EnvError::DuplicateKey(K::NAME))
            };
        }
        self.insert::<K>();
        debug!(key = K::NAME, "defined environment key");
        Ok(true)
    }

    fn insert<K>(&mut self)
    where
        K: EnvironmentKey,
        K::Value: Serialize + DeserializeOwned,
    {
        let info = KeyInfo {
            type_id: TypeId::of::<K>(),
            default: default_json::<K>,
            decode: decode_value::<K>,
            encode: encode_value::<K>,
        };
        Arc::make_mut(&mut self.inner).insert(K::NAME, info);
    }

    pub fn contains(&self, name: &str) -> bool { self.inner.contains_key(name) }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.inner.keys().copied()
    }

    pub fn default_json(&self, name: &str) -> Result<Value> {
        (self.info(name)?.default)()
    }

    /// Decode `value` as the named key's type and set it in `env`.
    pub fn apply(&self, env: &mut EnvironmentValues, name: &str, value: &Value) -> Result<()> {
        let (name, info) = self
            .inner
            .get_key_value(name)
            .ok_or_else(|| EnvError::UnknownKey(name.to_string()))?;
        let decoded = (info.decode)(value)?;
        env.insert_slot(info.type_id, *name, decoded);
        debug!(key = *name, %value, "applied environment override");
        Ok(())
    }

    /// Every registered key as resolved in `env`, defaults included.
    pub fn describe(&self, env: &EnvironmentValues) -> Result<Map<String, Value>> {
        self.inner
            .iter()
            .map(|(name, info)| Ok((name.to_string(), (info.encode)(env)?)))
            .collect()
    }

    fn info(&self, name: &str) -> Result<&KeyInfo> {
        self.inner.get(name).ok_or_else(|| EnvError::UnknownKey(name.to_string()))
    }
}

/// Split a `KEY=JSON` override. A value that is not valid JSON is taken as a
/// plain string.
pub fn parse_override(spec: &str) -> Result<(String, Value)> {
    let (key, raw) = spec
        .split_once('=')
        .filter(|(key, _)| !key.trim().is_empty())
        .ok_or_else(|| EnvError::Override(spec.to_string()))?;
    let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.trim().to_string(), value))
}

fn default_json<K>() -> Result<Value>
where
    K: EnvironmentKey,
    K::Value: Serialize,
{
    serde_json::to_value(K::default_value()).map_err(|source| EnvError::Encode { key: K::NAME, source })
}

fn encode_value<K>(env: &EnvironmentValues) -> Result<Value>
where
    K: EnvironmentKey,
    K::Value: Serialize,
{
    serde_json::to_value(env.get::<K>()).map_err(|source| EnvError::Encode { key: K::NAME, source })
}

fn decode_value<K>(value: &Value) -> Result<Erased>
where
    K: EnvironmentKey,
    K::Value: DeserializeOwned,
{
    let decoded: K::Value = serde_json::from_value(value.clone())
        .map_err(|source| EnvError::Decode { key: K::NAME.to_string(), source })?;
    Ok(Arc::new(decoded))
}

pub mod builtins {
    use super::EnvironmentKey;
    use crate::sample::{MyData, YourData};

    pub struct MyDataKey;
    impl EnvironmentKey for MyDataKey {
        type Value = MyData;
        const NAME: &'static str = "myData";
        fn default_value() -> MyData { MyData::guest() }
    }

    pub struct YourDataKey;
    impl EnvironmentKey for YourDataKey {
        type Value = YourData;
        const NAME: &'static str = "yourData";
        fn default_value() -> YourData { YourData::guest() }
    }
}

#[cfg(test)]
mod tests {
    use super::builtins::{MyDataKey, YourDataKey};
    use super::*;
    use crate::sample::MyData;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct OtherMyData;
    impl EnvironmentKey for OtherMyData {
        type Value = u32;
        const NAME: &'static str = "myData";
        fn default_value() -> u32 { 0 }
    }

    #[test]
    fn define_is_idempotent_per_key() {
        let mut reg = KeyRegistry::new();
        assert!(reg.define::<MyDataKey>().unwrap());
        assert!(!reg.define::<MyDataKey>().unwrap());
        assert_eq!(reg.names().collect::<Vec<_>>(), vec!["myData"]);
    }

    #[test]
    fn define_rejects_name_clash() {
        let mut reg = KeyRegistry::with_builtins();
        let err = reg.define::<OtherMyData>().unwrap_err();
        assert!(matches!(err, EnvError::DuplicateKey("myData")));
    }

    #[test]
    fn builtin_defaults_are_guest() {
        let reg = KeyRegistry::with_builtins();
        assert_eq!(reg.default_json("myData").unwrap(), json!({"name": "Guest", "age": 0}));
        assert_eq!(reg.default_json("yourData").unwrap(), json!({"name": "Guest", "age": 0}));
    }

    #[test]
    fn apply_sets_typed_value() {
        let reg = KeyRegistry::with_builtins();
        let mut env = EnvironmentValues::new();
        reg.apply(&mut env, "myData", &json!({"name": "Carol", "age": 41})).unwrap();
        assert_eq!(env.get::<MyDataKey>(), MyData::new("Carol", 41));
        assert!(!env.contains::<YourDataKey>());
    }

    #[test]
    fn apply_reports_bad_input() {
        let reg = KeyRegistry::with_builtins();
        let mut env = EnvironmentValues::new();
        assert!(matches!(
            reg.apply(&mut env, "nope", &json!(1)),
            Err(EnvError::UnknownKey(_))
        ));
        assert!(matches!(
            reg.apply(&mut env, "myData", &json!("Carol")),
            Err(EnvError::Decode { .. })
        ));
        assert!(env.is_empty());
    }

    #[test]
    fn describe_includes_defaults() {
        let reg = KeyRegistry::with_builtins();
        let env = EnvironmentValues::new().with::<MyDataKey>(MyData::new("Alice", 30));
        let described = reg.describe(&env).unwrap();
        assert_eq!(
            Value::Object(described),
            json!({
                "myData": {"name": "Alice", "age": 30},
                "yourData": {"name": "Guest", "age": 0}
            })
        );
    }

    #[test]
    fn parse_override_splits_key_and_json() {
        let (key, value) = parse_override(r#"myData={"name":"Dan","age":7}"#).unwrap();
        assert_eq!(key, "myData");
        assert_eq!(value, json!({"name": "Dan", "age": 7}));

        let (_, raw) = parse_override("title=hello").unwrap();
        assert_eq!(raw, json!("hello"));

        assert!(parse_override("no-equals").is_err());
        assert!(parse_override("=1").is_err());
    }
}

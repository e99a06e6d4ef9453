//! Numeric counter bag returned by every built-in pass (§4.3: "stats is an
//! object of numeric counters; the driver does not interpret counter
//! names but surfaces them verbatim").

use serde_json::{Map, Value};

#[derive(Debug, Default, Clone)]
pub struct Stats(Map<String, Value>);

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr(&mut self, key: &str) {
        self.add(key, 1);
    }

    pub fn add(&mut self, key: &str, n: u64) {
        let entry = self.0.entry(key.to_string()).or_insert(Value::from(0u64));
        if let Some(current) = entry.as_u64() {
            *entry = Value::from(current + n);
        }
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> u64 {
        self.0.get(key).and_then(Value::as_u64).unwrap_or(0)
    }

    /// Roll every counter up into a `changes` aggregate, the convention
    /// §4.3 recommends implementers follow.
    pub fn finish(mut self) -> Value {
        let total: u64 = self.0.values().filter_map(Value::as_u64).sum();
        self.0.insert("changes".to_string(), Value::from(total));
        Value::Object(self.0)
    }
}

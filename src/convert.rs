//! Pointer/value adapters
//!
//! Reference semantics for the adapter functions the generated resolvers
//! call. Current values travel as strings; the empty string stands in for an
//! absent pointer in both directions. Numeric adapters that fail to parse
//! yield the absent value rather than an error, mirroring the runtime the
//! generated code links against.

/// Adapt an optional string field for use as a current value.
pub fn from_ptr_value(v: Option<&str>) -> String {
    v.unwrap_or_default().to_string()
}

/// Adapt an optional float field for use as a current value. Formats with no
/// fractional digits.
pub fn from_float_ptr_value(v: Option<f64>) -> String {
    match v {
        Some(f) => format!("{:.0}", f),
        None => String::new(),
    }
}

/// Adapt an optional int field for use as a current value.
pub fn from_int_ptr_value(v: Option<i64>) -> String {
    match v {
        Some(i) => i.to_string(),
        None => String::new(),
    }
}

/// Adapt a resolved value for use as an optional string field.
pub fn to_ptr_value(v: &str) -> Option<String> {
    Some(v.to_string())
}

/// Adapt a resolved value for use as an optional float field. Unparseable
/// input yields the absent value.
pub fn to_float_ptr_value(v: &str) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    v.parse().ok()
}

/// Adapt a resolved value for use as an optional int field. Unparseable
/// input yields the absent value.
pub fn to_int_ptr_value(v: &str) -> Option<i64> {
    if v.is_empty() {
        return None;
    }
    v.parse().ok()
}

/// Element-wise [`from_ptr_value`].
pub fn from_ptr_values(v: &[Option<String>]) -> Vec<String> {
    v.iter().map(|e| from_ptr_value(e.as_deref())).collect()
}

/// Element-wise [`from_float_ptr_value`].
pub fn from_float_ptr_values(v: &[Option<f64>]) -> Vec<String> {
    v.iter().map(|e| from_float_ptr_value(*e)).collect()
}

/// Element-wise [`from_int_ptr_value`].
pub fn from_int_ptr_values(v: &[Option<i64>]) -> Vec<String> {
    v.iter().map(|e| from_int_ptr_value(*e)).collect()
}

/// Element-wise [`to_ptr_value`].
pub fn to_ptr_values(v: &[String]) -> Vec<Option<String>> {
    v.iter().map(|e| to_ptr_value(e)).collect()
}

/// Element-wise [`to_float_ptr_value`].
pub fn to_float_ptr_values(v: &[String]) -> Vec<Option<f64>> {
    v.iter().map(|e| to_float_ptr_value(e)).collect()
}

/// Element-wise [`to_int_ptr_value`].
pub fn to_int_ptr_values(v: &[String]) -> Vec<Option<i64>> {
    v.iter().map(|e| to_int_ptr_value(e)).collect()
}

//! Value transformers.
//!
//! [`transform`] turns the raw value of a recognized flag into
//! [`Entry`]s according to the rule's [`Transform`]. Validation failures are
//! returned as [`TransformError`]s, which the elaborator turns into
//! diagnostics pointing at the flag.

use runcompose_core::{
    entry::Entry,
    rule::{FlagRule, Transform},
};
use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::{
    error::{Diagnostic, ErrorCode},
    invocation::RawValue,
    span::Span,
};

/// Network modes that are not user-defined networks.
const NETWORK_MODES: [&str; 3] = ["host", "bridge", "none"];

/// A flag value that cannot be translated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("invalid ulimit `{value}`: {reason}")]
    InvalidUlimit { value: String, reason: &'static str },

    #[error("invalid device rate `{0}`")]
    InvalidDeviceRate(String),

    #[error("invalid device weight `{0}`")]
    InvalidDeviceWeight(String),

    #[error("invalid number `{0}`")]
    InvalidNumber(String),

    #[error("invalid gpu request `{0}`")]
    InvalidGpus(String),
}

impl TransformError {
    /// Returns the diagnostic code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            TransformError::InvalidUlimit { .. } => ErrorCode::E200,
            TransformError::InvalidDeviceRate(_) => ErrorCode::E201,
            TransformError::InvalidDeviceWeight(_) => ErrorCode::E202,
            TransformError::InvalidNumber(_) => ErrorCode::E203,
            TransformError::InvalidGpus(_) => ErrorCode::E204,
        }
    }

    fn help(&self) -> &'static str {
        match self {
            TransformError::InvalidUlimit { .. } => {
                "use `<type>=<soft limit>[:<hard limit>]`, for example `nofile=1024:2048`"
            }
            TransformError::InvalidDeviceRate(_) => {
                "use `<device path>:<rate>`, for example `/dev/sda:1mb`"
            }
            TransformError::InvalidDeviceWeight(_) => {
                "use `<device path>:<weight>`, for example `/dev/sda:200`"
            }
            TransformError::InvalidNumber(_) => "this flag takes a numeric value",
            TransformError::InvalidGpus(_) => "use `all`, a device count, or `device=<id>[,<id>...]`",
        }
    }

    /// Build a diagnostic for the flag `flag` located at `span`.
    pub fn into_diagnostic(self, flag: &str, span: Span) -> Diagnostic {
        let code = self.code();
        let help = self.help();
        Diagnostic::error(self.to_string())
            .with_code(code)
            .with_label(span, format!("in the value of `{}`", dashed(flag)))
            .with_help(help)
    }
}

/// Returns the flag name with the dashes it would be written with.
pub(crate) fn dashed(flag: &str) -> String {
    if flag.chars().count() == 1 {
        format!("-{flag}")
    } else {
        format!("--{flag}")
    }
}

/// Turn the raw value of a flag into entries.
///
/// Switch rules accept a valueless flag; every other rule expects at least
/// one value and yields no entries without one.
///
/// # Errors
///
/// Returns a [`TransformError`] when a value fails the validation of its
/// transformer.
pub fn transform(rule: &FlagRule, raw: &RawValue) -> Result<Vec<Entry>, TransformError> {
    let path = rule.path();
    let values = raw.values();

    let Some(last) = raw.last() else {
        return Ok(match rule.transform() {
            Transform::Switch => vec![Entry::new(path, true)],
            _ => Vec::new(),
        });
    };

    let entries = match rule.transform() {
        Transform::Value => vec![Entry::new(path, last)],
        Transform::Int => vec![Entry::new(path, parse_int(last)?)],
        Transform::Float => vec![Entry::new(path, parse_float(last)?)],
        Transform::Switch => vec![Entry::new(path, last != "false")],
        Transform::Array => vec![Entry::new(path, values.to_vec())],
        Transform::Map => vec![Entry::new(
            path,
            Value::Mapping(parse_pairs(&values.join(","))),
        )],
        Transform::MapArray => values
            .iter()
            .map(|value| Entry::new(path, vec![Value::Mapping(parse_pairs(value))]))
            .collect(),
        Transform::Envs => vec![Entry::new(
            path,
            values.iter().map(|value| environment(value)).collect::<Vec<_>>(),
        )],
        Transform::Ulimits => values
            .iter()
            .map(|value| ulimit(path, value))
            .collect::<Result<_, _>>()?,
        Transform::DeviceRate => values
            .iter()
            .map(|value| device_rate(path, value))
            .collect::<Result<_, _>>()?,
        Transform::DeviceWeight => values
            .iter()
            .map(|value| device_weight(path, value))
            .collect::<Result<_, _>>()?,
        Transform::Gpus => values
            .iter()
            .map(|value| gpus(path, value))
            .collect::<Result<_, _>>()?,
        Transform::Networks => vec![network(path, last)],
        Transform::Ignore => Vec::new(),
    };

    Ok(entries)
}

fn parse_int(text: &str) -> Result<i64, TransformError> {
    text.trim()
        .parse()
        .map_err(|_| TransformError::InvalidNumber(text.to_string()))
}

fn parse_float(text: &str) -> Result<f64, TransformError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| TransformError::InvalidNumber(text.to_string()))
}

/// Integers become YAML integers, anything else stays a string.
fn coerce(text: &str) -> Value {
    match text.parse::<i64>() {
        Ok(number) => Value::from(number),
        Err(_) => Value::from(text),
    }
}

/// Parse comma separated `key=value` pairs. Bare keys map to `true`.
fn parse_pairs(text: &str) -> Mapping {
    let mut mapping = Mapping::new();
    for item in text.split(',').filter(|item| !item.is_empty()) {
        let (key, value) = match item.split_once('=') {
            Some((key, value)) => (key, coerce(value)),
            None => (item, Value::from(true)),
        };
        mapping.insert(Value::from(key), value);
    }
    mapping
}

/// Strip one pair of matching quotes around the value of `KEY=VALUE`.
fn environment(item: &str) -> String {
    let Some((key, value)) = item.split_once('=') else {
        return item.to_string();
    };

    let unquoted = ['"', '\'']
        .into_iter()
        .find_map(|quote| {
            value
                .strip_prefix(quote)
                .and_then(|inner| inner.strip_suffix(quote))
        })
        .unwrap_or(value);

    format!("{key}={unquoted}")
}

fn ulimit(path: &str, text: &str) -> Result<Entry, TransformError> {
    let invalid = |reason| TransformError::InvalidUlimit {
        value: text.to_string(),
        reason,
    };
    let limit = |value: &str| value.parse::<i64>().map_err(|_| invalid("limits must be integers"));

    let (name, limits) = text.split_once('=').ok_or_else(|| invalid("missing `=`"))?;
    if name.is_empty() {
        return Err(invalid("missing limit type"));
    }
    if limits.is_empty() {
        return Err(invalid("missing limit value"));
    }

    let path = format!("{path}/{name}");
    match limits.split_once(':') {
        Some((soft, hard)) => {
            let mut mapping = Mapping::new();
            mapping.insert(Value::from("soft"), Value::from(limit(soft)?));
            mapping.insert(Value::from("hard"), Value::from(limit(hard)?));
            Ok(Entry::new(path, Value::Mapping(mapping)))
        }
        None => Ok(Entry::new(path, limit(limits)?)),
    }
}

/// Split `<device path>:<amount>` at the last colon.
fn device_pair(text: &str) -> Option<(&str, &str)> {
    text.rsplit_once(':')
        .filter(|(device, amount)| !device.is_empty() && !amount.is_empty())
}

fn device_entry(path: &str, device: &str, key: &str, amount: Value) -> Entry {
    let mut mapping = Mapping::new();
    mapping.insert(Value::from("path"), Value::from(device));
    mapping.insert(Value::from(key), amount);
    Entry::new(path, vec![Value::Mapping(mapping)])
}

fn device_rate(path: &str, text: &str) -> Result<Entry, TransformError> {
    let invalid = || TransformError::InvalidDeviceRate(text.to_string());
    let (device, rate) = device_pair(text).ok_or_else(invalid)?;

    let digits = rate.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    Ok(device_entry(path, device, "rate", coerce(rate)))
}

fn device_weight(path: &str, text: &str) -> Result<Entry, TransformError> {
    let invalid = || TransformError::InvalidDeviceWeight(text.to_string());
    let (device, weight) = device_pair(text).ok_or_else(invalid)?;
    let weight = weight.parse::<i64>().map_err(|_| invalid())?;

    Ok(device_entry(path, device, "weight", Value::from(weight)))
}

fn gpus(path: &str, text: &str) -> Result<Entry, TransformError> {
    let mut device = Mapping::new();
    device.insert(Value::from("driver"), Value::from("nvidia"));

    if text == "all" {
        device.insert(Value::from("count"), Value::from("all"));
    } else if let Ok(count) = text.parse::<u32>() {
        device.insert(Value::from("count"), Value::from(count));
    } else if let Some(ids) = text.strip_prefix("device=") {
        let ids: Vec<_> = ids.split(',').filter(|id| !id.is_empty()).collect();
        if ids.is_empty() {
            return Err(TransformError::InvalidGpus(text.to_string()));
        }
        device.insert(Value::from("device_ids"), Value::from(ids));
    } else {
        return Err(TransformError::InvalidGpus(text.to_string()));
    }

    device.insert(Value::from("capabilities"), Value::from(vec!["gpu"]));
    Ok(Entry::new(
        format!("{path}/resources/reservations/devices"),
        vec![Value::Mapping(device)],
    ))
}

fn network(path: &str, name: &str) -> Entry {
    let is_mode = NETWORK_MODES.contains(&name)
        || name.strip_prefix("container:").is_some_and(|id| !id.is_empty());

    if is_mode {
        Entry::new(path, name)
    } else {
        Entry::new(format!("networks/{name}"), Value::Mapping(Mapping::new()))
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    fn rule(transform: Transform, path: &'static str) -> FlagRule {
        FlagRule::new(transform, path)
    }

    fn text(value: &str) -> RawValue {
        RawValue::Text(value.to_string())
    }

    fn list(values: &[&str]) -> RawValue {
        RawValue::List(values.iter().map(|value| value.to_string()).collect())
    }

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    fn single(transform: Transform, path: &'static str, raw: RawValue) -> Entry {
        let mut entries = super::transform(&rule(transform, path), &raw).unwrap();
        assert_eq!(entries.len(), 1);
        entries.remove(0)
    }

    #[test]
    fn test_value_keeps_last() {
        let entry = single(Transform::Value, "restart", list(&["always", "no"]));
        assert_eq!(entry.value(), &Value::from("no"));
    }

    #[test]
    fn test_int_and_float() {
        let entry = single(Transform::Int, "cpu_shares", text("512"));
        assert_eq!(entry.value(), &Value::from(512));

        let entry = single(Transform::Float, "deploy/resources/limits/cpus", text("1.5"));
        assert!(approx_eq!(f64, entry.value().as_f64().unwrap(), 1.5));
    }

    #[test]
    fn test_invalid_numbers() {
        for (transform, value) in [
            (Transform::Int, "512m"),
            (Transform::Float, "two"),
            (Transform::Float, "NaN"),
        ] {
            let err = super::transform(&rule(transform, "x"), &text(value)).unwrap_err();
            assert_eq!(err, TransformError::InvalidNumber(value.to_string()));
            assert_eq!(err.code(), ErrorCode::E203);
        }
    }

    #[test]
    fn test_switch() {
        let privileged = rule(Transform::Switch, "privileged");

        let entries = super::transform(&privileged, &RawValue::Switch).unwrap();
        assert_eq!(entries[0].value(), &Value::from(true));

        let entries = super::transform(&privileged, &text("false")).unwrap();
        assert_eq!(entries[0].value(), &Value::from(false));
    }

    #[test]
    fn test_valueless_non_switch_yields_nothing() {
        let entries = super::transform(&rule(Transform::Array, "ports"), &RawValue::Switch).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_array() {
        let entry = single(Transform::Array, "ports", list(&["80:80", "443:443"]));
        assert_eq!(entry.value(), &yaml("['80:80', '443:443']"));
    }

    #[test]
    fn test_map_joins_repetitions() {
        let entry = single(
            Transform::Map,
            "logging/options",
            list(&["max-size=10m,max-file=3", "compress"]),
        );
        assert_eq!(
            entry.value(),
            &yaml("{max-size: 10m, max-file: 3, compress: true}")
        );
    }

    #[test]
    fn test_map_array_one_entry_per_occurrence() {
        let entries = super::transform(
            &rule(Transform::MapArray, "volumes"),
            &list(&["type=bind,source=/src,target=/app", "type=tmpfs,target=/tmp,readonly"]),
        )
        .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0].value(),
            &yaml("[{type: bind, source: /src, target: /app}]")
        );
        assert_eq!(
            entries[1].value(),
            &yaml("[{type: tmpfs, target: /tmp, readonly: true}]")
        );
    }

    #[test]
    fn test_envs_strip_value_quotes() {
        let entry = single(
            Transform::Envs,
            "environment",
            list(&["A=\"quoted value\"", "B='x'", "PASSTHROUGH", "C=plain"]),
        );
        assert_eq!(
            entry.value(),
            &yaml("['A=quoted value', 'B=x', PASSTHROUGH, 'C=plain']")
        );
    }

    #[test]
    fn test_ulimits() {
        let entries = super::transform(
            &rule(Transform::Ulimits, "ulimits"),
            &list(&["nofile=1023:1025", "as=1024"]),
        )
        .unwrap();

        assert_eq!(entries[0].path(), "ulimits/nofile");
        assert_eq!(entries[0].value(), &yaml("{soft: 1023, hard: 1025}"));
        assert_eq!(entries[1].path(), "ulimits/as");
        assert_eq!(entries[1].value(), &Value::from(1024));
    }

    #[test]
    fn test_invalid_ulimits() {
        for value in ["nofile", "=1024", "nofile=", "nofile=a:b", "nofile=1:"] {
            let err = super::transform(&rule(Transform::Ulimits, "ulimits"), &text(value))
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::E200, "{value}");
        }
    }

    #[test]
    fn test_device_rate() {
        let entry = single(Transform::DeviceRate, "blkio_config/device_read_bps", text("/dev/sda:1mb"));
        assert_eq!(entry.value(), &yaml("[{path: /dev/sda, rate: 1mb}]"));

        let entry = single(Transform::DeviceRate, "blkio_config/device_read_iops", text("/dev/sda:1000"));
        assert_eq!(entry.value(), &yaml("[{path: /dev/sda, rate: 1000}]"));

        for value in ["/dev/sda", "/dev/sda:", ":100", "/dev/sda:fast"] {
            let err = super::transform(&rule(Transform::DeviceRate, "x"), &text(value)).unwrap_err();
            assert_eq!(err.code(), ErrorCode::E201, "{value}");
        }
    }

    #[test]
    fn test_device_weight() {
        let entry = single(Transform::DeviceWeight, "blkio_config/weight_device", text("/dev/sda:200"));
        assert_eq!(entry.value(), &yaml("[{path: /dev/sda, weight: 200}]"));

        let err = super::transform(&rule(Transform::DeviceWeight, "x"), &text("/dev/sda:heavy"))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::E202);
    }

    #[test]
    fn test_gpus() {
        let entry = single(Transform::Gpus, "deploy", text("all"));
        assert_eq!(entry.path(), "deploy/resources/reservations/devices");
        assert_eq!(
            entry.value(),
            &yaml("[{driver: nvidia, count: all, capabilities: [gpu]}]")
        );

        let entry = single(Transform::Gpus, "deploy", text("2"));
        assert_eq!(
            entry.value(),
            &yaml("[{driver: nvidia, count: 2, capabilities: [gpu]}]")
        );

        let entry = single(Transform::Gpus, "deploy", text("device=0,2"));
        assert_eq!(
            entry.value(),
            &yaml("[{driver: nvidia, device_ids: ['0', '2'], capabilities: [gpu]}]")
        );

        let err = super::transform(&rule(Transform::Gpus, "deploy"), &text("some")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::E204);
    }

    #[test]
    fn test_networks() {
        let networks = rule(Transform::Networks, "network_mode");

        for mode in ["host", "bridge", "none", "container:db"] {
            let entries = super::transform(&networks, &text(mode)).unwrap();
            assert_eq!(entries[0].path(), "network_mode");
            assert_eq!(entries[0].value(), &Value::from(mode));
        }

        let entries = super::transform(&networks, &text("backend")).unwrap();
        assert_eq!(entries[0].path(), "networks/backend");
        assert_eq!(entries[0].value(), &Value::Mapping(Mapping::new()));
    }

    #[test]
    fn test_diagnostic_carries_code_and_span() {
        let diagnostic = TransformError::InvalidGpus("some".to_string())
            .into_diagnostic("gpus", Span::new(4..15));

        assert_eq!(diagnostic.code(), Some(ErrorCode::E204));
        assert_eq!(diagnostic.labels()[0].span().range(), 4..15);
        assert_eq!(diagnostic.labels()[0].message(), "in the value of `--gpus`");
        assert_eq!(
            diagnostic.to_string(),
            "error[E204]: invalid gpu request `some`"
        );
    }
}

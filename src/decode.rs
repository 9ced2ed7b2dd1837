use std::collections::{BTreeMap, BTreeSet};

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::{AlgorandError, Value};

/// Largest integer magnitude an `f64` represents exactly (2^53 - 1).
pub(crate) const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

/// How integer literals in JSON response bodies become numeric values.
///
/// Round numbers, microalgo amounts and asset identifiers can exceed 2^53,
/// where native `f64` decoding silently rounds. The mode is chosen per
/// client and overridable per request.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum IntDecoding {
    /// Every numeric literal decodes to `f64`; oversized integers round.
    #[default]
    Default,
    /// Like `Default`, but an integer literal outside the safe range fails
    /// with [`AlgorandError::Precision`] instead of rounding.
    Safe,
    /// Integer literals under allow-listed field names decode to `BigInt`;
    /// everything else stays native. See [`BigIntFields`].
    MixedBigInt,
    /// Every integer literal decodes to `BigInt`. Fractional and exponent
    /// literals stay `f64`.
    BigInt,
}

/// Field names whose integer literals are promoted to `BigInt` under
/// [`IntDecoding::MixedBigInt`].
///
/// This is configuration data, not decoding logic. The default set covers
/// the Algorand API fields that can exceed the safe range; callers extend
/// it with [`BigIntFields::insert`] or replace it wholesale, including from
/// serialized configuration.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct BigIntFields {
    fields: BTreeSet<String>,
}

impl BigIntFields {
    /// Empty allow-list: `MixedBigInt` behaves like `Default`.
    pub fn empty() -> Self {
        Self {
            fields: BTreeSet::new(),
        }
    }

    /// Round, balance and identifier fields from the algod/indexer schemas.
    pub fn algorand_defaults() -> Self {
        [
            "amount",
            "amount-without-pending-rewards",
            "application-id",
            "asset-id",
            "confirmed-round",
            "current-round",
            "first-valid",
            "id",
            "index",
            "last-round",
            "last-valid",
            "min-balance",
            "pending-rewards",
            "rewards",
            "round",
            "total",
            "uint",
        ]
        .into_iter()
        .collect()
    }

    pub fn insert(&mut self, field: impl Into<String>) {
        self.fields.insert(field.into());
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for BigIntFields {
    fn default() -> Self {
        Self::algorand_defaults()
    }
}

impl<S: Into<String>> FromIterator<S> for BigIntFields {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Decodes a JSON response body under the given integer decoding mode.
///
/// Pure and deterministic: the same body, mode and field set always yield
/// the same tree, and the tree mirrors the body's structure exactly.
/// Numeric literals are read literal-exact before any mode logic applies,
/// so a `BigInt` promotion never goes through an `f64` intermediate.
pub fn decode_body(
    body: &str,
    mode: IntDecoding,
    big_int_fields: &BigIntFields,
) -> Result<Value, AlgorandError> {
    let raw: serde_json::Value = serde_json::from_str(body)
        .map_err(|err| AlgorandError::Decode(format!("invalid response JSON: {err}")))?;
    decode_tree(raw, mode, big_int_fields, None)
}

fn decode_tree(
    raw: serde_json::Value,
    mode: IntDecoding,
    big_int_fields: &BigIntFields,
    field: Option<&str>,
) -> Result<Value, AlgorandError> {
    match raw {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(value) => Ok(Value::Bool(value)),
        serde_json::Value::Number(number) => decode_number(&number, mode, big_int_fields, field),
        serde_json::Value::String(value) => Ok(Value::String(value)),
        // Array elements inherit the nearest enclosing object key.
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| decode_tree(item, mode, big_int_fields, field))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_json::Value::Object(entries) => {
            let mut object = BTreeMap::new();
            for (key, item) in entries {
                let decoded = decode_tree(item, mode, big_int_fields, Some(&key))?;
                object.insert(key, decoded);
            }
            Ok(Value::Object(object))
        }
    }
}

fn decode_number(
    number: &serde_json::Number,
    mode: IntDecoding,
    big_int_fields: &BigIntFields,
    field: Option<&str>,
) -> Result<Value, AlgorandError> {
    // With serde_json's arbitrary_precision feature this is the exact
    // literal from the wire, not a round-tripped float.
    let literal = number.to_string();
    let is_integer = !literal.contains(['.', 'e', 'E']);

    let promote = match mode {
        IntDecoding::Default => false,
        IntDecoding::Safe => {
            if is_integer && exceeds_safe_range(&literal) {
                return Err(AlgorandError::Precision { literal });
            }
            false
        }
        IntDecoding::MixedBigInt => {
            is_integer && field.is_some_and(|name| big_int_fields.contains(name))
        }
        IntDecoding::BigInt => is_integer,
    };

    if promote {
        let value = literal.parse::<BigInt>().map_err(|err| {
            AlgorandError::Decode(format!("invalid integer literal '{literal}': {err}"))
        })?;
        return Ok(Value::BigInt(value));
    }

    let value = literal.parse::<f64>().map_err(|err| {
        AlgorandError::Decode(format!("invalid numeric literal '{literal}': {err}"))
    })?;
    Ok(Value::Number(value))
}

fn exceeds_safe_range(literal: &str) -> bool {
    match literal.parse::<i64>() {
        Ok(value) => value.unsigned_abs() > MAX_SAFE_INTEGER as u64,
        // Overflowing i64 puts the literal far past 2^53.
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;

    use crate::{
        decode::{decode_body, BigIntFields},
        AlgorandError, IntDecoding, Value,
    };

    fn big(literal: &str) -> Value {
        Value::BigInt(literal.parse::<BigInt>().expect("must parse"))
    }

    #[test]
    fn default_mode_rounds_above_the_safe_range() {
        let decoded = decode_body(
            r#"{"round":9007199254740993}"#,
            IntDecoding::Default,
            &BigIntFields::default(),
        )
        .expect("must decode");

        assert_eq!(
            decoded.get("round"),
            Some(&Value::Number(9007199254740992.0))
        );
    }

    #[test]
    fn safe_mode_rejects_above_the_safe_range() {
        let err = decode_body(
            r#"{"round":9007199254740993}"#,
            IntDecoding::Safe,
            &BigIntFields::default(),
        )
        .expect_err("must fail");

        assert!(matches!(
            err,
            AlgorandError::Precision { literal } if literal == "9007199254740993"
        ));
    }

    #[test]
    fn safe_mode_accepts_both_boundaries() {
        let decoded = decode_body(
            r#"{"hi":9007199254740991,"lo":-9007199254740991}"#,
            IntDecoding::Safe,
            &BigIntFields::default(),
        )
        .expect("must decode");

        assert_eq!(decoded.get("hi"), Some(&Value::Number(9007199254740991.0)));
        assert_eq!(decoded.get("lo"), Some(&Value::Number(-9007199254740991.0)));
    }

    #[test]
    fn mixed_mode_promotes_allow_listed_fields_only() {
        let decoded = decode_body(
            r#"{"round":9007199254740993,"note":5}"#,
            IntDecoding::MixedBigInt,
            &BigIntFields::default(),
        )
        .expect("must decode");

        assert_eq!(decoded.get("round"), Some(&big("9007199254740993")));
        assert_eq!(decoded.get("note"), Some(&Value::Number(5.0)));
    }

    #[test]
    fn mixed_mode_array_elements_inherit_the_enclosing_field() {
        let decoded = decode_body(
            r#"{"round":[1,9007199254740993],"note":[2]}"#,
            IntDecoding::MixedBigInt,
            &BigIntFields::default(),
        )
        .expect("must decode");

        assert_eq!(
            decoded.get("round"),
            Some(&Value::Array(vec![big("1"), big("9007199254740993")]))
        );
        assert_eq!(
            decoded.get("note"),
            Some(&Value::Array(vec![Value::Number(2.0)]))
        );
    }

    #[test]
    fn mixed_mode_top_level_number_has_no_field_and_stays_native() {
        let decoded = decode_body(
            "9007199254740993",
            IntDecoding::MixedBigInt,
            &BigIntFields::default(),
        )
        .expect("must decode");

        assert_eq!(decoded, Value::Number(9007199254740992.0));
    }

    #[test]
    fn bigint_mode_promotes_integers_but_not_float_literals() {
        let decoded = decode_body(
            r#"{"ids":[1,2],"ratio":1.5,"exp":1e3}"#,
            IntDecoding::BigInt,
            &BigIntFields::empty(),
        )
        .expect("must decode");

        assert_eq!(
            decoded.get("ids"),
            Some(&Value::Array(vec![big("1"), big("2")]))
        );
        assert_eq!(decoded.get("ratio"), Some(&Value::Number(1.5)));
        assert_eq!(decoded.get("exp"), Some(&Value::Number(1000.0)));
    }

    #[test]
    fn decoding_is_deterministic() {
        let body = r#"{"a":{"round":18446744073709551615},"b":[null,true,"x"]}"#;
        let first = decode_body(body, IntDecoding::MixedBigInt, &BigIntFields::default())
            .expect("must decode");
        let second = decode_body(body, IntDecoding::MixedBigInt, &BigIntFields::default())
            .expect("must decode");

        assert_eq!(first, second);
        assert_eq!(
            first.get("a").and_then(|a| a.get("round")),
            Some(&big("18446744073709551615"))
        );
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let err = decode_body("{", IntDecoding::Default, &BigIntFields::default())
            .expect_err("must fail");
        assert!(matches!(err, AlgorandError::Decode(_)));
    }

    #[test]
    fn allow_list_round_trips_as_configuration() {
        let fields: BigIntFields = ["round", "custom-counter"].into_iter().collect();
        let encoded = serde_json::to_string(&fields).expect("must encode");
        let restored: BigIntFields = serde_json::from_str(&encoded).expect("must parse");

        assert_eq!(fields, restored);
        assert!(restored.contains("custom-counter"));
        assert!(BigIntFields::default().contains("round"));
    }
}

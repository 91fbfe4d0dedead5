use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serializer, de};

/// Implements `Serialize` and `Deserialize` for a type through its `Display` and `FromStr` impls.
macro_rules! impl_str_serde {
    ($type:ty, $expectation:expr) => {
        impl ::serde::ser::Serialize for $type {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: ::serde::ser::Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> ::serde::de::Deserialize<'de> for $type {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::de::Deserializer<'de>,
            {
                struct V;

                impl ::serde::de::Visitor<'_> for V {
                    type Value = $type;

                    fn expecting(
                        &self,
                        formatter: &mut ::std::fmt::Formatter<'_>,
                    ) -> ::std::fmt::Result {
                        formatter.write_str($expectation)
                    }

                    fn visit_str<E>(self, value: &str) -> Result<$type, E>
                    where
                        E: ::serde::de::Error,
                    {
                        value.parse().map_err(|_| {
                            ::serde::de::Error::invalid_value(
                                ::serde::de::Unexpected::Str(value),
                                &self,
                            )
                        })
                    }
                }

                deserializer.deserialize_str(V)
            }
        }
    };
}

pub(crate) use impl_str_serde;

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber<T> {
    String(String),
    Number(T),
}

/// Accepts a number either as a JSON number or as a string containing one.
pub fn deserialize_number_from_string<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    D: de::Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    <T as FromStr>::Err: Display,
{
    match StringOrNumber::<T>::deserialize(deserializer)? {
        StringOrNumber::String(s) => s.parse::<T>().map_err(de::Error::custom),
        StringOrNumber::Number(n) => Ok(n),
    }
}

/// Like [`deserialize_number_from_string`], but for optional fields. Empty strings map to `None`.
pub fn deserialize_opt_number_from_string<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: de::Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    <T as FromStr>::Err: Display,
{
    match Option::<StringOrNumber<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(StringOrNumber::String(s)) if s.is_empty() => Ok(None),
        Some(StringOrNumber::String(s)) => s.parse::<T>().map(Some).map_err(de::Error::custom),
        Some(StringOrNumber::Number(n)) => Ok(Some(n)),
    }
}

/// Accepts thread identifiers sent as JSON numbers and stores them as strings.
pub fn deserialize_string_from_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: de::Deserializer<'de>,
{
    match StringOrNumber::<u64>::deserialize(deserializer)? {
        StringOrNumber::String(s) => Ok(s),
        StringOrNumber::Number(n) => Ok(n.to_string()),
    }
}

/// Serializes a value through its `Display` impl, used for nanosecond counts that exceed the
/// safe integer range of JavaScript consumers.
pub fn serialize_as_string<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

pub fn is_zero(n: &u64) -> bool {
    *n == 0
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Numbers {
        #[serde(deserialize_with = "deserialize_number_from_string")]
        required: u64,
        #[serde(default, deserialize_with = "deserialize_opt_number_from_string")]
        optional: Option<u32>,
        #[serde(deserialize_with = "deserialize_string_from_number")]
        thread: String,
    }

    #[test]
    fn test_numbers_from_strings() {
        let numbers: Numbers =
            serde_json::from_str(r#"{"required": "42", "optional": "7", "thread": 259}"#).unwrap();

        assert_eq!(numbers.required, 42);
        assert_eq!(numbers.optional, Some(7));
        assert_eq!(numbers.thread, "259");
    }

    #[test]
    fn test_missing_and_empty_optional() {
        let numbers: Numbers =
            serde_json::from_str(r#"{"required": 1, "thread": "main"}"#).unwrap();
        assert_eq!(numbers.optional, None);

        let numbers: Numbers =
            serde_json::from_str(r#"{"required": 1, "optional": "", "thread": "main"}"#).unwrap();
        assert_eq!(numbers.optional, None);
    }

    #[test]
    fn test_invalid_number_string() {
        let result = serde_json::from_str::<Numbers>(r#"{"required": "abc", "thread": "1"}"#);
        assert!(result.is_err());
    }
}

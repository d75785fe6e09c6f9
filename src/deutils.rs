// src/deutils.rs
use serde::{Deserialize, Deserializer};

/// The config file has always carried flags as 0/1; accept bools and strings too.
#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
    Str(String),
}

fn flag_to_bool<E: serde::de::Error>(flag: Flag) -> Result<bool, E> {
    match flag {
        Flag::Bool(b) => Ok(b),
        Flag::Int(i) => Ok(i != 0),
        Flag::Str(s) => {
            let s = s.trim().to_lowercase();
            match s.as_str() {
                "1" | "true" | "yes" | "y" | "t" | "on" => Ok(true),
                "0" | "false" | "no" | "n" | "f" | "off" => Ok(false),
                _ => Err(E::invalid_value(
                    serde::de::Unexpected::Str(&s),
                    &"expected boolean representation",
                )),
            }
        }
    }
}

pub fn deserialize_opt_bool_from_anything<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Flag>::deserialize(deserializer)? {
        Some(flag) => flag_to_bool(flag).map(Some),
        None => Ok(None),
    }
}

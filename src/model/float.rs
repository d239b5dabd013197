// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Serde representation of floats that survives JSON.
//!
//! JSON has no literal for NaN or the infinities, and `serde_json` writes them as `null`.
//! Finite values stay plain numbers; the non-finite ones are written as the strings `"NaN"`,
//! `"Infinity"` and `"-Infinity"`. Use with `serialize_with`/`deserialize_with` on `f32` and
//! `f64` fields, or the [`vec`] functions on vectors of them.

use schemars::JsonSchema;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub trait WireFloat: Copy {
    fn to_f64(self) -> f64;
    fn from_f64(value: f64) -> Self;
    fn serialize_number<S: Serializer>(self, serializer: S) -> Result<S::Ok, S::Error>;
}

impl WireFloat for f32 {
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn serialize_number<S: Serializer>(self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f32(self)
    }
}

impl WireFloat for f64 {
    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> Self {
        value
    }

    fn serialize_number<S: Serializer>(self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self)
    }
}

/// Schema and parse form of one float.
#[derive(Debug, Clone, Copy, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FloatRepr {
    Number(f64),
    Named(NonFinite),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
pub enum NonFinite {
    NaN,
    Infinity,
    #[serde(rename = "-Infinity")]
    NegInfinity,
}

impl NonFinite {
    fn of(value: f64) -> Option<Self> {
        if value.is_nan() {
            Some(Self::NaN)
        } else if value == f64::INFINITY {
            Some(Self::Infinity)
        } else if value == f64::NEG_INFINITY {
            Some(Self::NegInfinity)
        } else {
            None
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::NaN => "NaN",
            Self::Infinity => "Infinity",
            Self::NegInfinity => "-Infinity",
        }
    }

    fn value(self) -> f64 {
        match self {
            Self::NaN => f64::NAN,
            Self::Infinity => f64::INFINITY,
            Self::NegInfinity => f64::NEG_INFINITY,
        }
    }
}

impl FloatRepr {
    fn into_float<F: WireFloat>(self) -> F {
        match self {
            Self::Number(value) => F::from_f64(value),
            Self::Named(name) => F::from_f64(name.value()),
        }
    }
}

struct Item<F>(F);

impl<F: WireFloat> Serialize for Item<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match NonFinite::of(self.0.to_f64()) {
            Some(name) => serializer.serialize_str(name.as_str()),
            None => self.0.serialize_number(serializer),
        }
    }
}

pub fn serialize<F: WireFloat, S: Serializer>(value: &F, serializer: S) -> Result<S::Ok, S::Error> {
    Item(*value).serialize(serializer)
}

pub fn deserialize<'de, F: WireFloat, D: Deserializer<'de>>(deserializer: D) -> Result<F, D::Error> {
    FloatRepr::deserialize(deserializer)
        .map(FloatRepr::into_float)
        .map_err(|_| D::Error::custom("expected a number, \"NaN\", \"Infinity\" or \"-Infinity\""))
}

pub mod vec {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{FloatRepr, Item, WireFloat};

    #[allow(clippy::ptr_arg)]
    pub fn serialize<F: WireFloat, S: Serializer>(values: &Vec<F>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|value| Item(*value)))
    }

    pub fn deserialize<'de, F: WireFloat, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<F>, D::Error> {
        Vec::<FloatRepr>::deserialize(deserializer)
            .map(|items| items.into_iter().map(FloatRepr::into_float).collect())
            .map_err(|_| D::Error::custom("expected a list of numbers, \"NaN\", \"Infinity\" or \"-Infinity\""))
    }
}

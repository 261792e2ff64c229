//! (De)serialization helpers.
//!
//! Scalars and group elements are serialized in their canonical byte forms; for
//! human-readable formats (JSON, YAML, TOML, etc.) the bytes are encoded as
//! base64-url strings without padding, for binary formats they are emitted
//! directly.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{
    de::{Error as DeError, Unexpected},
    Deserialize, Deserializer, Serializer,
};

use std::marker::PhantomData;

use crate::group::Group;

fn serialize_bytes<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    if serializer.is_human_readable() {
        serializer.serialize_str(&Base64UrlUnpadded::encode_string(value))
    } else {
        serializer.serialize_bytes(value)
    }
}

fn deserialize_bytes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    if deserializer.is_human_readable() {
        let encoded = String::deserialize(deserializer)?;
        Base64UrlUnpadded::decode_vec(&encoded)
            .map_err(|_| D::Error::invalid_value(Unexpected::Str(&encoded), &"base64url data"))
    } else {
        Vec::<u8>::deserialize(deserializer)
    }
}

fn de_error<E: DeError>(what: &'static str) -> E {
    E::custom(format!("invalid {what}"))
}

/// Helper for `#[serde(with)]`-based (de)serialization of scalars.
pub(crate) struct ScalarHelper<G>(PhantomData<G>);

impl<G: Group> ScalarHelper<G> {
    pub fn serialize<S: Serializer>(
        scalar: &G::Scalar,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut bytes = Vec::with_capacity(G::SCALAR_SIZE);
        G::serialize_scalar(scalar, &mut bytes);
        serialize_bytes(&bytes, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<G::Scalar, D::Error> {
        let bytes = deserialize_bytes(deserializer)?;
        G::deserialize_scalar(&bytes)
            .ok_or_else(|| de_error::<D::Error>("scalar"))
    }
}

/// Helper for `#[serde(with)]`-based (de)serialization of group elements.
pub(crate) struct ElementHelper<G>(PhantomData<G>);

impl<G: Group> ElementHelper<G> {
    pub fn serialize<S: Serializer>(
        element: &G::Element,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut bytes = Vec::with_capacity(G::ELEMENT_SIZE);
        G::serialize_element(element, &mut bytes);
        serialize_bytes(&bytes, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<G::Element, D::Error> {
        let bytes = deserialize_bytes(deserializer)?;
        G::deserialize_element(&bytes)
            .ok_or_else(|| de_error::<D::Error>("group element"))
    }
}

fn serialize_items<S: Serializer, I: IntoIterator<Item = Vec<u8>>>(
    items: I,
    len: usize,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeSeq;

    let human_readable = serializer.is_human_readable();
    let mut seq = serializer.serialize_seq(Some(len))?;
    for bytes in items {
        if human_readable {
            seq.serialize_element(&Base64UrlUnpadded::encode_string(&bytes))?;
        } else {
            seq.serialize_element(&bytes)?;
        }
    }
    seq.end()
}

fn deserialize_items<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<Vec<u8>>, D::Error> {
    if deserializer.is_human_readable() {
        let items = Vec::<String>::deserialize(deserializer)?;
        items
            .into_iter()
            .map(|encoded| {
                Base64UrlUnpadded::decode_vec(&encoded).map_err(|_| {
                    D::Error::invalid_value(Unexpected::Str(&encoded), &"base64url data")
                })
            })
            .collect()
    } else {
        Vec::<Vec<u8>>::deserialize(deserializer)
    }
}

/// Helper for `#[serde(with)]`-based (de)serialization of scalar vectors.
pub(crate) struct ScalarVecHelper<G>(PhantomData<G>);

impl<G: Group> ScalarVecHelper<G> {
    pub fn serialize<S: Serializer>(
        scalars: &[G::Scalar],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let items = scalars.iter().map(|scalar| {
            let mut bytes = Vec::with_capacity(G::SCALAR_SIZE);
            G::serialize_scalar(scalar, &mut bytes);
            bytes
        });
        serialize_items(items, scalars.len(), serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<G::Scalar>, D::Error> {
        deserialize_items(deserializer)?
            .into_iter()
            .map(|bytes| {
                G::deserialize_scalar(&bytes)
                    .ok_or_else(|| de_error::<D::Error>("scalar"))
            })
            .collect()
    }
}

/// Helper for `#[serde(with)]`-based (de)serialization of element vectors.
pub(crate) struct ElementVecHelper<G>(PhantomData<G>);

impl<G: Group> ElementVecHelper<G> {
    pub fn serialize<S: Serializer>(
        elements: &[G::Element],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let items = elements.iter().map(|element| {
            let mut bytes = Vec::with_capacity(G::ELEMENT_SIZE);
            G::serialize_element(element, &mut bytes);
            bytes
        });
        serialize_items(items, elements.len(), serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<G::Element>, D::Error> {
        deserialize_items(deserializer)?
            .into_iter()
            .map(|bytes| {
                G::deserialize_element(&bytes)
                    .ok_or_else(|| de_error::<D::Error>("group element"))
            })
            .collect()
    }
}

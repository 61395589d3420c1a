//! Self-describing payload codec.
//!
//! A payload is written as a JSON [`TypeWrapper`] whose `typeName` names the
//! payload's Rust type and whose `payload` is the JSON encoding of the payload
//! itself, stored as a string:
//!
//! ```text
//! {"typeName":"translations.ProjectCreated","payload":"{\"id\":\"p1\",\"name\":\"Demo\"}"}
//! ```
//!
//! The decoder does not know in advance which type is encoded. Each decode
//! site supplies the [`Candidates`] it is willing to accept; the first
//! candidate whose tag matches exactly wins.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// Outer envelope of an encoded payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeWrapper {
    /// Tag of the payload's concrete type.
    #[serde(rename = "typeName")]
    pub type_name: String,
    /// JSON encoding of the payload.
    pub payload: String,
}

/// Binds a stable wire tag to a payload type.
///
/// The tag belongs to the type, so [`encode`] never takes a label from its
/// caller.
pub trait Tagged {
    /// Wire tag for this type.
    const TYPE_NAME: &'static str;
}

/// Encodes `payload` into a tagged wrapper string.
///
/// # Errors
///
/// Returns `CodecError::Malformed` if the payload cannot be serialized.
pub fn encode<T>(payload: &T) -> Result<String, CodecError>
where
    T: Tagged + Serialize,
{
    let wrapper = TypeWrapper {
        type_name: T::TYPE_NAME.to_owned(),
        payload: serde_json::to_string(payload)?,
    };
    Ok(serde_json::to_string(&wrapper)?)
}

/// Returns the type tag of an encoded payload without decoding the payload.
///
/// # Errors
///
/// Returns `CodecError::Malformed` if the wrapper is not valid JSON.
pub fn peek_type_name(wire: &str) -> Result<String, CodecError> {
    let wrapper: TypeWrapper = serde_json::from_str(wire)?;
    Ok(wrapper.type_name)
}

type DecodeFn<T> = Box<dyn Fn(&str) -> Result<T, serde_json::Error> + Send + Sync>;

/// Ordered set of payload types a decode site accepts, each mapped into the
/// caller's result type `T`.
pub struct Candidates<T> {
    decoders: Vec<(&'static str, DecodeFn<T>)>,
}

impl<T: 'static> Candidates<T> {
    /// Creates an empty candidate set. Decoding against it always fails with
    /// `NoTypeMatch`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            decoders: Vec::new(),
        }
    }

    /// Adds payload type `P`, converted into `T` by `wrap` once decoded.
    #[must_use]
    pub fn with<P, F>(mut self, wrap: F) -> Self
    where
        P: Tagged + DeserializeOwned + 'static,
        F: Fn(P) -> T + Send + Sync + 'static,
    {
        let decode: DecodeFn<T> =
            Box::new(move |raw: &str| serde_json::from_str::<P>(raw).map(&wrap));
        self.decoders.push((P::TYPE_NAME, decode));
        self
    }

    /// Tags of all candidates, in scan order.
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.decoders.iter().map(|(name, _)| *name)
    }

    /// Decodes `wire` against the first candidate whose tag matches.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Malformed` if the wrapper or the payload is not
    /// valid JSON for the matched type, and `CodecError::NoTypeMatch` if no
    /// candidate's tag equals the wrapper's tag.
    pub fn decode(&self, wire: &str) -> Result<T, CodecError> {
        let wrapper: TypeWrapper = serde_json::from_str(wire)?;
        let Some((_, decode)) = self
            .decoders
            .iter()
            .find(|(name, _)| *name == wrapper.type_name)
        else {
            return Err(CodecError::NoTypeMatch {
                type_name: wrapper.type_name,
            });
        };
        Ok(decode(&wrapper.payload)?)
    }
}

impl<T: 'static> Default for Candidates<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Candidates<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.decoders.iter().map(|(name, _)| name))
            .finish()
    }
}

use serde::de::DeserializeOwned;
use tracing::warn;

use super::codec::Codec;
use super::{ResultShape, SnoozeError};

/// The result of one endpoint call, laid out by its [`ResultShape`].
///
/// The payload is `None` when the shape has no payload output, when an error occurred,
/// or when the response content type is not supported.
/// The error is always `None` when the shape has no error output.
#[derive(Debug)]
pub struct Outcome<T> {
    payload: Option<T>,
    error: Option<SnoozeError>,
    arity: usize,
}

impl<T> Outcome<T> {
    /// The decoded payload.
    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    /// The call error.
    pub fn error(&self) -> Option<&SnoozeError> {
        self.error.as_ref()
    }

    /// Number of declared outputs of the endpoint.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Splits the outcome into its payload and its error.
    pub fn into_parts(self) -> (Option<T>, Option<SnoozeError>) {
        (self.payload, self.error)
    }

    /// Converts into the `Result<T, E>` declared by an endpoint.
    ///
    /// A missing payload without error becomes `T::default()`.
    ///
    /// # Errors
    ///
    /// Returns the call error, converted into `E`.
    pub fn into_result<E>(self) -> Result<T, E>
    where
        T: Default,
        E: From<SnoozeError>,
    {
        match self.error {
            Some(error) => Err(E::from(error)),
            None => Ok(self.payload.unwrap_or_default()),
        }
    }

    /// Converts into the bare payload declared by an endpoint without error output.
    pub fn into_payload(self) -> T
    where
        T: Default,
    {
        if let Some(error) = &self.error {
            warn!(%error, "error dropped, the payload is the default value");
        }
        self.payload.unwrap_or_default()
    }
}

impl ResultShape {
    /// Builds the outcome of a call.
    ///
    /// - the error goes to the error output, or is logged and dropped if there is none;
    /// - `bytes` are decoded with the codec of `content_type` if there is a payload output.
    ///   A decoding failure restarts the build with that error and no bytes.
    pub fn build<T>(
        &self,
        error: Option<SnoozeError>,
        content_type: &str,
        bytes: Option<&[u8]>,
    ) -> Outcome<T>
    where
        T: DeserializeOwned,
    {
        let mut outcome = Outcome {
            payload: None,
            error: None,
            arity: self.arity(),
        };

        if let Some(error) = error {
            if self.error_slot().is_some() {
                outcome.error = Some(error);
            } else {
                warn!(%error, "endpoint declares no error output, error discarded");
            }
        }

        if self.payload_slot().is_some()
            && let Some(bytes) = bytes
        {
            match Codec::decode(content_type, bytes) {
                Ok(payload) => outcome.payload = payload,
                Err(error) => return self.build(Some(error), content_type, None),
            }
        }

        outcome
    }
}

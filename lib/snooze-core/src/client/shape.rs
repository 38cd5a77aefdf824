/// Kind of one declared output of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The decoded response body.
    Payload,
    /// The call error.
    Error,
}

/// Rejected output declarations.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum ShapeError {
    /// More than one output would receive the response body.
    #[display("at most one payload output is supported, found one at {first} and {second}")]
    MultiplePayloads {
        /// Position of the first payload output.
        first: usize,
        /// Position of the second payload output.
        second: usize,
    },

    /// More than one output is an error.
    #[display("at most one error output is supported, found one at {first} and {second}")]
    MultipleErrors {
        /// Position of the first error output.
        first: usize,
        /// Position of the second error output.
        second: usize,
    },
}

/// Layout of the declared outputs of an endpoint.
///
/// Tells which output position receives the payload and which one receives the error.
/// A `Result<T, E>` return is seen as the two outputs `(T, E)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultShape {
    error_slot: Option<usize>,
    payload_slot: Option<usize>,
    arity: usize,
}

impl ResultShape {
    /// `Result<T, E>`: payload then error.
    pub const PAYLOAD_AND_ERROR: Self = Self::new(Some(1), Some(0), 2);
    /// `Result<(), E>`: only an error.
    pub const ERROR_ONLY: Self = Self::new(Some(0), None, 1);
    /// `T`: only a payload, errors are discarded.
    pub const PAYLOAD_ONLY: Self = Self::new(None, Some(0), 1);
    /// `()`: nothing is returned, errors are discarded.
    pub const EMPTY: Self = Self::new(None, None, 0);

    /// Creates a shape from already validated slot positions.
    #[must_use]
    pub const fn new(error_slot: Option<usize>, payload_slot: Option<usize>, arity: usize) -> Self {
        Self {
            error_slot,
            payload_slot,
            arity,
        }
    }

    /// Derives the shape of a list of declared outputs.
    ///
    /// # Errors
    ///
    /// Returns a [`ShapeError`] if more than one payload or more than one error output is declared.
    ///
    /// # Example
    ///
    /// ```rust
    /// use snooze_core::{ResultShape, Slot};
    ///
    /// let shape = ResultShape::from_slots(&[Slot::Payload, Slot::Error])?;
    /// assert_eq!(shape, ResultShape::PAYLOAD_AND_ERROR);
    /// # Ok::<(), snooze_core::ShapeError>(())
    /// ```
    pub fn from_slots(slots: &[Slot]) -> Result<Self, ShapeError> {
        let mut error_slot = None;
        let mut payload_slot = None;
        for (position, slot) in slots.iter().enumerate() {
            match slot {
                Slot::Payload => {
                    if let Some(first) = payload_slot {
                        return Err(ShapeError::MultiplePayloads {
                            first,
                            second: position,
                        });
                    }
                    payload_slot = Some(position);
                }
                Slot::Error => {
                    if let Some(first) = error_slot {
                        return Err(ShapeError::MultipleErrors {
                            first,
                            second: position,
                        });
                    }
                    error_slot = Some(position);
                }
            }
        }

        Ok(Self::new(error_slot, payload_slot, slots.len()))
    }

    /// Position of the error output, if declared.
    #[must_use]
    pub const fn error_slot(&self) -> Option<usize> {
        self.error_slot
    }

    /// Position of the payload output, if declared.
    #[must_use]
    pub const fn payload_slot(&self) -> Option<usize> {
        self.payload_slot
    }

    /// Number of declared outputs.
    #[must_use]
    pub const fn arity(&self) -> usize {
        self.arity
    }
}

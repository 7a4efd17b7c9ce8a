use crate::error::AutogradError;

/// Forward-pass record of a single operation invocation.
///
/// An operation fills it during `forward` with whatever its backward step will
/// need, and reads it back when the graph is differentiated. When `no_grad` is
/// set nothing is ever stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Context<T> {
    no_grad: bool,
    saved_values: Option<Vec<T>>,
}

impl<T> Context<T> {
    pub fn new(no_grad: bool) -> Self {
        Context {
            no_grad,
            saved_values: None,
        }
    }

    pub fn no_grad(&self) -> bool {
        self.no_grad
    }

    /// Stores `values` for the backward pass, replacing anything saved before.
    /// No-op when `no_grad` is set.
    pub fn save_for_backward<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        if self.no_grad {
            return;
        }
        self.saved_values = Some(values.into_iter().collect());
    }

    /// The saved snapshot, empty if nothing was stored.
    pub fn saved_tensors(&self) -> &[T] {
        self.saved_values.as_deref().unwrap_or(&[])
    }

    /// The saved snapshot, checked to hold at least `expected` values.
    ///
    /// Backward implementations go through this accessor so that a node whose
    /// forward ran under `no_grad` surfaces an error instead of indexing an
    /// empty slice.
    pub fn saved_values(&self, expected: usize) -> Result<&[T], AutogradError> {
        let saved = self.saved_tensors();
        if saved.len() < expected {
            return Err(AutogradError::InvalidContext {
                expected,
                found: saved.len(),
            });
        }
        Ok(saved)
    }
}

impl<T> Default for Context<T> {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;

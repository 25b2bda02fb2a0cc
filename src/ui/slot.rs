/// A live chart widget that owns rendering resources.
pub trait Destroy {
    fn destroy(&mut self);
}

/// Holds at most one live chart. The previous instance is always destroyed
/// before its successor is created or installed.
pub struct ChartSlot<I: Destroy> {
    current: Option<I>,
}

impl<I: Destroy> Default for ChartSlot<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Destroy> ChartSlot<I> {
    pub fn new() -> Self {
        Self { current: None }
    }

    pub fn is_occupied(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&I> {
        self.current.as_ref()
    }

    pub fn replace(&mut self, next: I) {
        self.teardown();
        self.current = Some(next);
    }

    /// Destroys the current instance, then runs `create`. On failure the slot
    /// stays empty.
    pub fn replace_with<E, F>(&mut self, create: F) -> Result<(), E>
    where
        F: FnOnce() -> Result<I, E>,
    {
        self.teardown();
        self.current = Some(create()?);
        Ok(())
    }

    pub fn teardown(&mut self) {
        if let Some(mut previous) = self.current.take() {
            previous.destroy();
        }
    }
}

impl<I: Destroy> Drop for ChartSlot<I> {
    fn drop(&mut self) {
        self.teardown();
    }
}

//! Release-once guard for the source and sink of a run

use std::fmt::Display;

use tracing::debug;

/// Owns a resource and the function that releases it.
///
/// `release` runs the function at most once. If the guard is dropped first
/// (early return or unwinding) it runs on drop, and any error is logged.
pub(crate) struct Scoped<R, E, F>
where
    F: FnMut(&mut R) -> Result<(), E>,
    E: Display,
{
    resource: R,
    release: F,
    released: bool,
    name: &'static str,
}

impl<R, E, F> Scoped<R, E, F>
where
    F: FnMut(&mut R) -> Result<(), E>,
    E: Display,
{
    pub(crate) fn new(name: &'static str, resource: R, release: F) -> Self {
        Scoped {
            resource,
            release,
            released: false,
            name,
        }
    }

    pub(crate) fn get_mut(&mut self) -> &mut R {
        &mut self.resource
    }

    #[cfg(test)]
    pub(crate) fn is_released(&self) -> bool {
        self.released
    }

    /// Release now. Later calls (and the drop) do nothing.
    pub(crate) fn release(&mut self) -> Result<(), E> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        (self.release)(&mut self.resource)
    }
}

impl<R, E, F> Drop for Scoped<R, E, F>
where
    F: FnMut(&mut R) -> Result<(), E>,
    E: Display,
{
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            debug!(resource = self.name, error = %err, "release on drop failed");
        }
    }
}

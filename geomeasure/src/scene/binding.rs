use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Value of an entity field.
///
/// A field is either set to a fixed value, or bound to a function that is evaluated every time the value is read
/// (every frame for the rendering host). Live bindings are used to make the entities follow the pointer while a
/// tool is capturing points.
pub enum Binding<T> {
    /// Fixed value.
    Fixed(T),
    /// Value computed on every read.
    Live(Arc<dyn Fn() -> T + Send + Sync>),
}

impl<T: Clone> Binding<T> {
    /// Creates a fixed binding.
    pub fn fixed(value: T) -> Self {
        Self::Fixed(value)
    }

    /// Creates a live binding evaluating the given function.
    pub fn live(f: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self::Live(Arc::new(f))
    }

    /// Current value of the binding.
    pub fn value(&self) -> T {
        match self {
            Self::Fixed(value) => value.clone(),
            Self::Live(f) => f(),
        }
    }

    /// Returns true if the value is recomputed on every read.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }

    /// Replaces a live binding with its current value. Does nothing for fixed bindings.
    pub fn freeze(&mut self) {
        if let Self::Live(f) = self {
            *self = Self::Fixed(f());
        }
    }
}

impl<T: Clone> Clone for Binding<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Fixed(value) => Self::Fixed(value.clone()),
            Self::Live(f) => Self::Live(f.clone()),
        }
    }
}

impl<T: Debug> Debug for Binding<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Self::Live(_) => f.write_str("Live(..)"),
        }
    }
}

impl<T: Clone> From<T> for Binding<T> {
    fn from(value: T) -> Self {
        Self::Fixed(value)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn live_binding_is_evaluated_on_every_read() {
        let counter = Arc::new(AtomicUsize::new(0));
        let binding = {
            let counter = counter.clone();
            Binding::live(move || counter.fetch_add(1, Ordering::Relaxed))
        };

        assert!(binding.is_live());
        assert_eq!(binding.value(), 0);
        assert_eq!(binding.value(), 1);
    }

    #[test]
    fn freeze_keeps_current_value() {
        let counter = Arc::new(AtomicUsize::new(5));
        let mut binding = {
            let counter = counter.clone();
            Binding::live(move || counter.load(Ordering::Relaxed))
        };

        binding.freeze();
        counter.store(10, Ordering::Relaxed);

        assert!(!binding.is_live());
        assert_eq!(binding.value(), 5);

        binding.freeze();
        assert_eq!(binding.value(), 5);
    }
}

/// A value that remembers whether it was written since it was last cleaned.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Dirtyable<T> {
    value: T,
    dirty: bool,
}

impl<T> Dirtyable<T> {
    /// Wraps an initial value; the wrapper starts clean.
    pub const fn new(value: T) -> Self {
        Self {
            value,
            dirty: false,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clean(&mut self) {
        self.dirty = false;
    }
}

impl<T: PartialEq> Dirtyable<T> {
    /// Stores `value` and only marks the wrapper dirty when it differs.
    pub fn set_if_changed(&mut self, value: T) {
        if self.value != value {
            self.set(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_marks_dirty_until_cleaned() {
        let mut amount = Dirtyable::new(0.0_f32);
        assert!(!amount.is_dirty());
        amount.set(0.5);
        assert!(amount.is_dirty());
        assert_eq!(*amount.get(), 0.5);
        amount.clean();
        assert!(!amount.is_dirty());
    }

    #[test]
    fn unchanged_value_stays_clean() {
        let mut amount = Dirtyable::new(1);
        amount.set_if_changed(1);
        assert!(!amount.is_dirty());
        amount.set_if_changed(2);
        assert!(amount.is_dirty());
    }
}

//! Payload Module
//!
//! Capabilities the cache needs from stored values: structural copies for the
//! duplication toggles and named operations for retrieval hooks.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use tracing::debug;

use crate::error::{CacheError, Result};

// == Payload Trait ==
/// A value the cache can store.
///
/// Every method has a default, so plain data types only need an empty
/// `impl Payload for T {}`. Types that expose retrieval hooks override
/// [`supports`](Payload::supports) and [`invoke`](Payload::invoke):
///
/// ```
/// use ring_cache::Payload;
///
/// #[derive(Clone, Default)]
/// struct Record {
///     reloaded: bool,
/// }
///
/// impl Payload for Record {
///     fn supports(&self, operation: &str) -> bool {
///         operation == "reload"
///     }
///
///     fn invoke(&mut self, operation: &str) {
///         if operation == "reload" {
///             self.reloaded = true;
///         }
///     }
/// }
///
/// let mut record = Record::default();
/// record.dispatch("reload").unwrap();
/// assert!(record.reloaded);
/// assert!(record.dispatch("refresh").is_err());
/// ```
pub trait Payload: Clone {
    /// Returns a copy that shares no mutable state with `self`.
    ///
    /// `Clone` is already structural for owned data; pointer types such as
    /// `Arc` override this to copy the pointee.
    fn duplicate(&self) -> Self {
        self.clone()
    }

    /// Nil payloads are never duplicated and skip retrieval hooks.
    fn is_nil(&self) -> bool {
        false
    }

    /// Capability probe for a named operation.
    fn supports(&self, _operation: &str) -> bool {
        false
    }

    /// Runs a named operation. Only called after `supports` returned true.
    fn invoke(&mut self, _operation: &str) {}

    /// Whether [`dispatch`](Payload::dispatch) would accept `operation`.
    ///
    /// Checked before any work is done, so a rejected hook leaves the payload
    /// untouched. Types overriding `dispatch` should override this with it.
    fn can_dispatch(&self, operation: &str) -> bool {
        self.supports(operation)
    }

    /// Runs a named operation through a shared reference.
    ///
    /// Payloads with interior mutability override this so hooks reach them
    /// behind an `Arc` without breaking identity. Returns false, with no side
    /// effects, when the operation needs `&mut self`.
    fn invoke_shared(&self, _operation: &str) -> bool {
        false
    }

    // == Dispatch ==
    /// Runs `operation` on this payload, or fails if it is unsupported.
    ///
    /// Sequence types override this to fan out over their elements.
    fn dispatch(&mut self, operation: &str) -> Result<()> {
        if self.supports(operation) {
            self.invoke(operation);
            Ok(())
        } else {
            Err(CacheError::UnsupportedOperation(operation.to_string()))
        }
    }
}

// == Retrieval Hooks ==
/// Runs each hook in order on `data`. Nil payloads are left alone.
///
/// Stops at the first unsupported operation.
pub fn run_retrieval_hooks<V: Payload>(data: &mut V, hooks: &[String]) -> Result<()> {
    if data.is_nil() {
        return Ok(());
    }

    for operation in hooks {
        data.dispatch(operation)?;
    }

    Ok(())
}

/// Invokes `operation` on every element if all of them support it.
fn dispatch_each<'a, T, I>(elements: I, operation: &str) -> Result<()>
where
    T: Payload + 'a,
    I: IntoIterator<Item = &'a mut T>,
{
    let mut elements: Vec<&mut T> = elements.into_iter().collect();

    if !elements.iter().all(|element| element.supports(operation)) {
        return Err(CacheError::UnsupportedOperation(operation.to_string()));
    }

    for element in elements.iter_mut() {
        element.invoke(operation);
    }

    Ok(())
}

// == Scalar Implementations ==
macro_rules! plain_payload {
    ($($ty:ty),* $(,)?) => {
        $(impl Payload for $ty {})*
    };
}

plain_payload!(
    (), bool, char, String, &'static str,
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
    f32, f64,
);

// == Container Implementations ==
impl<T: Payload> Payload for Vec<T> {
    fn duplicate(&self) -> Self {
        self.iter().map(Payload::duplicate).collect()
    }

    fn can_dispatch(&self, operation: &str) -> bool {
        self.iter().all(|element| element.supports(operation))
    }

    fn dispatch(&mut self, operation: &str) -> Result<()> {
        dispatch_each(self.iter_mut(), operation)
    }
}

impl<T: Payload> Payload for VecDeque<T> {
    fn duplicate(&self) -> Self {
        self.iter().map(Payload::duplicate).collect()
    }

    fn can_dispatch(&self, operation: &str) -> bool {
        self.iter().all(|element| element.supports(operation))
    }

    fn dispatch(&mut self, operation: &str) -> Result<()> {
        dispatch_each(self.iter_mut(), operation)
    }
}

impl<T: Payload> Payload for Option<T> {
    fn duplicate(&self) -> Self {
        self.as_ref().map(Payload::duplicate)
    }

    fn is_nil(&self) -> bool {
        self.is_none()
    }

    fn supports(&self, operation: &str) -> bool {
        self.as_ref().is_some_and(|inner| inner.supports(operation))
    }

    fn invoke(&mut self, operation: &str) {
        if let Some(inner) = self {
            inner.invoke(operation);
        }
    }

    fn can_dispatch(&self, operation: &str) -> bool {
        self.as_ref().map_or(true, |inner| inner.can_dispatch(operation))
    }

    fn invoke_shared(&self, operation: &str) -> bool {
        self.as_ref().map_or(true, |inner| inner.invoke_shared(operation))
    }

    fn dispatch(&mut self, operation: &str) -> Result<()> {
        match self {
            Some(inner) => inner.dispatch(operation),
            None => Ok(()),
        }
    }
}

impl<T: Payload> Payload for Box<T> {
    fn duplicate(&self) -> Self {
        Box::new((**self).duplicate())
    }

    fn is_nil(&self) -> bool {
        (**self).is_nil()
    }

    fn supports(&self, operation: &str) -> bool {
        (**self).supports(operation)
    }

    fn invoke(&mut self, operation: &str) {
        (**self).invoke(operation)
    }

    fn can_dispatch(&self, operation: &str) -> bool {
        (**self).can_dispatch(operation)
    }

    fn invoke_shared(&self, operation: &str) -> bool {
        (**self).invoke_shared(operation)
    }

    fn dispatch(&mut self, operation: &str) -> Result<()> {
        (**self).dispatch(operation)
    }
}

/// `Arc` payloads are shared on plain clones and copied on `duplicate`.
///
/// Hooks keep the pointer's identity whenever they can: a pointee that
/// implements [`invoke_shared`](Payload::invoke_shared) is mutated in place
/// for every holder, and a uniquely held pointee is mutated directly. Any
/// other shared pointee is copied first (`Arc::make_mut`), so the hook only
/// reaches the copy held by this pointer.
impl<T: Payload> Payload for Arc<T> {
    fn duplicate(&self) -> Self {
        Arc::new((**self).duplicate())
    }

    fn is_nil(&self) -> bool {
        (**self).is_nil()
    }

    fn supports(&self, operation: &str) -> bool {
        (**self).supports(operation)
    }

    fn invoke(&mut self, operation: &str) {
        if !(**self).invoke_shared(operation) {
            Arc::make_mut(self).invoke(operation);
        }
    }

    fn can_dispatch(&self, operation: &str) -> bool {
        (**self).can_dispatch(operation)
    }

    fn invoke_shared(&self, operation: &str) -> bool {
        (**self).invoke_shared(operation)
    }

    fn dispatch(&mut self, operation: &str) -> Result<()> {
        if !(**self).can_dispatch(operation) {
            return Err(CacheError::UnsupportedOperation(operation.to_string()));
        }
        if (**self).invoke_shared(operation) {
            return Ok(());
        }
        if Arc::get_mut(self).is_none() {
            debug!("Copying shared payload to run {:?}", operation);
        }
        // Sequence fan-out lives on the pointee
        Arc::make_mut(self).dispatch(operation)
    }
}

impl<K, V, S> Payload for HashMap<K, V, S>
where
    K: Clone + Eq + Hash,
    V: Clone,
    S: Clone + BuildHasher,
{
}

impl<K: Clone + Ord, V: Clone> Payload for BTreeMap<K, V> {}

use core::fmt::Debug;

use heapless::{String, Vec};

/// Namespaced key/value storage for small integers and short strings.
///
/// Modelled after the NVS "preferences" API: values written with `put_*` become
/// durable once [`commit`](KeyValueStore::commit) returns.
pub trait KeyValueStore {
    type Error: Debug;

    fn get_u32(&mut self, namespace: &str, key: &str) -> Result<Option<u32>, Self::Error>;

    fn put_u32(&mut self, namespace: &str, key: &str, value: u32) -> Result<(), Self::Error>;

    /// Copy the string stored under `key` into `buf`.
    fn get_str<'b>(
        &mut self,
        namespace: &str,
        key: &str,
        buf: &'b mut [u8],
    ) -> Result<Option<&'b str>, Self::Error>;

    fn put_str(&mut self, namespace: &str, key: &str, value: &str) -> Result<(), Self::Error>;

    fn commit(&mut self, _namespace: &str) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    type Error = S::Error;

    fn get_u32(&mut self, namespace: &str, key: &str) -> Result<Option<u32>, Self::Error> {
        (**self).get_u32(namespace, key)
    }

    fn put_u32(&mut self, namespace: &str, key: &str, value: u32) -> Result<(), Self::Error> {
        (**self).put_u32(namespace, key, value)
    }

    fn get_str<'b>(
        &mut self,
        namespace: &str,
        key: &str,
        buf: &'b mut [u8],
    ) -> Result<Option<&'b str>, Self::Error> {
        (**self).get_str(namespace, key, buf)
    }

    fn put_str(&mut self, namespace: &str, key: &str, value: &str) -> Result<(), Self::Error> {
        (**self).put_str(namespace, key, value)
    }

    fn commit(&mut self, namespace: &str) -> Result<(), Self::Error> {
        (**self).commit(namespace)
    }
}

const NAME_LEN: usize = 16;
const VALUE_LEN: usize = 16;
const MAX_ENTRIES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryStoreError {
    /// Every entry slot is taken.
    Full,
    /// Namespace, key or string value longer than the store supports.
    TooLong,
    /// The caller's buffer cannot hold the stored string.
    BufferTooSmall,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum StoredValue {
    U32(u32),
    Str(String<VALUE_LEN>),
}

#[derive(Debug, Clone)]
struct Entry {
    namespace: String<NAME_LEN>,
    key: String<NAME_LEN>,
    value: StoredValue,
}

/// Fixed-capacity in-RAM [`KeyValueStore`].
///
/// Used on the host and as a fallback when the flash partition is unavailable.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Vec<Entry, MAX_ENTRIES>,
    commits: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful commits so far.
    pub fn commit_count(&self) -> u32 {
        self.commits
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, namespace: &str, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.namespace.as_str() == namespace && e.key.as_str() == key)
    }

    fn put(&mut self, namespace: &str, key: &str, value: StoredValue) -> Result<(), MemoryStoreError> {
        if let Some(index) = self.find(namespace, key) {
            self.entries[index].value = value;
            return Ok(());
        }

        let entry = Entry {
            namespace: bounded(namespace)?,
            key: bounded(key)?,
            value,
        };
        self.entries
            .push(entry)
            .map_err(|_| MemoryStoreError::Full)
    }
}

fn bounded<const N: usize>(text: &str) -> Result<String<N>, MemoryStoreError> {
    let mut out = String::new();
    out.push_str(text).map_err(|_| MemoryStoreError::TooLong)?;
    Ok(out)
}

impl KeyValueStore for MemoryStore {
    type Error = MemoryStoreError;

    fn get_u32(&mut self, namespace: &str, key: &str) -> Result<Option<u32>, Self::Error> {
        // a key holding a string reads as absent, like a type mismatch in NVS
        Ok(self
            .find(namespace, key)
            .and_then(|i| match self.entries[i].value {
                StoredValue::U32(v) => Some(v),
                StoredValue::Str(_) => None,
            }))
    }

    fn put_u32(&mut self, namespace: &str, key: &str, value: u32) -> Result<(), Self::Error> {
        self.put(namespace, key, StoredValue::U32(value))
    }

    fn get_str<'b>(
        &mut self,
        namespace: &str,
        key: &str,
        buf: &'b mut [u8],
    ) -> Result<Option<&'b str>, Self::Error> {
        let Some(index) = self.find(namespace, key) else {
            return Ok(None);
        };
        let StoredValue::Str(value) = &self.entries[index].value else {
            return Ok(None);
        };

        let bytes = value.as_bytes();
        let target = buf
            .get_mut(..bytes.len())
            .ok_or(MemoryStoreError::BufferTooSmall)?;
        target.copy_from_slice(bytes);
        let target: &'b [u8] = target;
        // copied from a valid str
        Ok(core::str::from_utf8(target).ok())
    }

    fn put_str(&mut self, namespace: &str, key: &str, value: &str) -> Result<(), Self::Error> {
        self.put(namespace, key, StoredValue::Str(bounded(value)?))
    }

    fn commit(&mut self, _namespace: &str) -> Result<(), Self::Error> {
        self.commits += 1;
        Ok(())
    }
}

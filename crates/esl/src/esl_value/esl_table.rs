use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::esl_error::{EslResult, EslRuntimeError};

use super::esl_value::EslValue;

/// Keys admitted by the keyed store. Anything else is a type error on
/// write and an absent slot on read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EslTableKey {
    Int(i64),
    Str(SmolStr),
}

impl EslTableKey {
    pub fn from_value(value: &EslValue) -> Option<EslTableKey> {
        match value {
            EslValue::Int(n) => Some(EslTableKey::Int(*n)),
            EslValue::Str(s) => Some(EslTableKey::Str(s.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> EslValue {
        match self {
            EslTableKey::Int(n) => EslValue::Int(*n),
            EslTableKey::Str(s) => EslValue::Str(s.clone()),
        }
    }
}

/// The dual-purpose aggregate: a positional sequence at 1-based integer
/// keys plus an insertion-ordered keyed store for everything else.
///
/// Writing to the key just past the end of the sequence appends, then
/// absorbs any stashed keyed entries whose integer keys now continue the
/// run. Writing `nil` deletes; deleting a positional slot shifts the
/// elements above it down.
pub struct EslTable {
    list: Vec<EslValue>,
    hash: IndexMap<EslTableKey, EslValue, ahash::RandomState>,
}

impl EslTable {
    pub fn new() -> Self {
        EslTable {
            list: Vec::new(),
            hash: IndexMap::default(),
        }
    }

    /// Length of the positional sequence (`#t`).
    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty() && self.hash.is_empty()
    }

    pub fn get(&self, key: &EslValue) -> EslValue {
        match EslTableKey::from_value(key) {
            Some(EslTableKey::Int(k)) if k >= 1 && (k as usize) <= self.list.len() => {
                self.list[(k - 1) as usize].clone()
            }
            Some(key) => self.hash.get(&key).cloned().unwrap_or(EslValue::Nil),
            None => EslValue::Nil,
        }
    }

    pub fn get_str(&self, name: &str) -> EslValue {
        self.hash
            .get(&EslTableKey::Str(SmolStr::new(name)))
            .cloned()
            .unwrap_or(EslValue::Nil)
    }

    pub fn contains(&self, key: &EslValue) -> bool {
        match EslTableKey::from_value(key) {
            Some(EslTableKey::Int(k)) if k >= 1 && (k as usize) <= self.list.len() => true,
            Some(key) => self.hash.contains_key(&key),
            None => false,
        }
    }

    pub fn set(&mut self, key: &EslValue, value: EslValue) -> EslResult<()> {
        match EslTableKey::from_value(key) {
            Some(EslTableKey::Int(k)) if k >= 1 && (k as usize) <= self.list.len() => {
                let index = (k - 1) as usize;
                if value.is_nil() {
                    self.list.remove(index);
                } else {
                    self.list[index] = value;
                }
                Ok(())
            }
            Some(EslTableKey::Int(k)) if k >= 1 && (k as usize) == self.list.len() + 1 => {
                if value.is_nil() {
                    self.hash.shift_remove(&EslTableKey::Int(k));
                } else {
                    self.list.push(value);
                    self.absorb_stashed();
                }
                Ok(())
            }
            Some(key) => {
                if value.is_nil() {
                    self.hash.shift_remove(&key);
                } else {
                    self.hash.insert(key, value);
                }
                Ok(())
            }
            None => Err(EslRuntimeError::type_error(format!(
                "incorrect table key type: {}",
                key.type_name()
            ))),
        }
    }

    pub fn set_str(&mut self, name: &str, value: EslValue) {
        // Infallible form for string keys; used by extension modules.
        let _ = self.set(&EslValue::string(name), value);
    }

    /// Append at the end of the positional sequence (`t[#t+1] = v`).
    pub fn push(&mut self, value: EslValue) {
        self.list.push(value);
        self.absorb_stashed();
    }

    /// Remove the positional element at 1-based `index`, shifting the rest
    /// down. Returns the removed value, or `Nil` when out of range.
    pub fn remove_at(&mut self, index: i64) -> EslValue {
        if index >= 1 && (index as usize) <= self.list.len() {
            self.list.remove((index - 1) as usize)
        } else {
            EslValue::Nil
        }
    }

    pub fn delete(&mut self, key: &EslValue) {
        if let Some(table_key) = EslTableKey::from_value(key) {
            if let EslTableKey::Int(k) = table_key {
                if k >= 1 && (k as usize) <= self.list.len() {
                    self.list.remove((k - 1) as usize);
                }
            }
            self.hash.shift_remove(&table_key);
        }
    }

    /// Stateless iteration step for the `next`/`pairs` protocol:
    /// positional keys 1..N in order, then keyed entries in insertion
    /// order. A `nil` key starts iteration; `None` ends it.
    pub fn next(&self, key: &EslValue) -> Option<(EslValue, EslValue)> {
        if key.is_nil() {
            if let Some(value) = self.list.first() {
                return Some((EslValue::Int(1), value.clone()));
            }
            return self.hash_entry(0);
        }

        match EslTableKey::from_value(key) {
            Some(EslTableKey::Int(k)) if k >= 1 && (k as usize) < self.list.len() => {
                Some((EslValue::Int(k + 1), self.list[k as usize].clone()))
            }
            Some(EslTableKey::Int(k)) if k >= 1 && (k as usize) == self.list.len() => {
                self.hash_entry(0)
            }
            Some(key) => match self.hash.get_index_of(&key) {
                Some(index) => self.hash_entry(index + 1),
                None => None,
            },
            None => None,
        }
    }

    fn hash_entry(&self, index: usize) -> Option<(EslValue, EslValue)> {
        self.hash
            .get_index(index)
            .map(|(k, v)| (k.to_value(), v.clone()))
    }

    /// Snapshot of all entries in iteration order.
    pub fn iter_pairs(&self) -> Vec<(EslValue, EslValue)> {
        let mut entries = Vec::with_capacity(self.list.len() + self.hash.len());
        for (i, value) in self.list.iter().enumerate() {
            entries.push((EslValue::Int(i as i64 + 1), value.clone()));
        }
        for (key, value) in &self.hash {
            entries.push((key.to_value(), value.clone()));
        }
        entries
    }

    /// Positional values only, in order.
    pub fn positional(&self) -> &[EslValue] {
        &self.list
    }

    fn absorb_stashed(&mut self) {
        loop {
            let next_key = EslTableKey::Int(self.list.len() as i64 + 1);
            match self.hash.shift_remove(&next_key) {
                Some(value) => self.list.push(value),
                None => break,
            }
        }
    }
}

impl Default for EslTable {
    fn default() -> Self {
        EslTable::new()
    }
}

//! Persistence of the entry list. [entry_store::EntryStore] keeps the whole list as one JSON
//! document inside a [key_value::KeyValueStore].

pub mod entities;
pub mod entry_store;
pub mod key_value;
pub mod sample;

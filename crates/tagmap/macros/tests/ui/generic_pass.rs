//! Tests for the Record derive macro on generic structs.

use tagmap::{Record, RecordExt};

#[derive(Debug, Record)]
pub struct Slot<T> {
    #[tag(config = "SLOT")]
    value: T,
}

#[derive(Debug, Record)]
pub struct Table<K, V>
where
    K: Ord,
{
    #[tag(config = "ENTRIES")]
    entries: std::collections::BTreeMap<K, V>,
    slot: Slot<u64>,
}

fn main() {
    let slot = Slot { value: 5_u16 };
    let _ = slot.to_vars();

    let table: Table<String, u32> = Table {
        entries: Default::default(),
        slot: Slot { value: 1 },
    };
    let _ = table.fields();
    let _ = Table::<String, u32>::field_shapes();
}

//! Tests for the Record derive macro - successful cases.

use std::sync::Arc;

use tagmap::{Record, RecordExt};

#[derive(Debug, Record)]
pub struct Limits {
    #[tag(config = "MAX_ENTRIES")]
    max_entries: u32,
}

#[derive(Debug, Record)]
pub struct Quota {
    #[tag(config = "MAX_QUOTA")]
    max_quota: u32,
}

#[derive(Debug, Record)]
pub struct Datapath {
    #[tag(config = "ENABLE_IPV6", env = "DATAPATH_IPV6")]
    enable_ipv6: bool,

    limits: Limits,

    shared: Arc<Quota>,

    #[tag(config = "DEVICE_TYPE")]
    r#type: String,

    #[tag(skip)]
    scratch: std::cell::RefCell<Vec<u8>>,
}

fn main() {
    let datapath = Datapath {
        enable_ipv6: true,
        limits: Limits { max_entries: 1 },
        shared: Arc::new(Quota { max_quota: 2 }),
        r#type: "veth".into(),
        scratch: Default::default(),
    };

    assert_eq!(datapath.fields().len(), 4);

    let vars = datapath.to_vars().expect("distinct tags convert");
    assert_eq!(vars.len(), 4);
    assert_eq!(vars.get_as::<u32>("MAX_QUOTA"), Some(&2));
    assert_eq!(
        vars.get_as::<String>("DEVICE_TYPE").map(String::as_str),
        Some("veth")
    );
    let _ = datapath.scratch.borrow();
}

use std::sync::Arc;

use anyhow::Result;
use bytes::Bytes;
use dbformat::{BytewiseComparator, Comparator};

use crate::{Block, BlockBuilder};


fn bytewise() -> Arc<dyn Comparator> {
    Arc::new(BytewiseComparator)
}

/// Builds a block from `(key, value)` pairs already in sorted order.
fn build_block(entries: &[(&[u8], &[u8])], restart_interval: usize) -> Result<Block> {
    let mut builder = BlockBuilder::new(restart_interval, bytewise());
    for (k, v) in entries {
        builder.add(k, v)?;
    }
    Ok(Block::new(builder.finish()?, bytewise())?)
}

/// Assembles a block by hand from raw data and restart offsets.
fn raw_block(data: &[u8], restarts: &[u32]) -> Bytes {
    let mut buf = data.to_vec();
    for r in restarts {
        crate::coding::put_fixed32(&mut buf, *r);
    }
    crate::coding::put_fixed32(&mut buf, restarts.len() as u32);
    buf.into()
}
